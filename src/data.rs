//! Input-side data model and boundary helpers.
//!
//! [`FeatureMatrix`] is the only type the clustering core consumes. The
//! column classifier and the median imputer are pure functions an upstream
//! loader can use to get from a raw table to a clean matrix.

pub mod columns;
pub mod impute;
pub mod matrix;

pub use columns::{
    classify_columns, ColumnClassification, ColumnKind, ColumnSchema, ExclusionReason,
};
pub use impute::{impute_median, ImputedCell, ImputedTable};
pub use matrix::FeatureMatrix;
