//! # custseg
//!
//! Unsupervised customer segmentation. A table of numeric customer attributes
//! is standardized, a cluster count is chosen by sweeping candidate values and
//! scoring each with inertia and the silhouette coefficient, customers are
//! partitioned with multi-restart Lloyd's k-means, and every resulting segment
//! is summarized against the global feature means.
//!
//! ```rust
//! use custseg::{segment, FeatureMatrix, SegmentationConfig, SelectionConfig};
//!
//! let customers = FeatureMatrix::from_rows(
//!     vec!["income".to_string(), "spending".to_string()],
//!     vec![
//!         vec![15.0, 20.0],
//!         vec![16.0, 22.0],
//!         vec![17.0, 19.0],
//!         vec![70.0, 80.0],
//!         vec![71.0, 82.0],
//!         vec![72.0, 79.0],
//!     ],
//! )
//! .unwrap();
//!
//! let config = SegmentationConfig::default().with_selection(SelectionConfig::new(2, 4));
//! let result = segment(&customers, &config).unwrap();
//! assert_eq!(result.clustering.labels().len(), 6);
//! assert_eq!(result.profiles.len(), result.k);
//! ```

pub mod cluster;
pub mod data;
pub mod error;
pub mod pipeline;

pub use cluster::{
    inertia, kmeans, select_k, silhouette, summarize, summarize_with, ClusteringResult,
    FeatureSummary, KDiagnostics, KMeansConfig, Level, LevelThresholds, SegmentProfile, Selection,
    SelectionConfig, StandardizationParams,
};
pub use data::{
    classify_columns, impute_median, ColumnClassification, ColumnKind, ColumnSchema,
    ExclusionReason, FeatureMatrix, ImputedCell, ImputedTable,
};
pub use error::{Error, Result};
pub use pipeline::{segment, Segmentation, SegmentationConfig};
