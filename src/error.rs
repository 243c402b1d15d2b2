//! Error types shared by every stage of the segmentation pipeline.

use thiserror::Error;

/// Result type for segmentation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while standardizing, clustering, scoring or summarizing.
///
/// Zero-variance features and non-converged fits are not errors:
/// both are recoverable and are reported on the returned values instead
/// (see [`degenerate_features`] and [`converged`]).
///
/// [`degenerate_features`]: crate::StandardizationParams::degenerate_features
/// [`converged`]: crate::ClusteringResult::converged
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Parameters or data that violate a precondition (too few features,
    /// `k < 2`, `k` larger than the row count, missing values, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Two collaborating values disagree on shape.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Length actually supplied.
        found: usize,
    },

    /// A quality metric is not defined for the given labeling.
    #[error("metric undefined: {0}")]
    UndefinedMetric(String),

    /// No candidate cluster count produced a defined silhouette score and no
    /// explicit cluster count was supplied.
    #[error("no cluster count could be recommended: every candidate had an undefined silhouette")]
    NoRecommendation,
}
