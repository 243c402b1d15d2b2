//! Clustering core.
//!
//! The stages are plain functions over value types and are composed
//! explicitly by [`crate::pipeline::segment`]:
//!
//! - [`standardize`]: per-feature z-scoring, reversible
//! - [`k_means`]: multi-restart Lloyd's algorithm
//! - [`quality`]: inertia and silhouette score
//! - [`selection`]: cluster-count sweep and recommendation
//! - [`summary`]: per-segment statistics in original units

pub mod k_means;
pub mod quality;
pub mod selection;
pub mod standardize;
pub mod summary;

pub use k_means::{kmeans, ClusteringResult, KMeansConfig};
pub use quality::{inertia, silhouette};
pub use selection::{select_k, KDiagnostics, Selection, SelectionConfig};
pub use standardize::StandardizationParams;
pub use summary::{
    summarize, summarize_with, FeatureSummary, Level, LevelThresholds, SegmentProfile,
};
