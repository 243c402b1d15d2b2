//! End-to-end segmentation.
//!
//! Standardize once, sweep cluster counts, refit at the chosen count and
//! summarize. Every intermediate value is returned so callers can render or
//! persist whichever parts they need.

use crate::cluster::{
    kmeans, select_k, silhouette, summarize_with, ClusteringResult, LevelThresholds,
    SegmentProfile, Selection, SelectionConfig, StandardizationParams,
};
use crate::data::FeatureMatrix;
use crate::error::{Error, Result};

/// Settings for [`segment`].
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationConfig {
    /// Sweep range and k-means settings shared by the sweep and the final fit.
    /// `k_max` is clamped to the row count.
    pub selection: SelectionConfig,
    /// Cluster count to use instead of the recommendation.
    pub k_override: Option<usize>,
    pub thresholds: LevelThresholds,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            k_override: None,
            thresholds: LevelThresholds::default(),
        }
    }
}

impl SegmentationConfig {
    pub fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k_override = Some(k);
        self
    }

    pub fn with_thresholds(mut self, thresholds: LevelThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// Everything produced by one [`segment`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub params: StandardizationParams,
    pub standardized: FeatureMatrix,
    pub selection: Selection,
    /// Cluster count actually used.
    pub k: usize,
    /// Final fit on the standardized matrix.
    pub clustering: ClusteringResult,
    /// `clustering.centroids()` mapped back to original units.
    pub centroids_original: FeatureMatrix,
    /// Silhouette of the final fit, `None` when undefined.
    pub silhouette: Option<f64>,
    /// One profile per cluster id, ascending.
    pub profiles: Vec<SegmentProfile>,
}

/// Runs the full segmentation of `matrix`.
///
/// # Errors
///
/// `NoRecommendation` when no override is set and no candidate has a
/// defined silhouette; otherwise whatever the individual stages report.
pub fn segment(matrix: &FeatureMatrix, config: &SegmentationConfig) -> Result<Segmentation> {
    let params = StandardizationParams::fit(matrix);
    let standardized = params.transform(matrix)?;

    let mut sweep = config.selection.clone();
    if sweep.k_max > matrix.n_rows() {
        log::debug!(
            "clamping k_max from {} to the row count {}",
            sweep.k_max,
            matrix.n_rows()
        );
        sweep.k_max = matrix.n_rows();
    }
    let selection = select_k(&standardized, &sweep)?;

    let k = match config.k_override {
        Some(k) => k,
        None => selection.recommended_k.ok_or(Error::NoRecommendation)?,
    };

    let clustering = kmeans(&standardized, &sweep.kmeans_config(k))?;
    let silhouette = match silhouette(&standardized, clustering.labels()) {
        Ok(s) => Some(s),
        Err(Error::UndefinedMetric(_)) => None,
        Err(e) => return Err(e),
    };
    let centroids_original = params.inverse_transform(clustering.centroids())?;
    let profiles = summarize_with(
        matrix,
        clustering.labels(),
        &centroids_original,
        &config.thresholds,
    )?;

    log::info!(
        "segmented {} rows into {} clusters (inertia {:.4}, silhouette {:?})",
        matrix.n_rows(),
        k,
        clustering.inertia(),
        silhouette
    );

    Ok(Segmentation {
        params,
        standardized,
        selection,
        k,
        clustering,
        centroids_original,
        silhouette,
        profiles,
    })
}
