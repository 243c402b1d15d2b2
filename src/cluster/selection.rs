//! Cluster-count selection.
//!
//! Fits k-means for every `k` in `[k_min, k_max]` and records inertia and
//! silhouette for each. The recommendation is the `k` with the highest
//! defined silhouette; ties go to the smaller `k`. Counts whose silhouette is
//! undefined are reported but never recommended.

use super::k_means::{kmeans, KMeansConfig};
use super::quality::silhouette;
use crate::data::FeatureMatrix;
use crate::error::{Error, Result};
use rayon::prelude::*;

/// Sweep bounds and the per-fit k-means settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionConfig {
    /// Smallest candidate cluster count, at least 2.
    pub k_min: usize,
    /// Largest candidate cluster count, inclusive.
    pub k_max: usize,
    /// Random restarts per candidate fit.
    pub n_init: usize,
    /// Iteration cap of each restart.
    pub max_iterations: usize,
    /// Base seed shared by every candidate fit.
    pub seed: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self::new(2, 10)
    }
}

impl SelectionConfig {
    /// Sweep `k_min..=k_max` with n_init (10), max_iterations (300) and seed (42).
    pub fn new(k_min: usize, k_max: usize) -> Self {
        let base = KMeansConfig::new(k_min);
        Self {
            k_min,
            k_max,
            n_init: base.n_init,
            max_iterations: base.max_iterations,
            seed: base.seed,
        }
    }

    /// Customize the number of random restarts per candidate.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Customize the iteration cap of each restart.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Customize the base seed of every candidate fit.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The k-means configuration used for candidate `k`.
    pub fn kmeans_config(&self, k: usize) -> KMeansConfig {
        KMeansConfig::new(k)
            .with_n_init(self.n_init)
            .with_max_iterations(self.max_iterations)
            .with_seed(self.seed)
    }
}

/// Scores for one candidate cluster count.
#[derive(Debug, Clone, PartialEq)]
pub struct KDiagnostics {
    /// Candidate cluster count.
    pub k: usize,
    /// Inertia of the best restart at this `k`.
    pub inertia: f64,
    /// `None` when the silhouette is undefined for this partition.
    pub silhouette: Option<f64>,
    /// Whether the best restart stabilized before the iteration cap.
    pub converged: bool,
}

/// Result of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// One entry per candidate, ascending in `k`.
    pub diagnostics: Vec<KDiagnostics>,
    /// `None` only if every candidate had an undefined silhouette.
    pub recommended_k: Option<usize>,
}

impl Selection {
    pub fn get(&self, k: usize) -> Option<&KDiagnostics> {
        self.diagnostics.iter().find(|d| d.k == k)
    }

    /// Advisory elbow point of the inertia curve.
    ///
    /// Both axes are rescaled to `[0, 1]` and the chosen `k` is the one whose
    /// inertia falls farthest below the chord joining the first and last
    /// candidates. Needs at least three candidates in strictly ascending `k`
    /// and a non-flat curve. Never used for the recommendation.
    pub fn elbow_k(&self) -> Option<usize> {
        let points = &self.diagnostics;
        if points.len() < 3 {
            return None;
        }
        let (first, last) = (&points[0], &points[points.len() - 1]);
        if points.windows(2).any(|pair| pair[1].k <= pair[0].k) {
            return None;
        }
        let k_span = last.k.checked_sub(first.k)? as f64;
        let lo = points.iter().map(|d| d.inertia).fold(f64::INFINITY, f64::min);
        let hi = points
            .iter()
            .map(|d| d.inertia)
            .fold(f64::NEG_INFINITY, f64::max);
        if hi - lo <= 0.0 {
            return None;
        }
        let scale = |inertia: f64| (inertia - lo) / (hi - lo);
        let (y0, y1) = (scale(first.inertia), scale(last.inertia));

        let mut elbow: Option<(usize, f64)> = None;
        for d in &points[1..points.len() - 1] {
            let x = d.k.checked_sub(first.k)? as f64 / k_span;
            let gap = (y0 + (y1 - y0) * x) - scale(d.inertia);
            if gap > 0.0 && elbow.map_or(true, |(_, best)| gap > best) {
                elbow = Some((d.k, gap));
            }
        }
        elbow.map(|(k, _)| k)
    }
}

/// Sweeps `config.k_min..=config.k_max` over `data`.
///
/// # Errors
///
/// `InvalidInput` if `k_min < 2`, `k_min > k_max`, or `k_max` exceeds the
/// number of rows; any error from [`kmeans`] other than an undefined
/// silhouette is propagated.
pub fn select_k(data: &FeatureMatrix, config: &SelectionConfig) -> Result<Selection> {
    if config.k_min < 2 {
        return Err(Error::InvalidInput(format!(
            "k_min must be at least 2, got {}",
            config.k_min
        )));
    }
    if config.k_min > config.k_max {
        return Err(Error::InvalidInput(format!(
            "empty k range [{}, {}]",
            config.k_min, config.k_max
        )));
    }
    if config.k_max > data.n_rows() {
        return Err(Error::InvalidInput(format!(
            "k_max = {} exceeds the number of rows ({})",
            config.k_max,
            data.n_rows()
        )));
    }

    let diagnostics = (config.k_min..=config.k_max)
        .into_par_iter()
        .map(|k| {
            let result = kmeans(data, &config.kmeans_config(k))?;
            let silhouette = match silhouette(data, result.labels()) {
                Ok(s) => Some(s),
                Err(Error::UndefinedMetric(reason)) => {
                    log::debug!("k = {}: {}", k, reason);
                    None
                }
                Err(e) => return Err(e),
            };
            Ok(KDiagnostics {
                k,
                inertia: result.inertia(),
                silhouette,
                converged: result.converged(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let recommended_k = recommend(&diagnostics);
    for d in &diagnostics {
        log::debug!(
            "k = {}: inertia {:.4}, silhouette {:?}",
            d.k,
            d.inertia,
            d.silhouette
        );
    }
    match recommended_k {
        Some(k) => log::info!("recommended k = {}", k),
        None => log::warn!(
            "no candidate in [{}, {}] has a defined silhouette",
            config.k_min,
            config.k_max
        ),
    }

    Ok(Selection {
        diagnostics,
        recommended_k,
    })
}

/// Highest defined silhouette, smallest `k` on ties. Expects ascending `k`.
fn recommend(diagnostics: &[KDiagnostics]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for d in diagnostics {
        if let Some(s) = d.silhouette {
            if best.map_or(true, |(_, top)| s > top) {
                best = Some((d.k, s));
            }
        }
    }
    best.map(|(k, _)| k)
}
