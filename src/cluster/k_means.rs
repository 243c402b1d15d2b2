//! K-means partitioning (Lloyd's algorithm with random restarts).
//!
//! Each restart samples `k` distinct rows as initial centroids from its own
//! `ChaCha20Rng`, seeded with `seed + restart`, then alternates assignment and
//! update steps until no label changes or the iteration cap is hit. Restarts
//! run in parallel; the one with the lowest inertia wins, ties going to the
//! earliest restart, so results do not depend on scheduling.

use crate::data::FeatureMatrix;
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;

/// Configuration options for k-means clustering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KMeansConfig {
    /// Number of clusters to find.
    pub k: usize,
    /// Number of independent random restarts.
    pub n_init: usize,
    /// Maximum number of assignment/update iterations per restart.
    pub max_iterations: usize,
    /// Base seed; restart `r` uses `seed + r`.
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self::new(2)
    }
}

impl KMeansConfig {
    /// Create a new config with default values for n_init (10),
    /// max_iterations (300) and seed (42).
    pub fn new(k: usize) -> Self {
        Self {
            k,
            n_init: 10,
            max_iterations: 300,
            seed: 42,
        }
    }

    /// Customize the number of random restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Customize the iteration cap of each restart.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Customize the base seed of the restarts.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Outcome of one [`kmeans`] call.
///
/// Only [`kmeans`] builds this value and it is read-only afterwards, so every
/// label stays in `[0, k)` and the centroids always match the labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringResult {
    labels: Vec<usize>,
    centroids: FeatureMatrix,
    inertia: f64,
    n_iter: usize,
    converged: bool,
}

impl ClusteringResult {
    pub fn k(&self) -> usize {
        self.centroids.n_rows()
    }

    /// Cluster id in `[0, k)` for every input row.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// One row per cluster, same feature order and names as the input.
    pub fn centroids(&self) -> &FeatureMatrix {
        &self.centroids
    }

    /// Sum of squared distances of rows to their centroid.
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Iterations run by the winning restart.
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// `false` when the winning restart stopped at the iteration cap
    /// before its labels stabilized.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Number of rows assigned to each cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k()];
        for &label in &self.labels {
            if let Some(size) = sizes.get_mut(label) {
                *size += 1;
            }
        }
        sizes
    }

    /// Assigns each row of `matrix` (already standardized with the same
    /// parameters as the training data) to its nearest centroid.
    pub fn predict(&self, matrix: &FeatureMatrix) -> Result<Vec<usize>> {
        if matrix.n_features() != self.centroids.n_features() {
            return Err(Error::DimensionMismatch {
                expected: self.centroids.n_features(),
                found: matrix.n_features(),
            });
        }
        let centroids = self.centroids.values().view();
        Ok(matrix
            .rows()
            .map(|row| nearest_centroid(row, centroids).0)
            .collect())
    }
}

/// Runs k-means on `data` and returns the lowest-inertia restart.
///
/// # Errors
///
/// `InvalidInput` when `k < 2`, `k` exceeds the number of rows, or
/// `n_init`/`max_iterations` is zero.
///
/// # Example
///
/// ```
/// use custseg::{kmeans, FeatureMatrix, KMeansConfig};
///
/// let data = FeatureMatrix::from_unnamed_rows(vec![
///     vec![1.0, 2.0],
///     vec![1.5, 1.8],
///     vec![5.0, 8.0],
///     vec![8.0, 8.0],
/// ])
/// .unwrap();
///
/// let result = kmeans(&data, &KMeansConfig::new(2).with_seed(7)).unwrap();
/// assert_eq!(result.labels().len(), 4);
/// assert_eq!(result.k(), 2);
/// ```
pub fn kmeans(data: &FeatureMatrix, config: &KMeansConfig) -> Result<ClusteringResult> {
    let n = data.n_rows();
    if config.k < 2 {
        return Err(Error::InvalidInput(format!(
            "k must be at least 2, got {}",
            config.k
        )));
    }
    if config.k > n {
        return Err(Error::InvalidInput(format!(
            "invalid number of clusters k = {} for dataset of size {}",
            config.k, n
        )));
    }
    if config.n_init == 0 || config.max_iterations == 0 {
        return Err(Error::InvalidInput(
            "n_init and max_iterations must both be positive".to_string(),
        ));
    }
    let distinct = data.distinct_rows();
    if distinct < config.k {
        log::warn!(
            "only {} distinct rows for k = {}; some centroids will coincide",
            distinct,
            config.k
        );
    }

    let values = data.values().view();
    let runs: Vec<Run> = (0..config.n_init)
        .into_par_iter()
        .map(|restart| {
            lloyd(
                values,
                config.k,
                config.max_iterations,
                config.seed.wrapping_add(restart as u64),
            )
        })
        .collect();

    let mut best_index = 0;
    for (restart, run) in runs.iter().enumerate() {
        log::debug!(
            "k = {} restart {}: inertia {:.6} after {} iterations",
            config.k,
            restart,
            run.inertia,
            run.n_iter
        );
        if run.inertia < runs[best_index].inertia {
            best_index = restart;
        }
    }
    let Some(best) = runs.into_iter().nth(best_index) else {
        return Err(Error::InvalidInput("no restarts were run".to_string()));
    };

    if !best.converged {
        log::warn!(
            "k = {}: labels still changing after {} iterations; consider raising max_iterations",
            config.k,
            config.max_iterations
        );
    }

    Ok(ClusteringResult {
        labels: best.labels,
        centroids: data.with_values(best.centroids)?,
        inertia: best.inertia,
        n_iter: best.n_iter,
        converged: best.converged,
    })
}

/// State of a single restart.
struct Run {
    labels: Vec<usize>,
    centroids: Array2<f64>,
    inertia: f64,
    n_iter: usize,
    converged: bool,
}

fn lloyd(data: ArrayView2<'_, f64>, k: usize, max_iterations: usize, seed: u64) -> Run {
    let n = data.nrows();
    let dim = data.ncols();

    // Initialize centroids by sampling k distinct rows
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut centroids = Array2::<f64>::zeros((k, dim));
    for (c, idx) in rand::seq::index::sample(&mut rng, n, k).iter().enumerate() {
        centroids.row_mut(c).assign(&data.row(idx));
    }

    let mut labels: Vec<usize> = Vec::new();
    let mut n_iter = 0;
    let mut converged = false;

    for iter in 0..max_iterations {
        // 1. Assignment step
        let mut next: Vec<usize> = data
            .outer_iter()
            .map(|row| nearest_centroid(row, centroids.view()).0)
            .collect();
        reseed_empty_clusters(data, centroids.view(), &mut next, k);

        // 2. Update step
        let changed = next != labels;
        labels = next;
        centroids = cluster_means(data, &labels, k);
        n_iter = iter + 1;

        if !changed {
            converged = true;
            break;
        }
    }

    let inertia: f64 = data
        .outer_iter()
        .zip(&labels)
        .map(|(row, &c)| distance_sq(row, centroids.row(c)))
        .sum();

    Run {
        labels,
        centroids,
        inertia,
        n_iter,
        converged,
    }
}

/// Gives every empty cluster one row: the row farthest from its current
/// centroid among clusters that can spare a member.
fn reseed_empty_clusters(
    data: ArrayView2<'_, f64>,
    centroids: ArrayView2<'_, f64>,
    labels: &mut [usize],
    k: usize,
) {
    let mut counts = vec![0_usize; k];
    for &c in labels.iter() {
        counts[c] += 1;
    }

    for empty in 0..k {
        if counts[empty] > 0 {
            continue;
        }
        let mut farthest: Option<(usize, f64)> = None;
        for (i, row) in data.outer_iter().enumerate() {
            let c = labels[i];
            if counts[c] < 2 {
                continue;
            }
            let d = distance_sq(row, centroids.row(c));
            if farthest.map_or(true, |(_, best)| d > best) {
                farthest = Some((i, d));
            }
        }
        if let Some((i, _)) = farthest {
            counts[labels[i]] -= 1;
            labels[i] = empty;
            counts[empty] = 1;
        }
    }
}

/// Mean of the rows assigned to each cluster. Clusters with no rows keep a
/// zero centroid; callers reseed before calling this.
fn cluster_means(data: ArrayView2<'_, f64>, labels: &[usize], k: usize) -> Array2<f64> {
    let mut sums = Array2::<f64>::zeros((k, data.ncols()));
    let mut counts = vec![0_usize; k];
    for (row, &c) in data.outer_iter().zip(labels) {
        counts[c] += 1;
        let mut sum = sums.row_mut(c);
        sum += &row;
    }
    for (mut sum, &count) in sums.outer_iter_mut().zip(&counts) {
        if count > 0 {
            sum /= count as f64;
        }
    }
    sums
}

/// Index of and squared distance to the closest centroid; ties go to the
/// lowest index.
pub(crate) fn nearest_centroid(
    point: ArrayView1<'_, f64>,
    centroids: ArrayView2<'_, f64>,
) -> (usize, f64) {
    let mut best_cluster = 0;
    let mut best_dist = f64::INFINITY;
    for (c, centroid) in centroids.outer_iter().enumerate() {
        let dist = distance_sq(point, centroid);
        if dist < best_dist {
            best_dist = dist;
            best_cluster = c;
        }
    }
    (best_cluster, best_dist)
}

/// Compute the squared Euclidean distance between two points of the same dimension.
pub(crate) fn distance_sq(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .fold(0.0, |acc, (&x, &y)| acc + (x - y).powi(2))
}
