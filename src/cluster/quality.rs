//! Clustering quality metrics: inertia and mean silhouette coefficient.

use super::k_means::distance_sq;
use crate::data::FeatureMatrix;
use crate::error::{Error, Result};
use rayon::prelude::*;

/// Sum of squared distances of each row to the centroid of its cluster.
///
/// Non-increasing in `k` on average, which is what the elbow diagnostic
/// looks for; nothing here relies on that.
pub fn inertia(data: &FeatureMatrix, labels: &[usize], centroids: &FeatureMatrix) -> Result<f64> {
    check_labels(data, labels)?;
    if centroids.n_features() != data.n_features() {
        return Err(Error::DimensionMismatch {
            expected: data.n_features(),
            found: centroids.n_features(),
        });
    }
    let k = centroids.n_rows();
    if let Some(&bad) = labels.iter().find(|&&c| c >= k) {
        return Err(Error::InvalidInput(format!(
            "label {} has no centroid (k = {})",
            bad, k
        )));
    }
    Ok(data
        .rows()
        .zip(labels)
        .map(|(row, &c)| distance_sq(row, centroids.row(c)))
        .sum())
}

/// Mean silhouette coefficient over all rows, using Euclidean distance.
///
/// For row `i` with mean distance `a` to the other members of its cluster
/// and lowest mean distance `b` to the members of any other single cluster,
/// `s(i) = (b - a) / max(a, b)` (taken as `0` when both are zero). The result
/// lies in `[-1, 1]`.
///
/// # Errors
///
/// `UndefinedMetric` when there are fewer than two clusters, as many clusters
/// as rows, or any cluster id below the largest label has fewer than two
/// members.
pub fn silhouette(data: &FeatureMatrix, labels: &[usize]) -> Result<f64> {
    check_labels(data, labels)?;
    let n = data.n_rows();
    let k = labels.iter().max().map_or(0, |&m| m + 1);
    if k < 2 {
        return Err(Error::UndefinedMetric(
            "silhouette needs at least two clusters".to_string(),
        ));
    }
    if k >= n {
        return Err(Error::UndefinedMetric(format!(
            "silhouette is undefined with {} clusters for {} rows",
            k, n
        )));
    }
    let mut counts = vec![0_usize; k];
    for &c in labels {
        counts[c] += 1;
    }
    if let Some((c, &size)) = counts.iter().enumerate().find(|(_, s)| **s < 2) {
        return Err(Error::UndefinedMetric(format!(
            "cluster {} has {} member(s); silhouette needs at least 2 per cluster",
            c, size
        )));
    }

    let scores: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|i| {
            let point = data.row(i);
            let mut sums = vec![0.0; k];
            for (j, other) in data.rows().enumerate() {
                if i != j {
                    sums[labels[j]] += distance_sq(point, other).sqrt();
                }
            }
            let own = labels[i];
            let a = sums[own] / (counts[own] - 1) as f64;
            let b = (0..k)
                .filter(|&c| c != own)
                .map(|c| sums[c] / counts[c] as f64)
                .fold(f64::INFINITY, f64::min);
            let denom = a.max(b);
            if denom == 0.0 {
                0.0
            } else {
                (b - a) / denom
            }
        })
        .collect();

    Ok(scores.iter().sum::<f64>() / n as f64)
}

fn check_labels(data: &FeatureMatrix, labels: &[usize]) -> Result<()> {
    if labels.len() != data.n_rows() {
        return Err(Error::DimensionMismatch {
            expected: data.n_rows(),
            found: labels.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn data(rows: Vec<Vec<f64>>) -> FeatureMatrix {
        FeatureMatrix::from_unnamed_rows(rows).unwrap()
    }

    #[test]
    fn test_inertia() {
        let d = data(vec![vec![0.0, 0.0], vec![2.0, 0.0], vec![10.0, 10.0]]);
        let centroids = data(vec![vec![1.0, 0.0], vec![10.0, 10.0]]);
        assert_relative_eq!(inertia(&d, &[0, 0, 1], &centroids).unwrap(), 2.0);
    }

    #[test]
    fn test_inertia_rejects_unknown_label() {
        let d = data(vec![vec![0.0, 0.0], vec![2.0, 0.0]]);
        let centroids = data(vec![vec![1.0, 0.0]]);
        assert!(matches!(
            inertia(&d, &[0, 1], &centroids),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_silhouette_hand_computed() {
        // Points on a line: {0, 1} and {4, 5}.
        let d = data(vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![4.0, 0.0],
            vec![5.0, 0.0],
        ]);
        let s = silhouette(&d, &[0, 0, 1, 1]).unwrap();
        // s(0) = (4.5 - 1) / 4.5, s(1) = (3.5 - 1) / 3.5, symmetric for the rest.
        let expected = ((3.5 / 4.5) + (2.5 / 3.5)) / 2.0;
        assert_relative_eq!(s, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_silhouette_bad_partition_is_negative() {
        let d = data(vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![4.0, 0.0],
            vec![5.0, 0.0],
        ]);
        let s = silhouette(&d, &[0, 1, 0, 1]).unwrap();
        assert!(s < 0.0);
        assert!(s >= -1.0);
    }

    #[test]
    fn test_silhouette_single_cluster_undefined() {
        let d = data(vec![vec![0.0, 0.0], vec![1.0, 0.0]]);
        assert!(matches!(
            silhouette(&d, &[0, 0]),
            Err(Error::UndefinedMetric(_))
        ));
    }

    #[test]
    fn test_silhouette_singleton_cluster_undefined() {
        let d = data(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![9.0, 0.0]]);
        assert!(matches!(
            silhouette(&d, &[0, 0, 1]),
            Err(Error::UndefinedMetric(_))
        ));
    }

    #[test]
    fn test_silhouette_label_length_mismatch() {
        let d = data(vec![vec![0.0, 0.0], vec![1.0, 0.0]]);
        assert!(matches!(
            silhouette(&d, &[0]),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
