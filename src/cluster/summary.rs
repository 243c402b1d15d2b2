//! Per-segment statistics in original feature units.

use crate::data::FeatureMatrix;
use crate::error::{Error, Result};
use std::fmt;

/// Coarse level of a segment's feature mean relative to the global mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    High,
    Medium,
    Low,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::High => "High",
            Level::Medium => "Medium",
            Level::Low => "Low",
        };
        f.write_str(s)
    }
}

/// Ratios to the global mean that separate the three levels.
///
/// These are business heuristics rather than statistics; the defaults
/// (1.2 and 0.8) are kept for compatibility with existing reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelThresholds {
    pub high_ratio: f64,
    pub low_ratio: f64,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            high_ratio: 1.2,
            low_ratio: 0.8,
        }
    }
}

impl LevelThresholds {
    /// `High` if `segment_mean > high_ratio * global_mean`, `Low` if
    /// `segment_mean < low_ratio * global_mean`, otherwise `Medium`.
    pub fn classify(&self, segment_mean: f64, global_mean: f64) -> Level {
        if segment_mean > self.high_ratio * global_mean {
            Level::High
        } else if segment_mean < self.low_ratio * global_mean {
            Level::Low
        } else {
            Level::Medium
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub name: String,
    pub mean: f64,
    /// Sample standard deviation (`n - 1`); `0.0` for a single-member segment.
    pub std_dev: f64,
    pub level: Level,
}

/// Description of one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentProfile {
    pub cluster: usize,
    pub size: usize,
    /// Share of all rows, in `[0, 100]`.
    pub percentage: f64,
    /// Centroid in original units.
    pub centroid: Vec<f64>,
    pub features: Vec<FeatureSummary>,
}

impl SegmentProfile {
    pub fn feature(&self, name: &str) -> Option<&FeatureSummary> {
        self.features.iter().find(|f| f.name == name)
    }
}

/// [`summarize_with`] using the default [`LevelThresholds`].
pub fn summarize(
    original: &FeatureMatrix,
    labels: &[usize],
    centroids: &FeatureMatrix,
) -> Result<Vec<SegmentProfile>> {
    summarize_with(original, labels, centroids, &LevelThresholds::default())
}

/// Builds one profile per cluster id, ascending.
///
/// `original` is the unstandardized matrix the labels refer to and
/// `centroids` holds one row per cluster in the same units. Levels compare
/// each segment mean with the mean of the full `original` matrix.
///
/// # Errors
///
/// `DimensionMismatch` on label/row or feature count disagreement;
/// `InvalidInput` if a label has no centroid or a cluster is empty.
pub fn summarize_with(
    original: &FeatureMatrix,
    labels: &[usize],
    centroids: &FeatureMatrix,
    thresholds: &LevelThresholds,
) -> Result<Vec<SegmentProfile>> {
    let n = original.n_rows();
    let d = original.n_features();
    if labels.len() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            found: labels.len(),
        });
    }
    if centroids.n_features() != d {
        return Err(Error::DimensionMismatch {
            expected: d,
            found: centroids.n_features(),
        });
    }
    let k = centroids.n_rows();

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (i, &c) in labels.iter().enumerate() {
        if c >= k {
            return Err(Error::InvalidInput(format!(
                "row {} has label {} but only {} centroids were given",
                i, c, k
            )));
        }
        members[c].push(i);
    }
    if let Some(empty) = members.iter().position(Vec::is_empty) {
        return Err(Error::InvalidInput(format!("cluster {} has no rows", empty)));
    }

    let values = original.values();
    let global_means: Vec<f64> = (0..d).map(|j| values.column(j).sum() / n as f64).collect();

    let profiles = members
        .iter()
        .enumerate()
        .map(|(c, rows)| {
            let size = rows.len();
            let features = original
                .names()
                .iter()
                .enumerate()
                .map(|(j, name)| {
                    let (mean, std_dev) = mean_and_sample_std(rows.iter().map(|&i| values[[i, j]]));
                    FeatureSummary {
                        name: name.clone(),
                        mean,
                        std_dev,
                        level: thresholds.classify(mean, global_means[j]),
                    }
                })
                .collect();
            SegmentProfile {
                cluster: c,
                size,
                percentage: 100.0 * size as f64 / n as f64,
                centroid: centroids.row(c).to_vec(),
                features,
            }
        })
        .collect();

    Ok(profiles)
}

fn mean_and_sample_std(xs: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let (count, sum) = xs.clone().fold((0_usize, 0.0), |(n, s), x| (n + 1, s + x));
    let mean = sum / count as f64;
    if count < 2 {
        return (mean, 0.0);
    }
    let ss: f64 = xs.map(|x| (x - mean).powi(2)).sum();
    (mean, (ss / (count - 1) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn named(rows: Vec<Vec<f64>>) -> FeatureMatrix {
        FeatureMatrix::from_rows(vec!["income".to_string(), "spending".to_string()], rows)
            .unwrap()
    }

    #[test]
    fn test_classify_thresholds_are_strict() {
        let t = LevelThresholds::default();
        assert_eq!(t.classify(12.1, 10.0), Level::High);
        assert_eq!(t.classify(12.0, 10.0), Level::Medium);
        assert_eq!(t.classify(8.0, 10.0), Level::Medium);
        assert_eq!(t.classify(7.9, 10.0), Level::Low);
        assert_eq!(Level::High.to_string(), "High");
    }

    #[test]
    fn test_sizes_percentages_and_stats() {
        let original = named(vec![
            vec![10.0, 1.0],
            vec![20.0, 3.0],
            vec![30.0, 5.0],
            vec![100.0, 50.0],
        ]);
        let centroids = named(vec![vec![20.0, 3.0], vec![100.0, 50.0]]);
        let profiles = summarize(&original, &[0, 0, 0, 1], &centroids).unwrap();

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].cluster, 0);
        assert_eq!(profiles[0].size, 3);
        assert_relative_eq!(profiles[0].percentage, 75.0);
        assert_relative_eq!(profiles[1].percentage, 25.0);
        assert_eq!(profiles[0].centroid, vec![20.0, 3.0]);

        let income = profiles[0].feature("income").unwrap();
        assert_relative_eq!(income.mean, 20.0);
        assert_relative_eq!(income.std_dev, 10.0, epsilon = 1e-12);
        // global income mean is 40
        assert_eq!(income.level, Level::Low);

        let single = profiles[1].feature("spending").unwrap();
        assert_eq!(single.std_dev, 0.0);
        assert_eq!(single.level, Level::High);
    }

    #[test]
    fn test_rejects_empty_cluster() {
        let original = named(vec![vec![1.0, 1.0], vec![2.0, 2.0]]);
        let centroids = named(vec![vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 3.0]]);
        assert!(matches!(
            summarize(&original, &[0, 1], &centroids),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_label_without_centroid() {
        let original = named(vec![vec![1.0, 1.0], vec![2.0, 2.0]]);
        let centroids = named(vec![vec![1.0, 1.0]]);
        assert!(matches!(
            summarize(&original, &[0, 1], &centroids),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_custom_thresholds() {
        let original = named(vec![
            vec![11.0, 1.0],
            vec![11.0, 1.0],
            vec![9.0, 1.0],
            vec![9.0, 1.0],
        ]);
        let centroids = named(vec![vec![11.0, 1.0], vec![9.0, 1.0]]);
        let tight = LevelThresholds {
            high_ratio: 1.05,
            low_ratio: 0.95,
        };
        let profiles = summarize_with(&original, &[0, 0, 1, 1], &centroids, &tight).unwrap();
        assert_eq!(profiles[0].features[0].level, Level::High);
        assert_eq!(profiles[1].features[0].level, Level::Low);
        assert_eq!(profiles[0].features[1].level, Level::Medium);
    }
}
