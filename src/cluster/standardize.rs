//! Feature standardization (z-scoring).
//!
//! Parameters are fitted once on the full reference matrix and reused for
//! every transform, so all candidate cluster counts see the same scaling.
//! The standard deviation uses the population convention (divide by `n`).
//!
//! A feature whose standard deviation is (numerically) zero is *degenerate*:
//! its stored deviation is set to exactly `0.0`, [`StandardizationParams::transform`]
//! maps it to all zeros and [`StandardizationParams::inverse_transform`] maps
//! anything back to the feature mean.

use crate::data::FeatureMatrix;
use crate::error::{Error, Result};
use ndarray::{Array2, Axis};

/// Threshold, relative to the column's largest magnitude, under which a
/// standard deviation counts as zero.
const DEGENERATE_STD_TOLERANCE: f64 = 1e-12;

/// Per-feature mean and standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardizationParams {
    means: Vec<f64>,
    std_devs: Vec<f64>,
}

impl StandardizationParams {
    /// Computes column means and population standard deviations.
    pub fn fit(matrix: &FeatureMatrix) -> Self {
        let values = matrix.values();
        let n = values.nrows() as f64;
        let mut means = Vec::with_capacity(values.ncols());
        let mut std_devs = Vec::with_capacity(values.ncols());

        for (j, column) in values.axis_iter(Axis(1)).enumerate() {
            let mean = column.sum() / n;
            let var = column.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
            let mut std = var.sqrt();
            let max_abs = column.iter().fold(0.0_f64, |m, &x| m.max(x.abs()));
            if max_abs == 0.0 || std <= DEGENERATE_STD_TOLERANCE * max_abs {
                log::warn!(
                    "feature '{}' has zero variance; it will standardize to 0",
                    matrix.names()[j]
                );
                std = 0.0;
            }
            means.push(mean);
            std_devs.push(std);
        }

        Self { means, std_devs }
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Standard deviations, with `0.0` for degenerate features.
    pub fn std_devs(&self) -> &[f64] {
        &self.std_devs
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Indices of zero-variance features.
    pub fn degenerate_features(&self) -> Vec<usize> {
        self.std_devs
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == 0.0)
            .map(|(j, _)| j)
            .collect()
    }

    /// Returns `(x - mean) / std` per feature, or `0` for degenerate features.
    pub fn transform(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix> {
        self.check_width(matrix)?;
        let mut out: Array2<f64> = matrix.values().clone();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (mean, std) = (self.means[j], self.std_devs[j]);
            if std == 0.0 {
                column.fill(0.0);
            } else {
                column.mapv_inplace(|x| (x - mean) / std);
            }
        }
        matrix.with_values(out)
    }

    /// Returns `x * std + mean` per feature.
    pub fn inverse_transform(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix> {
        self.check_width(matrix)?;
        let mut out: Array2<f64> = matrix.values().clone();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (mean, std) = (self.means[j], self.std_devs[j]);
            column.mapv_inplace(|x| x * std + mean);
        }
        matrix.with_values(out)
    }

    fn check_width(&self, matrix: &FeatureMatrix) -> Result<()> {
        if matrix.n_features() != self.n_features() {
            return Err(Error::DimensionMismatch {
                expected: self.n_features(),
                found: matrix.n_features(),
            });
        }
        Ok(())
    }
}
