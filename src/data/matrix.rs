//! Named, validated numeric feature table.

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView1, Axis};

/// Minimum number of features a matrix must carry.
pub const MIN_FEATURES: usize = 2;

/// Rows of customers by columns of named numeric features.
///
/// Invariants, checked at construction:
/// - at least [`MIN_FEATURES`] columns and at least one row,
/// - one name per column,
/// - every value finite (NaN is treated as a missing value and rejected).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Wraps an existing array after validating it.
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if values.ncols() < MIN_FEATURES {
            return Err(Error::InvalidInput(format!(
                "at least {} numeric features are required, found {}",
                MIN_FEATURES,
                values.ncols()
            )));
        }
        if values.nrows() == 0 {
            return Err(Error::InvalidInput("feature matrix has no rows".to_string()));
        }
        if names.len() != values.ncols() {
            return Err(Error::DimensionMismatch {
                expected: values.ncols(),
                found: names.len(),
            });
        }
        if let Some(((row, col), _)) = values.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "non-finite value at row {}, feature '{}'",
                row, names[col]
            )));
        }
        Ok(Self { names, values })
    }

    /// Builds a matrix from row vectors.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if a row's length differs from `names.len()`,
    /// otherwise the same checks as [`FeatureMatrix::new`].
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_cols = names.len();
        let n_rows = rows.len();
        let mut flat = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(Error::DimensionMismatch {
                    expected: n_cols,
                    found: row.len(),
                });
            }
            flat.extend(row);
        }
        let values = Array2::from_shape_vec((n_rows, n_cols), flat)
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        Self::new(names, values)
    }

    /// Same as [`FeatureMatrix::from_rows`] with generated names `x0, x1, ...`.
    pub fn from_unnamed_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_cols = rows.first().map_or(0, Vec::len);
        let names = (0..n_cols).map(|i| format!("x{}", i)).collect();
        Self::from_rows(names, rows)
    }

    /// Replaces the values while keeping the feature names, revalidating.
    pub(crate) fn with_values(&self, values: Array2<f64>) -> Result<Self> {
        Self::new(self.names.clone(), values)
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.row(index)
    }

    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.values.axis_iter(Axis(0))
    }

    /// Copies the values out as row vectors.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    /// Number of pairwise-distinct rows (exact bit equality).
    pub fn distinct_rows(&self) -> usize {
        let mut keys: Vec<Vec<u64>> = self
            .rows()
            .map(|r| r.iter().map(|v| v.to_bits()).collect())
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn test_from_rows_shape() {
        let m = FeatureMatrix::from_rows(names(2), vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.n_features(), 2);
        assert_eq!(m.row(1).to_vec(), vec![3.0, 4.0]);
        assert_eq!(m.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_rejects_single_feature() {
        let err = FeatureMatrix::from_rows(names(1), vec![vec![1.0]]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_empty() {
        let err = FeatureMatrix::from_rows(names(2), vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err =
            FeatureMatrix::from_rows(names(2), vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_rejects_missing_values() {
        let err = FeatureMatrix::new(names(2), array![[1.0, f64::NAN]]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_name_count_mismatch() {
        let err = FeatureMatrix::new(names(3), array![[1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_distinct_rows() {
        let m = FeatureMatrix::from_unnamed_rows(vec![
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            vec![2.0, 1.0],
        ])
        .unwrap();
        assert_eq!(m.distinct_rows(), 2);
        assert_eq!(m.names(), &["x0".to_string(), "x1".to_string()]);
    }
}
