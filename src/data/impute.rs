//! Median imputation with provenance.
//!
//! Missing numeric cells are replaced by their column median, and every
//! replacement is reported so downstream consumers can tell observed values
//! from inferred ones.

use crate::error::{Error, Result};

/// One cell that was filled in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImputedCell {
    pub row: usize,
    pub column: usize,
    pub value: f64,
}

/// Dense table produced by [`impute_median`].
#[derive(Debug, Clone, PartialEq)]
pub struct ImputedTable {
    pub rows: Vec<Vec<f64>>,
    /// Filled cells in row-major order.
    pub imputed: Vec<ImputedCell>,
}

impl ImputedTable {
    /// Whether the cell at `(row, column)` holds an imputed value.
    pub fn is_imputed(&self, row: usize, column: usize) -> bool {
        self.imputed
            .iter()
            .any(|c| c.row == row && c.column == column)
    }
}

/// Fills `None` cells with the median of the observed values in the same
/// column. For an even number of observations the median is the mean of the
/// two middle values.
///
/// # Errors
///
/// - `DimensionMismatch` when rows have different lengths.
/// - `InvalidInput` when a column has no observed values or an observed value
///   is not finite.
pub fn impute_median(rows: &[Vec<Option<f64>>]) -> Result<ImputedTable> {
    let n_cols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|r| r.len() != n_cols) {
        return Err(Error::DimensionMismatch {
            expected: n_cols,
            found: bad.len(),
        });
    }

    let mut medians = Vec::with_capacity(n_cols);
    for col in 0..n_cols {
        let mut observed: Vec<f64> = rows.iter().filter_map(|r| r[col]).collect();
        if observed.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "column {} contains a non-finite observed value",
                col
            )));
        }
        if observed.is_empty() {
            return Err(Error::InvalidInput(format!(
                "column {} has no observed values to impute from",
                col
            )));
        }
        observed.sort_by(f64::total_cmp);
        medians.push(median_of_sorted(&observed));
    }

    let mut imputed = Vec::new();
    let filled: Vec<Vec<f64>> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(|(j, cell)| match cell {
                    Some(v) => *v,
                    None => {
                        imputed.push(ImputedCell {
                            row: i,
                            column: j,
                            value: medians[j],
                        });
                        medians[j]
                    }
                })
                .collect::<Vec<f64>>()
        })
        .collect();

    if !imputed.is_empty() {
        log::info!("imputed {} missing cells with column medians", imputed.len());
    }

    Ok(ImputedTable {
        rows: filled,
        imputed,
    })
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_with_median_and_records_provenance() {
        let rows = vec![
            vec![Some(1.0), Some(10.0)],
            vec![None, Some(20.0)],
            vec![Some(3.0), None],
            vec![Some(8.0), Some(40.0)],
        ];
        let table = impute_median(&rows).unwrap();
        assert_eq!(table.rows[1][0], 3.0);
        assert_eq!(table.rows[2][1], 20.0);
        assert_eq!(
            table.imputed,
            vec![
                ImputedCell {
                    row: 1,
                    column: 0,
                    value: 3.0
                },
                ImputedCell {
                    row: 2,
                    column: 1,
                    value: 20.0
                },
            ]
        );
        assert!(table.is_imputed(1, 0));
        assert!(!table.is_imputed(0, 0));
    }

    #[test]
    fn test_even_count_median() {
        let rows = vec![
            vec![Some(1.0), Some(0.0)],
            vec![Some(4.0), Some(0.0)],
            vec![None, Some(0.0)],
        ];
        let table = impute_median(&rows).unwrap();
        assert_eq!(table.rows[2][0], 2.5);
    }

    #[test]
    fn test_complete_table_is_unchanged() {
        let rows = vec![vec![Some(1.0), Some(2.0)]];
        let table = impute_median(&rows).unwrap();
        assert_eq!(table.rows, vec![vec![1.0, 2.0]]);
        assert!(table.imputed.is_empty());
    }

    #[test]
    fn test_all_missing_column_is_an_error() {
        let rows = vec![vec![Some(1.0), None], vec![Some(2.0), None]];
        assert!(matches!(
            impute_median(&rows),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_ragged_rows() {
        let rows = vec![vec![Some(1.0), None], vec![Some(2.0)]];
        assert!(matches!(
            impute_median(&rows),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
