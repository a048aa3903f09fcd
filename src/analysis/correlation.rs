use crate::data::table::SeriesTable;
use ndarray::Array2;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorrelationError {
    #[error("correlation threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("need at least 2 instruments, got {0}")]
    TooFewInstruments(usize),
}

pub type Result<T> = std::result::Result<T, CorrelationError>;

/// Minimum paired observations for a defined correlation: the t statistic
/// needs n - 2 >= 1 degrees of freedom.
pub(crate) const MIN_OBSERVATIONS: usize = 3;

/// Pairwise Pearson correlation over the rows where both series have a
/// value. Returns the coefficient, its two-sided p-value, and the paired
/// observation count, or `None` when fewer than three rows pair up or
/// either side has zero variance.
pub(crate) fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<(f64, f64, usize)> {
    let paired: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();

    let n = paired.len();
    if n < MIN_OBSERVATIONS {
        return None;
    }

    let mean_x = paired.iter().map(|(a, _)| a).sum::<f64>() / n as f64;
    let mean_y = paired.iter().map(|(_, b)| b).sum::<f64>() / n as f64;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (a, b) in &paired {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }

    let r = (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0);
    Some((r, p_value(r, n), n))
}

/// Two-sided p-value for r under the null of zero correlation, from
/// t = r * sqrt((n - 2) / (1 - r^2)) with n - 2 degrees of freedom.
fn p_value(r: f64, n: usize) -> f64 {
    let df = (n - 2) as f64;
    let denom = 1.0 - r * r;
    if denom <= f64::EPSILON {
        return 0.0;
    }
    let t = r * (df / denom).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).expect("degrees of freedom >= 1");
    2.0 * dist.cdf(-t.abs())
}

/// Symmetric pairwise correlation matrix in the table's instrument order.
/// Entries without a defined correlation stay undefined; they are only
/// observable through the `Option` accessor.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    names: Vec<String>,
    values: Array2<f64>,
}

impl CorrelationMatrix {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        let value = self.values[[i, j]];
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }

}

/// One screened pair. `first < second` lexicographically; never mutated
/// after the scan that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelatedPair {
    pub first: String,
    pub second: String,
    pub correlation: f64,
    pub p_value: f64,
    pub observations: usize,
}

pub struct CorrelationEngine<'a> {
    table: &'a SeriesTable,
}

impl<'a> CorrelationEngine<'a> {
    pub fn new(table: &'a SeriesTable) -> Result<Self> {
        if table.n_instruments() < 2 {
            return Err(CorrelationError::TooFewInstruments(table.n_instruments()));
        }
        Ok(Self { table })
    }

    /// Full pairwise correlation matrix. Diagonal is 1.0; pairs lacking
    /// enough overlapping data stay undefined rather than defaulting to 0.
    pub fn matrix(&self) -> CorrelationMatrix {
        let n = self.table.n_instruments();
        let mut values = Array2::from_elem((n, n), f64::NAN);

        for i in 0..n {
            values[[i, i]] = 1.0;
            for j in (i + 1)..n {
                if let Some((r, _, _)) = pearson(self.table.column_at(i), self.table.column_at(j))
                {
                    values[[i, j]] = r;
                    values[[j, i]] = r;
                }
            }
        }

        CorrelationMatrix {
            names: self.table.names().to_vec(),
            values,
        }
    }

    /// Screens every unordered pair once and keeps those with
    /// |correlation| strictly above the threshold. Pairs without a
    /// defined correlation are dropped, not failed. The result is sorted
    /// by |correlation| descending, ties broken by the name pair.
    pub fn scan(&self, threshold: f64) -> Result<Vec<CorrelatedPair>> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(CorrelationError::InvalidThreshold(threshold));
        }

        let names = self.table.names();
        let mut pairs = Vec::new();
        for i in 0..names.len() {
            for j in (i + 1)..names.len() {
                let Some((r, p, n)) = pearson(self.table.column_at(i), self.table.column_at(j))
                else {
                    continue;
                };
                if r.abs() > threshold {
                    pairs.push(CorrelatedPair {
                        first: names[i].clone(),
                        second: names[j].clone(),
                        correlation: r,
                        p_value: p,
                        observations: n,
                    });
                }
            }
        }

        pairs.sort_by(|a, b| {
            b.correlation
                .abs()
                .partial_cmp(&a.correlation.abs())
                .unwrap()
                .then_with(|| (&a.first, &a.second).cmp(&(&b.first, &b.second)))
        });
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pearson_perfect_positive() {
        let x: Vec<Option<f64>> = [1.0, 2.0, 3.0, 4.0, 5.0].map(Some).to_vec();
        let y: Vec<Option<f64>> = [2.0, 4.0, 6.0, 8.0, 10.0].map(Some).to_vec();
        let (r, p, n) = pearson(&x, &y).unwrap();
        assert_relative_eq!(r, 1.0, epsilon = 1e-12);
        assert_eq!(p, 0.0);
        assert_eq!(n, 5);
    }

    #[test]
    fn test_pearson_skips_missing_rows() {
        let x = vec![Some(1.0), None, Some(2.0), Some(3.0), Some(4.0)];
        let y = vec![Some(2.0), Some(9.0), Some(4.0), None, Some(8.0)];
        // Paired rows are (1,2), (2,4), (4,8).
        let (r, _, n) = pearson(&x, &y).unwrap();
        assert_eq!(n, 3);
        assert_relative_eq!(r, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_undefined_below_three_pairs() {
        let x = vec![Some(1.0), Some(2.0), None];
        let y = vec![Some(2.0), Some(4.0), Some(6.0)];
        assert!(pearson(&x, &y).is_none());
    }

    #[test]
    fn test_pearson_undefined_for_flat_series() {
        let x: Vec<Option<f64>> = [5.0, 5.0, 5.0, 5.0].map(Some).to_vec();
        let y: Vec<Option<f64>> = [1.0, 2.0, 3.0, 4.0].map(Some).to_vec();
        assert!(pearson(&x, &y).is_none());
    }

    #[test]
    fn test_p_value_shrinks_with_sample_size() {
        let p_small = p_value(0.8, 5);
        let p_large = p_value(0.8, 50);
        assert!(p_small > p_large);
        assert!(p_large > 0.0 && p_small < 1.0);
    }
}
