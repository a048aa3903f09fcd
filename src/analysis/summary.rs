use super::correlation::CorrelationMatrix;
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("need at least 2 instruments, got {0}")]
    TooFewInstruments(usize),
    #[error("no defined correlations to summarize")]
    NoDefinedValues,
}

pub type Result<T> = std::result::Result<T, SummaryError>;

/// Descriptive statistics over the independent correlations (strict
/// upper triangle). Skewness and kurtosis are undefined for fewer than
/// three values or zero spread, and stay `None` rather than NaN.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
}

/// Reduces the strict upper triangle of the matrix (i < j) to summary
/// statistics. Undefined entries are excluded; a matrix with no defined
/// off-diagonal entry at all cannot be summarized.
pub fn summarize(matrix: &CorrelationMatrix) -> Result<StatsSummary> {
    let n = matrix.len();
    if n < 2 {
        return Err(SummaryError::TooFewInstruments(n));
    }

    let mut values = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            if let Some(r) = matrix.get(i, j) {
                values.push(r);
            }
        }
    }
    if values.is_empty() {
        return Err(SummaryError::NoDefinedValues);
    }

    let count = values.len();
    let data = Array1::from(values);
    let mean = data.mean().unwrap();
    let min = *data.min().unwrap();
    let max = *data.max().unwrap();

    let m2 = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;
    let std_dev = m2.sqrt();

    let (skewness, kurtosis) = if count < 3 || m2 <= f64::EPSILON {
        (None, None)
    } else {
        let m3 = data.iter().map(|x| (x - mean).powi(3)).sum::<f64>() / count as f64;
        let m4 = data.iter().map(|x| (x - mean).powi(4)).sum::<f64>() / count as f64;
        (Some(m3 / m2.powf(1.5)), Some(m4 / (m2 * m2) - 3.0))
    };

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let median = if count % 2 == 1 {
        sorted[count / 2]
    } else {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    };

    Ok(StatsSummary {
        count,
        mean,
        median,
        std_dev,
        min,
        max,
        skewness,
        kurtosis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::correlation::CorrelationEngine;
    use crate::data::table::SeriesTable;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn table(columns: Vec<(&str, Vec<f64>)>) -> SeriesTable {
        let len = columns[0].1.len();
        let dates = (0..len)
            .map(|i| NaiveDate::from_num_days_from_ce_opt(739_000 + i as i32).unwrap())
            .collect();
        let columns = columns
            .into_iter()
            .map(|(name, values)| {
                (name.to_string(), values.into_iter().map(Some).collect())
            })
            .collect();
        SeriesTable::new(dates, columns).unwrap()
    }

    #[test]
    fn test_summary_counts_upper_triangle() {
        let table = table(vec![
            ("A", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("B", vec![2.0, 4.0, 6.0, 8.0, 10.0]),
            ("C", vec![5.0, 4.0, 3.0, 2.0, 1.0]),
        ]);
        let matrix = CorrelationEngine::new(&table).unwrap().matrix();
        let stats = summarize(&matrix).unwrap();

        // 3 instruments -> 3 independent entries: AB=1, AC=-1, BC=-1.
        assert_eq!(stats.count, 3);
        assert_relative_eq!(stats.mean, -1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(stats.median, -1.0, epsilon = 1e-12);
        assert_relative_eq!(stats.min, -1.0, epsilon = 1e-12);
        assert_relative_eq!(stats.max, 1.0, epsilon = 1e-12);
        assert!(stats.min <= stats.median && stats.median <= stats.max);
    }

    #[test]
    fn test_summary_degenerate_moments_are_undefined() {
        let table = table(vec![
            ("A", vec![1.0, 2.0, 3.0, 4.0]),
            ("B", vec![2.0, 4.0, 6.0, 8.0]),
        ]);
        let matrix = CorrelationEngine::new(&table).unwrap().matrix();
        let stats = summarize(&matrix).unwrap();

        // A single triangle value has no spread.
        assert_eq!(stats.count, 1);
        assert_relative_eq!(stats.std_dev, 0.0, epsilon = 1e-12);
        assert!(stats.skewness.is_none());
        assert!(stats.kurtosis.is_none());
    }
}
