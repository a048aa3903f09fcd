use super::correlation::{pearson, CorrelatedPair, MIN_OBSERVATIONS};
use crate::data::table::SeriesTable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RollingError {
    #[error("rolling window must be at least 3, got {got}")]
    InvalidWindow { got: usize },
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),
}

pub type Result<T> = std::result::Result<T, RollingError>;

/// Windowed correlation for one pair, aligned entry-for-entry with the
/// source table's date index. The first `window - 1` entries are always
/// undefined, as is any window with fewer than three paired observations.
#[derive(Debug, Clone)]
pub struct RollingSeries {
    pub first: String,
    pub second: String,
    pub values: Vec<Option<f64>>,
}

impl RollingSeries {
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

pub struct RollingCorrelationTracker<'a> {
    table: &'a SeriesTable,
    window: usize,
}

impl<'a> RollingCorrelationTracker<'a> {
    pub fn new(table: &'a SeriesTable, window: usize) -> Result<Self> {
        if window < MIN_OBSERVATIONS {
            return Err(RollingError::InvalidWindow { got: window });
        }
        Ok(Self { table, window })
    }

    pub fn track(&self, first: &str, second: &str) -> Result<RollingSeries> {
        let x = self
            .table
            .column(first)
            .ok_or_else(|| RollingError::UnknownInstrument(first.to_string()))?;
        let y = self
            .table
            .column(second)
            .ok_or_else(|| RollingError::UnknownInstrument(second.to_string()))?;

        let n = self.table.len();
        let mut values = vec![None; n];
        for t in (self.window - 1)..n {
            let start = t + 1 - self.window;
            values[t] = pearson(&x[start..=t], &y[start..=t]).map(|(r, _, _)| r);
        }

        Ok(RollingSeries {
            first: first.to_string(),
            second: second.to_string(),
            values,
        })
    }

    /// One rolling series per screened pair, typically the top of a
    /// correlation scan.
    pub fn track_pairs(&self, pairs: &[CorrelatedPair]) -> Result<Vec<RollingSeries>> {
        pairs
            .iter()
            .map(|pair| self.track(&pair.first, &pair.second))
            .collect()
    }
}
