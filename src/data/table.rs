use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("dates must be strictly increasing; violation at {0}")]
    UnorderedDates(NaiveDate),
    #[error("duplicate instrument name: {0}")]
    DuplicateInstrument(String),
    #[error("column {name} has {got} values, expected {expected}")]
    RaggedColumn {
        name: String,
        got: usize,
        expected: usize,
    },
    #[error("table must contain at least one instrument")]
    NoInstruments,
}

pub type Result<T> = std::result::Result<T, TableError>;

/// Date-indexed columnar store: one numeric series per instrument, one
/// value slot per date. Missing observations are `None` and get excluded
/// pairwise by downstream statistics rather than coerced to a number.
/// Immutable once constructed.
#[derive(Debug, Clone)]
pub struct SeriesTable {
    dates: Vec<NaiveDate>,
    names: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
    index: HashMap<String, usize>,
}

impl SeriesTable {
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<(String, Vec<Option<f64>>)>) -> Result<Self> {
        if columns.is_empty() {
            return Err(TableError::NoInstruments);
        }
        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(TableError::UnorderedDates(pair[1]));
            }
        }

        let mut names = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len());
        let mut index = HashMap::new();

        for (name, column) in columns {
            if column.len() != dates.len() {
                return Err(TableError::RaggedColumn {
                    name,
                    got: column.len(),
                    expected: dates.len(),
                });
            }
            if index.insert(name.clone(), names.len()).is_some() {
                return Err(TableError::DuplicateInstrument(name));
            }
            names.push(name);
            values.push(column);
        }

        Ok(Self {
            dates,
            names,
            columns: values,
            index,
        })
    }

    /// Number of timestamps.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn n_instruments(&self) -> usize {
        self.names.len()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.index.get(name).map(|&i| self.columns[i].as_slice())
    }

    pub fn column_at(&self, idx: usize) -> &[Option<f64>] {
        &self.columns[idx]
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Simple returns derived from price levels: r_t = p_t / p_{t-1} - 1.
    /// One row shorter than the source; a return is `None` unless both
    /// bounding prices are present.
    pub fn pct_change(&self) -> Result<Self> {
        let dates = self.dates.get(1..).unwrap_or_default().to_vec();
        let columns = self
            .names
            .iter()
            .zip(&self.columns)
            .map(|(name, prices)| {
                let returns = prices
                    .windows(2)
                    .map(|w| match (w[0], w[1]) {
                        (Some(prev), Some(cur)) if prev != 0.0 => Some(cur / prev - 1.0),
                        _ => None,
                    })
                    .collect();
                (name.clone(), returns)
            })
            .collect();
        Self::new(dates, columns)
    }
}
