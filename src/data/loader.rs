use super::table::SeriesTable;
use super::{DataError, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct DataLoader;

impl DataLoader {
    fn verify_date_column(headers: &[String]) -> Result<()> {
        match headers.first() {
            Some(first) if first.eq_ignore_ascii_case("date") => Ok(()),
            _ => Err(DataError::MissingColumn("date".to_string())),
        }
    }

    /// Loads a wide-format delimited file: a leading date column plus one
    /// numeric column per instrument. Blank cells become missing
    /// observations. Rows are sorted by date before table construction;
    /// duplicate dates are rejected there.
    pub fn load_prices<P: AsRef<Path>>(path: P) -> Result<SeriesTable> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_path(&path)?;

        let headers: Vec<String> = rdr.headers()?.iter().map(|s| s.to_string()).collect();
        Self::verify_date_column(&headers)?;
        let instruments: Vec<String> = headers[1..].to_vec();

        let mut rows: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::new();
        for (row_idx, result) in rdr.records().enumerate() {
            let record = result?;
            let date = NaiveDate::parse_from_str(&record[0], DATE_FORMAT)?;

            let mut values = Vec::with_capacity(instruments.len());
            for (col_idx, instrument) in instruments.iter().enumerate() {
                let field = &record[col_idx + 1];
                if field.is_empty() {
                    values.push(None);
                } else {
                    let parsed =
                        field
                            .parse::<f64>()
                            .map_err(|_| DataError::InvalidValue {
                                instrument: instrument.clone(),
                                row: row_idx + 2, // 1-based, counting the header
                                value: field.to_string(),
                            })?;
                    values.push(Some(parsed));
                }
            }
            rows.push((date, values));
        }

        if rows.is_empty() {
            return Err(DataError::Empty);
        }
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        let dates: Vec<NaiveDate> = rows.iter().map(|(date, _)| *date).collect();
        let columns = instruments
            .into_iter()
            .enumerate()
            .map(|(j, name)| {
                let series = rows.iter().map(|(_, values)| values[j]).collect();
                (name, series)
            })
            .collect();

        Ok(SeriesTable::new(dates, columns)?)
    }
}
