use crate::data::series::{PricePoint, PriceSeries};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::path::Path;
use tracing::debug;

//loads a daily close series from a headered csv file
//needs a `date` column (YYYY-MM-DD) and a `close` column, matched case-insensitively,
//so both `date,close` and stooq-style `Date,Open,High,Low,Close,Volume` files work
pub fn load_price_csv<P: AsRef<Path>>(path: P, ticker: &str) -> Result<PriceSeries> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let headers = reader
        .headers()
        .context(format!("Failed to read CSV header of {:?}", path))?
        .clone();

    let date_col = column_index(&headers, "date")
        .ok_or_else(|| anyhow!("CSV file {:?} has no 'date' column", path))?;
    let close_col = column_index(&headers, "close")
        .ok_or_else(|| anyhow!("CSV file {:?} has no 'close' column", path))?;

    let mut points = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let line = index + 2;
        let record = result.context(format!("Failed to parse CSV record at line {}", line))?;

        //blank trailing lines
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let raw_date = record
            .get(date_col)
            .ok_or_else(|| anyhow!("Missing date at line {}", line))?;
        let raw_close = record
            .get(close_col)
            .ok_or_else(|| anyhow!("Missing close at line {}", line))?;

        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").context(format!(
            "Failed to parse date '{}' at line {}",
            raw_date, line
        ))?;
        let close: f64 = raw_close.parse().context(format!(
            "Failed to parse close '{}' at line {}",
            raw_close, line
        ))?;

        points.push(PricePoint::new(date, close));
    }

    //sort by date to ensure chronological order
    points.sort_by(|a, b| a.date.cmp(&b.date));

    debug!(ticker, rows = points.len(), path = ?path, "loaded price csv");

    PriceSeries::new(ticker, points).context(format!("Invalid price data in {:?}", path))
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}
