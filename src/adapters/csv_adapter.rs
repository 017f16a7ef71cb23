//! CSV export/import for OHLCV windows.
//!
//! Column order: date,open,high,low,close,volume. Used by the `export`
//! command and as an offline source for the `chart` command.

use std::path::Path;

use chrono::NaiveDate;

use crate::domain::error::QuantdeskError;
use crate::domain::ohlcv::{normalize, OhlcvBar};

pub fn write_ohlcv<P: AsRef<Path>>(path: P, bars: &[OhlcvBar]) -> Result<(), QuantdeskError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(["date", "open", "high", "low", "close", "volume"])?;

    for bar in bars {
        writer.write_record([
            bar.date.to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn read_ohlcv<P: AsRef<Path>>(path: P, symbol: &str) -> Result<Vec<OhlcvBar>, QuantdeskError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut bars = Vec::new();

    for result in reader.records() {
        let record = result?;
        let field = |i: usize, name: &str| -> Result<&str, QuantdeskError> {
            record.get(i).ok_or_else(|| {
                QuantdeskError::Csv(csv::Error::from(std::io::Error::other(format!(
                    "missing {} column",
                    name
                ))))
            })
        };

        let date = NaiveDate::parse_from_str(field(0, "date")?, "%Y-%m-%d").map_err(|e| {
            QuantdeskError::Csv(csv::Error::from(std::io::Error::other(format!(
                "invalid date: {}",
                e
            ))))
        })?;

        let parse_f64 = |i: usize, name: &str| -> Result<f64, QuantdeskError> {
            field(i, name)?.parse().map_err(|_| {
                QuantdeskError::Csv(csv::Error::from(std::io::Error::other(format!(
                    "invalid {} value",
                    name
                ))))
            })
        };

        bars.push(OhlcvBar {
            symbol: symbol.to_string(),
            date,
            open: parse_f64(1, "open")?,
            high: parse_f64(2, "high")?,
            low: parse_f64(3, "low")?,
            close: parse_f64(4, "close")?,
            volume: field(5, "volume")?.parse().unwrap_or(0),
        });
    }

    Ok(normalize(bars))
}
