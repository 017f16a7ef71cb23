//! Technical indicator engine.
//!
//! Every indicator output is aligned 1:1 with its input bar sequence.
//! Warm-up entries carry `valid: false` and a placeholder value; callers
//! must check the flag before using a point. Degenerate input (empty
//! series, zero period, too few bars) produces an aligned all-invalid
//! series rather than an error, so a render pass is never interrupted.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use ema::calculate_ema;
pub use macd::{calculate_macd, calculate_macd_default, MacdOutput};
pub use rsi::{calculate_rsi, DEFAULT_RSI_PERIOD};
pub use sma::calculate_sma;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    MacdLine {
        fast: usize,
        slow: usize,
    },
    MacdSignal {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    MacdHistogram {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// All-invalid series aligned with `dates`, used for degenerate input.
    pub fn invalid(indicator_type: IndicatorType, dates: &[NaiveDate]) -> Self {
        Self {
            indicator_type,
            values: dates
                .iter()
                .map(|&date| IndicatorPoint {
                    date,
                    valid: false,
                    value: 0.0,
                })
                .collect(),
        }
    }

    /// Values as `Option<f64>`, `None` for warm-up entries. The shape the
    /// chart builder consumes.
    pub fn value_options(&self) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|p| if p.valid { Some(p.value) } else { None })
            .collect()
    }

    pub fn first_valid_index(&self) -> Option<usize> {
        self.values.iter().position(|p| p.valid)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::MacdLine { fast, slow } => write!(f, "MACD({},{})", fast, slow),
            IndicatorType::MacdSignal { fast, slow, signal } => {
                write!(f, "MACD SIGNAL({},{},{})", fast, slow, signal)
            }
            IndicatorType::MacdHistogram { fast, slow, signal } => {
                write!(f, "MACD HIST({},{},{})", fast, slow, signal)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display_sma() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
    }

    #[test]
    fn indicator_type_display_macd_line() {
        let t = IndicatorType::MacdLine { fast: 12, slow: 26 };
        assert_eq!(t.to_string(), "MACD(12,26)");
    }

    #[test]
    fn indicator_type_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(IndicatorType::Sma(20), "sma20");
        map.insert(IndicatorType::Rsi(14), "rsi14");

        assert_eq!(map.get(&IndicatorType::Sma(20)), Some(&"sma20"));
        assert_eq!(map.get(&IndicatorType::Rsi(14)), Some(&"rsi14"));
        assert_eq!(map.get(&IndicatorType::Sma(50)), None);
    }

    #[test]
    fn value_options_maps_warmup_to_none() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        ];
        let mut series = IndicatorSeries::invalid(IndicatorType::Sma(2), &dates);
        series.values[1].valid = true;
        series.values[1].value = 5.0;

        assert_eq!(series.value_options(), vec![None, Some(5.0)]);
        assert_eq!(series.first_valid_index(), Some(1));
    }
}
