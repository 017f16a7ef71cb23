//! Simple Moving Average.
//!
//! Rolling sum over a window of n closes. Warmup: first (n-1) bars are
//! invalid; a series shorter than n is invalid throughout.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
    if period == 0 || bars.len() < period {
        return IndicatorSeries::invalid(IndicatorType::Sma(period), &dates);
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut window_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.close;
        if i >= period {
            window_sum -= bars[i - period].close;
        }

        if i < period - 1 {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: 0.0,
            });
        } else {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: true,
                value: window_sum / period as f64,
            });
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
