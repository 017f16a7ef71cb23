//! Moving Average Convergence Divergence.
//!
//! Line = EMA(fast) - EMA(slow), valid from max(fast, slow) - 1.
//! Signal = EMA(signal) of the line, seeded with the SMA of its first
//! `signal` valid values. Histogram = line - signal, valid where both
//! are. The three series keep independent warm-ups and 1:1 alignment
//! with the input.

use crate::domain::indicator::{
    calculate_ema, IndicatorPoint, IndicatorSeries, IndicatorType,
};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone)]
pub struct MacdOutput {
    pub line: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdOutput {
    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
    let line_type = IndicatorType::MacdLine { fast, slow };
    let signal_type = IndicatorType::MacdSignal {
        fast,
        slow,
        signal: signal_period,
    };
    let hist_type = IndicatorType::MacdHistogram {
        fast,
        slow,
        signal: signal_period,
    };

    if fast == 0 || slow == 0 || signal_period == 0 {
        return MacdOutput {
            line: IndicatorSeries::invalid(line_type, &dates),
            signal: IndicatorSeries::invalid(signal_type, &dates),
            histogram: IndicatorSeries::invalid(hist_type, &dates),
        };
    }

    let ema_fast = calculate_ema(bars, fast);
    let ema_slow = calculate_ema(bars, slow);
    let line_warmup = fast.max(slow).saturating_sub(1);

    let mut line_values = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let valid = i >= line_warmup
            && ema_fast.values[i].valid
            && ema_slow.values[i].valid;
        line_values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: if valid {
                ema_fast.values[i].value - ema_slow.values[i].value
            } else {
                0.0
            },
        });
    }

    // EMA of the line, seeded with the SMA of its first `signal` values.
    let signal_warmup = line_warmup + signal_period - 1;
    let k = 2.0 / (signal_period as f64 + 1.0);
    let mut signal_values = Vec::with_capacity(bars.len());
    let mut signal_ema = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i < signal_warmup {
            signal_values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: 0.0,
            });
        } else if i == signal_warmup {
            let seed: f64 = line_values[line_warmup..=i]
                .iter()
                .map(|p| p.value)
                .sum::<f64>()
                / signal_period as f64;
            signal_ema = seed;
            signal_values.push(IndicatorPoint {
                date: bar.date,
                valid: true,
                value: signal_ema,
            });
        } else {
            signal_ema = (line_values[i].value - signal_ema) * k + signal_ema;
            signal_values.push(IndicatorPoint {
                date: bar.date,
                valid: true,
                value: signal_ema,
            });
        }
    }

    let mut hist_values = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let valid = line_values[i].valid && signal_values[i].valid;
        hist_values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: if valid {
                line_values[i].value - signal_values[i].value
            } else {
                0.0
            },
        });
    }

    MacdOutput {
        line: IndicatorSeries {
            indicator_type: line_type,
            values: line_values,
        },
        signal: IndicatorSeries {
            indicator_type: signal_type,
            values: signal_values,
        },
        histogram: IndicatorSeries {
            indicator_type: hist_type,
            values: hist_values,
        },
    }
}

pub fn calculate_macd_default(bars: &[OhlcvBar]) -> MacdOutput {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
