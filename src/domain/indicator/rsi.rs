//! Relative Strength Index.
//!
//! Wilder's smoothing for average gain/loss:
//! - first averages: simple mean over the first n deltas
//! - subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! RSI = 100 - 100/(1 + avg_gain/avg_loss); avg_loss == 0 yields 100.
//! Warmup: first n bars are invalid (n deltas are needed for the seed).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_RSI_PERIOD: usize = 14;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
    if period == 0 || bars.len() < 2 {
        return IndicatorSeries::invalid(IndicatorType::Rsi(period), &dates);
    }

    let mut gains: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    for i in 1..bars.len() {
        let change = bars[i].close - bars[i - 1].close;
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut values = Vec::with_capacity(bars.len());
    values.push(IndicatorPoint {
        date: bars[0].date,
        valid: false,
        value: 0.0,
    });

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (i, bar) in bars.iter().enumerate().skip(1) {
        let delta_idx = i - 1;

        if delta_idx < period - 1 {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: 0.0,
            });
            continue;
        }

        if delta_idx == period - 1 {
            avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
            avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gains[delta_idx]) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + losses[delta_idx]) / period as f64;
        }

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };
        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: rsi,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                symbol: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn rsi_empty_bars() {
        let series = calculate_rsi(&[], 14);
        assert!(series.values.is_empty());
    }

    #[test]
    fn rsi_single_bar_is_invalid() {
        let bars = make_bars(&[100.0]);
        let series = calculate_rsi(&bars, 14);
        assert_eq!(series.values.len(), 1);
        assert!(!series.values[0].valid);
    }

    #[test]
    fn rsi_warmup_period() {
        let bars = make_bars(
            &(0..20)
                .map(|i| 100.0 + (i % 5) as f64 * 2.0)
                .collect::<Vec<_>>(),
        );
        let series = calculate_rsi(&bars, 14);

        for i in 0..14 {
            assert!(!series.values[i].valid, "bar {} should be invalid", i);
        }
        assert!(series.values[14].valid, "bar 14 should be valid");
    }

    #[test]
    fn rsi_all_gains_is_exactly_100() {
        let bars = make_bars(&(0..16).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let series = calculate_rsi(&bars, 14);

        for point in series.values.iter().filter(|p| p.valid) {
            assert!((point.value - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let bars = make_bars(&(0..16).map(|i| 100.0 - i as f64).collect::<Vec<_>>());
        let series = calculate_rsi(&bars, 14);

        for point in series.values.iter().filter(|p| p.valid) {
            assert!((point.value - 0.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn rsi_stays_in_range() {
        let bars = make_bars(
            &(0..40)
                .map(|i| 100.0 + ((i % 7) as f64 - 3.0) * 2.0)
                .collect::<Vec<_>>(),
        );
        let series = calculate_rsi(&bars, 14);

        for point in series.values.iter().filter(|p| p.valid) {
            assert!(point.value >= 0.0 && point.value <= 100.0);
        }
    }

    #[test]
    fn rsi_wilder_smoothing_after_seed() {
        let bars = make_bars(&[10.0, 11.0, 10.0, 12.0, 13.0]);
        let series = calculate_rsi(&bars, 3);

        // deltas: +1, -1, +2, +1
        let seed_gain = (1.0 + 0.0 + 2.0) / 3.0;
        let seed_loss = (0.0 + 1.0 + 0.0) / 3.0;
        let seed_rsi = 100.0 - 100.0 / (1.0 + seed_gain / seed_loss);
        assert!((series.values[3].value - seed_rsi).abs() < 1e-9);

        let avg_gain = (seed_gain * 2.0 + 1.0) / 3.0;
        let avg_loss = (seed_loss * 2.0 + 0.0) / 3.0;
        let rsi = 100.0 - 100.0 / (1.0 + avg_gain / avg_loss);
        assert!((series.values[4].value - rsi).abs() < 1e-9);
    }

    #[test]
    fn rsi_zero_period_all_invalid() {
        let bars = make_bars(&[100.0, 101.0]);
        let series = calculate_rsi(&bars, 0);
        assert_eq!(series.values.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }
}
