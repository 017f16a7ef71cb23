//! Indicator engine integration tests: alignment contracts and known
//! fixtures, plus property tests over arbitrary price paths.

mod common;

use proptest::prelude::*;

use quantdesk::domain::indicator::{
    calculate_ema, calculate_macd, calculate_macd_default, calculate_rsi, calculate_sma,
};
use quantdesk::domain::ohlcv::OhlcvBar;

use common::generate_bars;

fn bars_from(prices: &[f64]) -> Vec<OhlcvBar> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            symbol: "TEST".into(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1,
        })
        .collect()
}

#[test]
fn sma_fixture_one_to_five_period_three() {
    let bars = bars_from(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let series = calculate_sma(&bars, 3);

    let values: Vec<Option<f64>> = series.value_options();
    assert_eq!(values[0], None);
    assert_eq!(values[1], None);
    assert_eq!(values[2], Some(2.0));
    assert_eq!(values[3], Some(3.0));
    assert_eq!(values[4], Some(4.0));
}

#[test]
fn rsi_monotonic_sequences_hit_the_bounds() {
    let up = generate_bars("UP", "2024-01-01", 30, 100.0);
    let rsi_up = calculate_rsi(&up, 14);
    for point in rsi_up.values.iter().filter(|p| p.valid) {
        assert!((point.value - 100.0).abs() < f64::EPSILON);
    }

    let down = bars_from(&(0..30).map(|i| 200.0 - i as f64).collect::<Vec<_>>());
    let rsi_down = calculate_rsi(&down, 14);
    for point in rsi_down.values.iter().filter(|p| p.valid) {
        assert!(point.value.abs() < f64::EPSILON);
    }
}

#[test]
fn macd_histogram_defined_exactly_from_warmup_index() {
    let bars = generate_bars("T", "2024-01-01", 60, 100.0);
    let out = calculate_macd_default(&bars);

    let warmup = 26 + 9 - 2;
    for (i, point) in out.histogram.values.iter().enumerate() {
        assert_eq!(point.valid, i >= warmup, "index {}", i);
    }
    assert_eq!(out.line.first_valid_index(), Some(25));
    assert_eq!(out.signal.first_valid_index(), Some(warmup));
}

#[test]
fn indicator_outputs_always_align_with_input() {
    for n in [0usize, 1, 5, 13, 14, 15, 40] {
        let bars = generate_bars("T", "2024-01-01", n, 50.0);
        assert_eq!(calculate_sma(&bars, 14).values.len(), n);
        assert_eq!(calculate_ema(&bars, 14).values.len(), n);
        assert_eq!(calculate_rsi(&bars, 14).values.len(), n);
        let macd = calculate_macd(&bars, 12, 26, 9);
        assert_eq!(macd.line.values.len(), n);
        assert_eq!(macd.signal.values.len(), n);
        assert_eq!(macd.histogram.values.len(), n);
    }
}

proptest! {
    #[test]
    fn sma_equals_trailing_window_mean(
        prices in proptest::collection::vec(1.0f64..1000.0, 1..80),
        period in 1usize..20,
    ) {
        let bars = bars_from(&prices);
        let series = calculate_sma(&bars, period);

        prop_assert_eq!(series.values.len(), prices.len());
        for (i, point) in series.values.iter().enumerate() {
            if prices.len() < period || i < period - 1 {
                prop_assert!(!point.valid);
            } else {
                let window = &prices[i + 1 - period..=i];
                let mean = window.iter().sum::<f64>() / period as f64;
                prop_assert!((point.value - mean).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn ema_stays_within_price_envelope(
        prices in proptest::collection::vec(1.0f64..1000.0, 1..80),
        period in 1usize..20,
    ) {
        let bars = bars_from(&prices);
        let series = calculate_ema(&bars, period);

        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for point in series.values.iter().filter(|p| p.valid) {
            prop_assert!(point.value >= min - 1e-9);
            prop_assert!(point.value <= max + 1e-9);
        }
    }

    #[test]
    fn rsi_is_bounded(
        prices in proptest::collection::vec(1.0f64..1000.0, 2..80),
        period in 1usize..20,
    ) {
        let bars = bars_from(&prices);
        let series = calculate_rsi(&bars, period);

        for point in series.values.iter().filter(|p| p.valid) {
            prop_assert!(point.value >= 0.0);
            prop_assert!(point.value <= 100.0);
        }
    }

    #[test]
    fn macd_histogram_is_line_minus_signal_everywhere(
        prices in proptest::collection::vec(1.0f64..1000.0, 1..120),
    ) {
        let bars = bars_from(&prices);
        let out = calculate_macd_default(&bars);

        for i in 0..bars.len() {
            if out.histogram.values[i].valid {
                prop_assert!(out.line.values[i].valid);
                prop_assert!(out.signal.values[i].valid);
                let expected = out.line.values[i].value - out.signal.values[i].value;
                prop_assert!((out.histogram.values[i].value - expected).abs() < 1e-9);
            }
        }
    }
}
