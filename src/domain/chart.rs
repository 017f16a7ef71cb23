//! Declarative chart model.
//!
//! Pages describe what to plot as a `ChartSpec`; the web adapter renders
//! it to SVG. One parameterized builder instead of per-page chart code:
//! every page goes through the same few constructors below.

use crate::domain::indicator::{IndicatorSeries, MacdOutput};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::platform::CurvePoint;
use crate::domain::stats::HistogramBin;

/// Default series colors, assigned in order.
pub const PALETTE: [&str; 6] = [
    "#2563eb", "#dc2626", "#059669", "#d97706", "#7c3aed", "#475569",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisFormat {
    Plain,
    Price,
    Percent,
    Count,
}

#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub name: String,
    pub kind: SeriesKind,
    pub color: String,
    /// Aligned with the spec's x labels; `None` marks warm-up gaps, which
    /// render as breaks rather than interpolated segments.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub x_labels: Vec<String>,
    pub series: Vec<ChartSeries>,
    pub y_axis: AxisFormat,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    /// Horizontal guide lines (e.g. RSI 30/70).
    pub guides: Vec<f64>,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>, x_labels: Vec<String>) -> Self {
        Self {
            title: title.into(),
            x_labels,
            series: Vec::new(),
            y_axis: AxisFormat::Plain,
            y_min: None,
            y_max: None,
            guides: Vec::new(),
        }
    }

    pub fn with_axis(mut self, format: AxisFormat) -> Self {
        self.y_axis = format;
        self
    }

    pub fn with_y_range(mut self, min: f64, max: f64) -> Self {
        self.y_min = Some(min);
        self.y_max = Some(max);
        self
    }

    pub fn with_guides(mut self, guides: &[f64]) -> Self {
        self.guides = guides.to_vec();
        self
    }

    pub fn push_line(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        self.push_series(name, SeriesKind::Line, values);
    }

    pub fn push_bars(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        self.push_series(name, SeriesKind::Bar, values);
    }

    fn push_series(&mut self, name: impl Into<String>, kind: SeriesKind, values: Vec<Option<f64>>) {
        let color = PALETTE[self.series.len() % PALETTE.len()].to_string();
        self.series.push(ChartSeries {
            name: name.into(),
            kind,
            color,
            values,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.series
            .iter()
            .all(|s| s.values.iter().all(|v| v.is_none()))
    }
}

fn date_labels(bars: &[OhlcvBar]) -> Vec<String> {
    bars.iter().map(|b| b.date.to_string()).collect()
}

/// Close price plus indicator overlays (SMA/EMA), one shared y axis.
pub fn price_chart(symbol: &str, bars: &[OhlcvBar], overlays: &[IndicatorSeries]) -> ChartSpec {
    let mut spec =
        ChartSpec::new(format!("{} close", symbol), date_labels(bars)).with_axis(AxisFormat::Price);
    spec.push_line("close", bars.iter().map(|b| Some(b.close)).collect());
    for overlay in overlays {
        spec.push_line(overlay.indicator_type.to_string(), overlay.value_options());
    }
    spec
}

/// RSI panel with a fixed 0-100 range and 30/70 guides.
pub fn rsi_chart(symbol: &str, bars: &[OhlcvBar], rsi: &IndicatorSeries) -> ChartSpec {
    let mut spec = ChartSpec::new(
        format!("{} {}", symbol, rsi.indicator_type),
        date_labels(bars),
    )
    .with_y_range(0.0, 100.0)
    .with_guides(&[30.0, 70.0]);
    spec.push_line(rsi.indicator_type.to_string(), rsi.value_options());
    spec
}

/// MACD panel: line and signal as lines, histogram as bars.
pub fn macd_chart(symbol: &str, bars: &[OhlcvBar], macd: &MacdOutput) -> ChartSpec {
    let mut spec = ChartSpec::new(
        format!("{} {}", symbol, macd.line.indicator_type),
        date_labels(bars),
    )
    .with_guides(&[0.0]);
    spec.push_line("macd", macd.line.value_options());
    spec.push_line("signal", macd.signal.value_options());
    spec.push_bars("histogram", macd.histogram.value_options());
    spec
}

/// Distribution bar chart from histogram bins.
pub fn histogram_chart(title: &str, bins: &[HistogramBin]) -> ChartSpec {
    let labels = bins.iter().map(|b| b.label.clone()).collect();
    let mut spec = ChartSpec::new(title, labels).with_axis(AxisFormat::Count);
    spec.push_bars("count", bins.iter().map(|b| Some(b.count as f64)).collect());
    spec
}

/// Value-over-time line chart for equity and benchmark curves.
pub fn curve_chart(title: &str, curves: &[(&str, &[CurvePoint])]) -> ChartSpec {
    let labels = curves
        .first()
        .map(|(_, points)| points.iter().map(|p| p.date.to_string()).collect())
        .unwrap_or_default();
    let mut spec = ChartSpec::new(title, labels).with_axis(AxisFormat::Price);
    for (name, points) in curves {
        spec.push_line(*name, points.iter().map(|p| Some(p.value)).collect());
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{calculate_macd_default, calculate_rsi, calculate_sma};
    use chrono::NaiveDate;

    fn make_bars(n: usize) -> Vec<OhlcvBar> {
        (0..n)
            .map(|i| OhlcvBar {
                symbol: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: 100.0 + i as f64,
                high: 101.0 + i as f64,
                low: 99.0 + i as f64,
                close: 100.0 + i as f64,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn price_chart_aligns_overlays_with_labels() {
        let bars = make_bars(10);
        let sma = calculate_sma(&bars, 3);
        let spec = price_chart("TEST", &bars, &[sma]);

        assert_eq!(spec.x_labels.len(), 10);
        assert_eq!(spec.series.len(), 2);
        for series in &spec.series {
            assert_eq!(series.values.len(), 10);
        }
        assert_eq!(spec.series[1].name, "SMA(3)");
        assert!(spec.series[1].values[0].is_none());
        assert!(spec.series[1].values[2].is_some());
    }

    #[test]
    fn rsi_chart_has_fixed_range_and_guides() {
        let bars = make_bars(20);
        let rsi = calculate_rsi(&bars, 14);
        let spec = rsi_chart("TEST", &bars, &rsi);

        assert_eq!(spec.y_min, Some(0.0));
        assert_eq!(spec.y_max, Some(100.0));
        assert_eq!(spec.guides, vec![30.0, 70.0]);
    }

    #[test]
    fn macd_chart_has_three_series() {
        let bars = make_bars(40);
        let macd = calculate_macd_default(&bars);
        let spec = macd_chart("TEST", &bars, &macd);

        assert_eq!(spec.series.len(), 3);
        assert_eq!(spec.series[2].kind, SeriesKind::Bar);
    }

    #[test]
    fn palette_cycles() {
        let bars = make_bars(5);
        let mut spec = ChartSpec::new("x", vec![]);
        for i in 0..8 {
            spec.push_line(format!("s{}", i), bars.iter().map(|b| Some(b.close)).collect());
        }
        assert_eq!(spec.series[0].color, spec.series[6].color);
    }

    #[test]
    fn empty_spec_detection() {
        let mut spec = ChartSpec::new("x", vec!["a".into()]);
        spec.push_line("gap", vec![None]);
        assert!(spec.is_empty());
        spec.push_line("real", vec![Some(1.0)]);
        assert!(!spec.is_empty());
    }
}
