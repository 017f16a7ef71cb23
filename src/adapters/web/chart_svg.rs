//! Inline SVG rendering for chart specs.
//!
//! Pure string assembly, no drawing library: min/max scaling into a
//! fixed viewport, one polyline per line series (broken at warm-up
//! gaps), rects for bar series. Heatmaps and boxplots have their own
//! renderers since they are not x/y series.

use crate::domain::chart::{AxisFormat, ChartSpec, SeriesKind};
use crate::domain::stats::{BoxplotSummary, CorrelationMatrix};

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 260.0;
const PADDING: f64 = 42.0;

pub fn render_chart(spec: &ChartSpec) -> String {
    if spec.x_labels.is_empty() || spec.is_empty() {
        return empty_note();
    }

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for series in &spec.series {
        for value in series.values.iter().flatten() {
            min_y = min_y.min(*value);
            max_y = max_y.max(*value);
        }
    }
    for guide in &spec.guides {
        min_y = min_y.min(*guide);
        max_y = max_y.max(*guide);
    }
    if let Some(y) = spec.y_min {
        min_y = y;
    }
    if let Some(y) = spec.y_max {
        max_y = y;
    }
    if !min_y.is_finite() || !max_y.is_finite() {
        return empty_note();
    }

    let range = max_y - min_y;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let n = spec.x_labels.len();
    let scale_x = if n > 1 {
        plot_width / (n - 1) as f64
    } else {
        0.0
    };

    let x_at = |i: usize| PADDING + i as f64 * scale_x;
    let y_at = |v: f64| HEIGHT - PADDING - (v - min_y) * scale_y;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" class="chart" role="img" aria-label="{title}">"#,
        w = WIDTH,
        h = HEIGHT,
        title = escape(&spec.title)
    );

    // Frame
    svg.push_str(&format!(
        r##"<line x1="{x0:.1}" y1="{y0:.1}" x2="{x0:.1}" y2="{y1:.1}" stroke="#94a3b8"/>"##,
        x0 = PADDING,
        y0 = PADDING,
        y1 = HEIGHT - PADDING
    ));
    svg.push_str(&format!(
        r##"<line x1="{x0:.1}" y1="{y:.1}" x2="{x1:.1}" y2="{y:.1}" stroke="#94a3b8"/>"##,
        x0 = PADDING,
        x1 = WIDTH - PADDING,
        y = HEIGHT - PADDING
    ));

    for guide in &spec.guides {
        let y = y_at(*guide);
        svg.push_str(&format!(
            r##"<line x1="{x0:.1}" y1="{y:.1}" x2="{x1:.1}" y2="{y:.1}" stroke="#cbd5e1" stroke-dasharray="4 3"/>"##,
            x0 = PADDING,
            x1 = WIDTH - PADDING,
        ));
    }

    // Axis labels: y min/max, x first/last.
    svg.push_str(&format!(
        r#"<text x="{x:.1}" y="{y:.1}" class="axis">{label}</text>"#,
        x = 4.0,
        y = PADDING + 4.0,
        label = format_axis(spec.y_axis, max_y)
    ));
    svg.push_str(&format!(
        r#"<text x="{x:.1}" y="{y:.1}" class="axis">{label}</text>"#,
        x = 4.0,
        y = HEIGHT - PADDING,
        label = format_axis(spec.y_axis, min_y)
    ));
    svg.push_str(&format!(
        r#"<text x="{x:.1}" y="{y:.1}" class="axis">{label}</text>"#,
        x = PADDING,
        y = HEIGHT - PADDING + 16.0,
        label = escape(spec.x_labels.first().map(String::as_str).unwrap_or(""))
    ));
    svg.push_str(&format!(
        r#"<text x="{x:.1}" y="{y:.1}" class="axis" text-anchor="end">{label}</text>"#,
        x = WIDTH - PADDING,
        y = HEIGHT - PADDING + 16.0,
        label = escape(spec.x_labels.last().map(String::as_str).unwrap_or(""))
    ));

    // Bar baseline: zero when it is inside the range, else the bottom.
    let baseline = if min_y <= 0.0 && max_y >= 0.0 {
        y_at(0.0)
    } else {
        HEIGHT - PADDING
    };
    let bar_width = (plot_width / n as f64 * 0.6).max(1.0);

    for series in &spec.series {
        match series.kind {
            SeriesKind::Bar => {
                for (i, value) in series.values.iter().enumerate() {
                    let Some(v) = value else { continue };
                    let y = y_at(*v);
                    let (top, height) = if y < baseline {
                        (y, baseline - y)
                    } else {
                        (baseline, y - baseline)
                    };
                    svg.push_str(&format!(
                        r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{color}" fill-opacity="0.6"/>"#,
                        x = x_at(i) - bar_width / 2.0,
                        y = top,
                        w = bar_width,
                        h = height.max(0.5),
                        color = series.color
                    ));
                }
            }
            SeriesKind::Line => {
                let mut segment: Vec<String> = Vec::new();
                let mut flush = |segment: &mut Vec<String>, svg: &mut String| {
                    if segment.len() > 1 {
                        svg.push_str(&format!(
                            r#"<polyline points="{points}" fill="none" stroke="{color}" stroke-width="1.5"/>"#,
                            points = segment.join(" "),
                            color = series.color
                        ));
                    }
                    segment.clear();
                };
                for (i, value) in series.values.iter().enumerate() {
                    match value {
                        Some(v) => {
                            segment.push(format!("{:.1},{:.1}", x_at(i), y_at(*v)));
                        }
                        None => flush(&mut segment, &mut svg),
                    }
                }
                flush(&mut segment, &mut svg);
            }
        }
    }

    // Legend along the top edge.
    let mut legend_x = PADDING;
    for series in &spec.series {
        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{y:.1}" class="legend" fill="{color}">{name}</text>"#,
            x = legend_x,
            y = 16.0,
            color = series.color,
            name = escape(&series.name)
        ));
        legend_x += 12.0 + 7.0 * series.name.len() as f64;
    }

    svg.push_str("</svg>");
    svg
}

pub fn render_heatmap(matrix: &CorrelationMatrix) -> String {
    if matrix.is_empty() {
        return empty_note();
    }

    let n = matrix.len();
    let label_space = 110.0;
    let cell = 36.0;
    let width = label_space + n as f64 * cell + 10.0;
    let height = label_space + n as f64 * cell + 10.0;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" class="chart heatmap" role="img" aria-label="correlation matrix">"#,
        w = width,
        h = height
    );

    for (i, name) in matrix.features.iter().enumerate() {
        // Row label.
        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{y:.1}" class="axis" text-anchor="end">{name}</text>"#,
            x = label_space - 6.0,
            y = label_space + i as f64 * cell + cell / 2.0 + 4.0,
            name = escape(name)
        ));
        // Column label, rotated.
        let cx = label_space + i as f64 * cell + cell / 2.0;
        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{y:.1}" class="axis" text-anchor="start" transform="rotate(-60 {x:.1} {y:.1})">{name}</text>"#,
            x = cx,
            y = label_space - 8.0,
            name = escape(name)
        ));
    }

    for i in 0..n {
        for j in 0..n {
            let value = matrix.get(i, j);
            svg.push_str(&format!(
                r##"<rect x="{x:.1}" y="{y:.1}" width="{c:.1}" height="{c:.1}" fill="{fill}" stroke="#ffffff"/>"##,
                x = label_space + j as f64 * cell,
                y = label_space + i as f64 * cell,
                c = cell,
                fill = heat_color(value)
            ));
            svg.push_str(&format!(
                r#"<text x="{x:.1}" y="{y:.1}" class="cell" text-anchor="middle">{v:.2}</text>"#,
                x = label_space + j as f64 * cell + cell / 2.0,
                y = label_space + i as f64 * cell + cell / 2.0 + 4.0,
                v = value
            ));
        }
    }

    svg.push_str("</svg>");
    svg
}

pub fn render_boxplots(entries: &[(String, BoxplotSummary)]) -> String {
    if entries.is_empty() {
        return empty_note();
    }

    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for (_, s) in entries {
        min_v = min_v.min(s.whisker_low);
        max_v = max_v.max(s.whisker_high);
        for o in &s.outliers {
            min_v = min_v.min(*o);
            max_v = max_v.max(*o);
        }
    }
    if min_v == max_v {
        // Degenerate spread; widen so boxes stay visible.
        min_v -= 1.0;
        max_v += 1.0;
    }

    let label_space = 120.0;
    let row = 44.0;
    let width = 720.0;
    let height = entries.len() as f64 * row + 20.0;
    let plot_width = width - label_space - 30.0;
    let x_at = |v: f64| label_space + (v - min_v) / (max_v - min_v) * plot_width;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" class="chart" role="img" aria-label="distribution boxplots">"#,
        w = width,
        h = height
    );

    for (i, (name, s)) in entries.iter().enumerate() {
        let cy = i as f64 * row + row / 2.0 + 10.0;
        let box_h = row * 0.5;

        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{y:.1}" class="axis" text-anchor="end">{name}</text>"#,
            x = label_space - 8.0,
            y = cy + 4.0,
            name = escape(name)
        ));

        // Whisker span.
        svg.push_str(&format!(
            r##"<line x1="{x1:.1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" stroke="#475569"/>"##,
            x1 = x_at(s.whisker_low),
            x2 = x_at(s.whisker_high),
            y = cy
        ));
        // Quartile box with median tick.
        svg.push_str(&format!(
            r##"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="#2563eb" fill-opacity="0.35" stroke="#2563eb"/>"##,
            x = x_at(s.q1),
            y = cy - box_h / 2.0,
            w = (x_at(s.q3) - x_at(s.q1)).max(1.0),
            h = box_h
        ));
        svg.push_str(&format!(
            r##"<line x1="{x:.1}" y1="{y1:.1}" x2="{x:.1}" y2="{y2:.1}" stroke="#1e3a8a" stroke-width="2"/>"##,
            x = x_at(s.median),
            y1 = cy - box_h / 2.0,
            y2 = cy + box_h / 2.0
        ));
        for outlier in &s.outliers {
            svg.push_str(&format!(
                r##"<circle cx="{x:.1}" cy="{y:.1}" r="2.5" fill="#dc2626"/>"##,
                x = x_at(*outlier),
                y = cy
            ));
        }
    }

    svg.push_str("</svg>");
    svg
}

fn format_axis(format: AxisFormat, value: f64) -> String {
    match format {
        AxisFormat::Plain => format!("{:.2}", value),
        AxisFormat::Price => format!("{:.2}", value),
        AxisFormat::Percent => format!("{:.1}%", value * 100.0),
        AxisFormat::Count => format!("{:.0}", value),
    }
}

/// Diverging blue-white-red ramp over [-1, 1].
fn heat_color(value: f64) -> String {
    let v = value.clamp(-1.0, 1.0);
    let (r, g, b) = if v >= 0.0 {
        let t = v;
        (
            255.0 - t * (255.0 - 220.0),
            255.0 - t * (255.0 - 38.0),
            255.0 - t * (255.0 - 38.0),
        )
    } else {
        let t = -v;
        (
            255.0 - t * (255.0 - 37.0),
            255.0 - t * (255.0 - 99.0),
            255.0 - t * (255.0 - 235.0),
        )
    };
    format!("rgb({},{},{})", r as u8, g as u8, b as u8)
}

fn empty_note() -> String {
    "<p class=\"chart-empty\">No data to chart.</p>".to_string()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
