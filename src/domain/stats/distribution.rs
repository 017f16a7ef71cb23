//! Histogram binning and boxplot five-number summaries.

/// One histogram bin over [lower, upper); the last bin is closed so the
/// maximum value is not lost.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub label: String,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Bin count is ceil(sqrt(n)). All-equal input collapses to a single
/// bin. The counts always sum to the number of finite samples.
pub fn histogram(values: &[f64]) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return vec![HistogramBin {
            label: format_range(min, min),
            lower: min,
            upper: min,
            count: finite.len(),
        }];
    }

    let bin_count = (finite.len() as f64).sqrt().ceil() as usize;
    let width = (max - min) / bin_count as f64;

    let mut counts = vec![0usize; bin_count];
    for v in &finite {
        let idx = (((v - min) / width) as usize).min(bin_count - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = min + i as f64 * width;
            let upper = min + (i + 1) as f64 * width;
            HistogramBin {
                label: format_range(lower, upper),
                lower,
                upper,
                count,
            }
        })
        .collect()
}

fn format_range(lower: f64, upper: f64) -> String {
    format!("{:.4} to {:.4}", lower, upper)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxplotSummary {
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// Nearest-rank quartiles (floor(n*q), no interpolation), 1.5*IQR fences
/// intersected with the data range, values outside the fences reported
/// as outliers. Empty or all-non-finite input yields None.
pub fn boxplot(values: &[f64]) -> Option<BoxplotSummary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let n = sorted.len();
    let q1 = sorted[(n as f64 * 0.25) as usize];
    let median = sorted[(n as f64 * 0.50) as usize];
    let q3 = sorted[(n as f64 * 0.75) as usize];

    let iqr = q3 - q1;
    let fence_low = q1 - 1.5 * iqr;
    let fence_high = q3 + 1.5 * iqr;

    let data_min = sorted[0];
    let data_max = sorted[n - 1];
    let whisker_low = fence_low.max(data_min);
    let whisker_high = fence_high.min(data_max);

    let outliers: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|&v| v < fence_low || v > fence_high)
        .collect();

    Some(BoxplotSummary {
        whisker_low,
        q1,
        median,
        q3,
        whisker_high,
        outliers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_bin_count_is_ceil_sqrt() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let bins = histogram(&values);
        assert_eq!(bins.len(), 10);
    }

    #[test]
    fn histogram_counts_sum_to_sample_size() {
        let values: Vec<f64> = (0..137).map(|i| (i as f64 * 0.37).sin() * 50.0).collect();
        let bins = histogram(&values);
        let total: usize = bins.iter().map(|b| b.count).sum();
        assert_eq!(total, 137);
    }

    #[test]
    fn histogram_max_value_lands_in_last_bin() {
        let values = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let bins = histogram(&values);
        assert!(bins.last().unwrap().count > 0);
        let total: usize = bins.iter().map(|b| b.count).sum();
        assert_eq!(total, values.len());
    }

    #[test]
    fn histogram_constant_input_single_bin() {
        let values = vec![4.2; 25];
        let bins = histogram(&values);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 25);
    }

    #[test]
    fn histogram_empty_input() {
        assert!(histogram(&[]).is_empty());
        assert!(histogram(&[f64::NAN, f64::NAN]).is_empty());
    }

    #[test]
    fn histogram_skips_non_finite() {
        let values = vec![1.0, f64::NAN, 2.0, f64::INFINITY, 3.0, 4.0];
        let bins = histogram(&values);
        let total: usize = bins.iter().map(|b| b.count).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn boxplot_known_decile_fixture() {
        let values: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let summary = boxplot(&values).unwrap();

        assert_eq!(summary.q1, 3.0);
        assert_eq!(summary.median, 6.0);
        assert_eq!(summary.q3, 8.0);
        assert!(summary.outliers.is_empty());
        assert_eq!(summary.whisker_low, 1.0);
        assert_eq!(summary.whisker_high, 10.0);
    }

    #[test]
    fn boxplot_flags_outliers() {
        let mut values: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        values.push(1000.0);
        let summary = boxplot(&values).unwrap();

        assert_eq!(summary.outliers, vec![1000.0]);
        assert!(summary.whisker_high < 1000.0);
    }

    #[test]
    fn boxplot_whiskers_clamped_to_data_range() {
        let values = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        let summary = boxplot(&values).unwrap();
        assert!(summary.whisker_low >= 10.0);
        assert!(summary.whisker_high <= 14.0);
    }

    #[test]
    fn boxplot_single_value() {
        let summary = boxplot(&[7.0]).unwrap();
        assert_eq!(summary.median, 7.0);
        assert_eq!(summary.q1, 7.0);
        assert_eq!(summary.q3, 7.0);
        assert!(summary.outliers.is_empty());
    }

    #[test]
    fn boxplot_empty_is_none() {
        assert!(boxplot(&[]).is_none());
        assert!(boxplot(&[f64::NAN]).is_none());
    }
}
