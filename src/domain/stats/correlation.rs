//! Pearson correlation and the information coefficient.

/// Pearson correlation coefficient with sample (n-1) covariance and
/// standard deviation. Non-finite entries are dropped pairwise. Zero
/// variance on either side, or fewer than 2 surviving pairs, yields 0.0.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();

    let n = pairs.len();
    if n < 2 {
        return 0.0;
    }

    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (n - 1) as f64;
    cov /= denom;
    var_x /= denom;
    var_y /= denom;

    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }

    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Square symmetric matrix of pairwise Pearson correlations, indexed by
/// feature name. The diagonal is forced to 1.0; each unordered pair is
/// computed once and mirrored.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub features: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

pub fn correlation_matrix(columns: &[(String, Vec<f64>)]) -> CorrelationMatrix {
    let n = columns.len();
    let mut values = vec![vec![0.0; n]; n];

    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&columns[i].1, &columns[j].1);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        features: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
    }
}

/// Simple returns `horizon` steps ahead: out[i] = close[i+h]/close[i] - 1.
/// The last `horizon` entries have no lookahead and are NaN, which the
/// correlation functions drop pairwise.
pub fn forward_returns(closes: &[f64], horizon: usize) -> Vec<f64> {
    if horizon == 0 {
        return vec![f64::NAN; closes.len()];
    }
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if i + horizon < closes.len() && c != 0.0 {
                closes[i + horizon] / c - 1.0
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Information coefficient: correlation between a predictive signal and
/// subsequent realized returns, both aligned to the same rows.
pub fn information_coefficient(signal: &[f64], fwd_returns: &[f64]) -> f64 {
    pearson(signal, fwd_returns)
}
