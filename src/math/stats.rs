//! Descriptive statistics over correlation samples.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around `mean_val`.
pub fn std_dev(values: &[f64], mean_val: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let var = values
        .iter()
        .map(|v| {
            let d = v - mean_val;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    var.sqrt()
}

pub fn mean_std(values: &[f64]) -> (f64, f64) {
    let m = mean(values);
    (m, std_dev(values, m))
}

/// Drops `head` and `tail` fractions from either end. Falls back to the full
/// slice when trimming would leave nothing.
pub fn trim_ends(values: &[f64], head: f64, tail: f64) -> &[f64] {
    let n = values.len();
    let h = (head * n as f64).floor() as usize;
    let t = (tail * n as f64).floor() as usize;
    if h + t >= n {
        return values;
    }
    &values[h..(n - t)]
}
