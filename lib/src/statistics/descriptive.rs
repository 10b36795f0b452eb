//! Descriptive statistics helpers shared by the statistic blocks

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Bessel-corrected (N-1) standard deviation; 0 for fewer than two values
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    let ss: f64 = values.iter().map(|&v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Ascending copy of `values`
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Percentile `p` (0..=100) of ascending `sorted` values, interpolating
/// linearly between the two nearest order statistics
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile(&sorted(values), 50.0)
}

/// Slope of the ordinary least squares line `y = a·x + b`.
///
/// NaN when fewer than two points or all `x` are equal.
pub fn ols_slope(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }
    let mx = x[..n].iter().sum::<f64>() / n as f64;
    let my = y[..n].iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (&xi, &yi) in x[..n].iter().zip(&y[..n]) {
        sxy += (xi - mx) * (yi - my);
        sxx += (xi - mx) * (xi - mx);
    }

    if sxx == 0.0 {
        f64::NAN
    } else {
        sxy / sxx
    }
}

/// Semitones of `hz` above `reference`
pub fn hz_to_semitones(hz: f64, reference: f64) -> f64 {
    12.0 * (hz / reference).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0, 9.0]), Some(5.0));
    }

    #[test]
    fn test_sample_std_dev() {
        assert_eq!(sample_std_dev(&[5.0]), 0.0);
        // var = ((2-5)^2 + (4-5)^2 + (9-5)^2) / 2 = 13
        assert!((sample_std_dev(&[2.0, 4.0, 9.0]) - 13f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [100.0, 110.0, 120.0, 130.0, 140.0];
        assert!((percentile(&values, 5.0).unwrap() - 102.0).abs() < 1e-9);
        assert!((percentile(&values, 95.0).unwrap() - 138.0).abs() < 1e-9);
        assert_eq!(percentile(&values, 0.0), Some(100.0));
        assert_eq!(percentile(&values, 100.0), Some(140.0));
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_ols_slope() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        assert!((ols_slope(&x, &y) - 2.0).abs() < 1e-12);
        assert!(ols_slope(&[1.0, 1.0], &[2.0, 3.0]).is_nan());
        assert!(ols_slope(&[1.0], &[2.0]).is_nan());
    }

    #[test]
    fn test_semitones() {
        assert!((hz_to_semitones(110.0, 55.0) - 12.0).abs() < 1e-12);
        assert!(hz_to_semitones(55.0, 55.0).abs() < 1e-12);
    }
}
