//! Statistical primitives for trend detection (spec §4.6), ported from
//! `trend_detector_enhanced.py`'s use of `scipy.stats.linregress` and
//! `numpy`. No statistics crate is in the teacher's (or the pack's)
//! dependency stack, so the regression and its significance test are
//! hand-rolled: slope/intercept/r² via ordinary least squares, and the
//! p-value via a normal approximation to the t-distribution (exact for
//! large `n`, slightly conservative for the small windows this runs
//! over) rather than pulling in a new external crate for one inverse
//! incomplete-beta call.

#[derive(Debug, Clone, Copy)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub p_value: f64,
}

pub fn linear_regression(y: &[f64]) -> LinearFit {
    let n = y.len();
    if n < 2 {
        return LinearFit { slope: 0.0, intercept: y.first().copied().unwrap_or(0.0), r_squared: 0.0, p_value: 1.0 };
    }

    let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let x_mean = x.iter().sum::<f64>() / n as f64;
    let y_mean = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = x[i] - x_mean;
        let dy = y[i] - y_mean;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x.abs() < f64::EPSILON {
        return LinearFit { slope: 0.0, intercept: y_mean, r_squared: 0.0, p_value: 1.0 };
    }

    let slope = cov / var_x;
    let intercept = y_mean - slope * x_mean;
    let r = if var_y.abs() < f64::EPSILON { 0.0 } else { cov / (var_x.sqrt() * var_y.sqrt()) };
    let r_squared = r * r;

    let df = (n - 2) as f64;
    let p_value = if df < 1.0 || (1.0 - r_squared).abs() < f64::EPSILON {
        if r_squared > 0.999 {
            0.0
        } else {
            1.0
        }
    } else {
        let t_stat = r.abs() * (df / (1.0 - r_squared)).sqrt();
        two_tailed_p_value(t_stat)
    };

    LinearFit { slope, intercept, r_squared, p_value }
}

pub fn residuals(y: &[f64], fit: &LinearFit) -> Vec<f64> {
    y.iter().enumerate().map(|(i, v)| v - (fit.slope * i as f64 + fit.intercept)).collect()
}

pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Two-tailed p-value from a t-statistic, approximated via the standard
/// normal distribution (`2 × (1 − Φ(|t|))`).
fn two_tailed_p_value(t_stat: f64) -> f64 {
    (2.0 * (1.0 - standard_normal_cdf(t_stat.abs()))).clamp(0.0, 1.0)
}

fn standard_normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Abramowitz & Stegun 7.1.26 approximation, max error ~1.5e-7.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let t = 1.0 / (1.0 + p * x);
    let poly = ((((a5 * t + a4) * t + a3) * t + a2) * t + a1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// RSI-like momentum over the trailing `period` deltas, mapped from
/// `[0, 100]` to `[-100, 100]` (spec §4.6, `trend_detector_enhanced.py`
/// `_calculate_momentum`).
pub fn rsi_momentum(values: &[f64], period: usize) -> f64 {
    let period = if values.len() < period + 1 { values.len().saturating_sub(1) } else { period };
    if period < 2 {
        return 0.0;
    }

    let window = &values[values.len() - period - 1..];
    let deltas: Vec<f64> = window.windows(2).map(|w| w[1] - w[0]).collect();
    let gains: Vec<f64> = deltas.iter().map(|d| d.max(0.0)).collect();
    let losses: Vec<f64> = deltas.iter().map(|d| (-d).max(0.0)).collect();

    let avg_gain = gains.iter().sum::<f64>() / gains.len() as f64;
    let avg_loss = losses.iter().sum::<f64>() / losses.len() as f64;

    if avg_loss.abs() < f64::EPSILON {
        return if avg_gain > 0.0 { 100.0 } else { 0.0 };
    }

    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - (100.0 / (1.0 + rs));
    (rsi - 50.0) * 2.0
}

/// Autocorrelation at the given lag; `true` when `|autocorr| > 0.3`
/// suggests weekly seasonality (spec §4.6).
pub fn has_seasonality(values: &[f64], lag: usize) -> bool {
    let n = values.len();
    if n < lag * 2 {
        return false;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    if var.abs() < f64::EPSILON {
        return false;
    }
    let autocorr: f64 =
        (0..n - lag).map(|i| (values[i] - mean) * (values[i + lag] - mean)).sum::<f64>() / (n as f64 * var);
    autocorr.abs() > 0.3
}

/// Rolling-window change-point detection via z-score of the mean shift
/// (spec §4.6, threshold 2σ), returning indices into `values`.
pub fn change_points(values: &[f64], threshold: f64) -> Vec<usize> {
    if values.len() < 10 {
        return Vec::new();
    }
    let overall_std = std_dev(values);
    if overall_std.abs() < f64::EPSILON {
        return Vec::new();
    }

    let window = (values.len() / 10).max(3);
    let mut points: Vec<usize> = Vec::new();
    for i in window..values.len() - window {
        let before = &values[i - window..i];
        let after = &values[i..i + window];
        let mean_before = before.iter().sum::<f64>() / before.len() as f64;
        let mean_after = after.iter().sum::<f64>() / after.len() as f64;
        let z = (mean_after - mean_before).abs() / overall_std;
        let far_enough_from_last = match points.last() {
            None => true,
            Some(&last) => i - last > window,
        };
        if z > threshold && far_enough_from_last {
            points.push(i);
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_linear_series_has_r_squared_near_one() {
        let y: Vec<f64> = (0..20).map(|i| i as f64 * 2.0 + 1.0).collect();
        let fit = linear_regression(&y);
        assert!((fit.r_squared - 1.0).abs() < 1e-6);
        assert!((fit.slope - 2.0).abs() < 1e-6);
        assert!(fit.p_value < 0.01);
    }

    #[test]
    fn flat_series_has_zero_slope_and_high_p_value() {
        let y = vec![50.0; 20];
        let fit = linear_regression(&y);
        assert_eq!(fit.slope, 0.0);
        assert!(fit.p_value > 0.05);
    }

    #[test]
    fn rsi_momentum_is_positive_for_rising_series() {
        let y: Vec<f64> = (0..15).map(|i| i as f64).collect();
        let momentum = rsi_momentum(&y, 14);
        assert!(momentum > 50.0);
    }

    #[test]
    fn rsi_momentum_is_negative_for_falling_series() {
        let y: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let momentum = rsi_momentum(&y, 14);
        assert!(momentum < -50.0);
    }

    #[test]
    fn seasonality_detected_for_repeating_weekly_pattern() {
        let pattern = [10.0, 20.0, 15.0, 30.0, 25.0, 18.0, 12.0];
        let values: Vec<f64> = pattern.iter().cycle().take(28).copied().collect();
        assert!(has_seasonality(&values, 7));
    }

    #[test]
    fn no_seasonality_for_constant_series() {
        let values = vec![50.0; 21];
        assert!(!has_seasonality(&values, 7));
    }

    #[test]
    fn change_point_detected_at_step_shift() {
        let mut values = vec![10.0; 15];
        values.extend(vec![90.0; 15]);
        let points = change_points(&values, 1.9);
        assert!(!points.is_empty());
    }
}
