//! Ensemble forecasting (spec §4.6), ported from
//! `forecaster_enhanced.py`'s `EnhancedForecaster`: four base models
//! (linear regression, simple exponential smoothing, Holt's linear trend,
//! a recency-weighted moving average) combined by inverse-MSE weights
//! from a 70/30 walk-forward backtest. `scipy.optimize.minimize` has no
//! counterpart in the teacher's/pack's dependency stack, so the SES and
//! Holt smoothing parameters are tuned by coordinate descent over a
//! fixed grid rather than a general-purpose optimizer — close enough for
//! a parameter that only needs to land near its MSE-minimizing value.

use newsroom_common::{ForecastMethod, ForecastPoint};

use crate::regression::{linear_regression, residuals, std_dev};

fn clip(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

fn forecast_linear(y: &[f64], days_ahead: u32) -> Vec<ForecastPoint> {
    let fit = linear_regression(y);
    let std_resid = std_dev(&residuals(y, &fit));
    let n = y.len() as f64;

    (1..=days_ahead)
        .map(|i| {
            let future_x = n + i as f64 - 1.0;
            let value = fit.slope * future_x + fit.intercept;
            let interval_width = std_resid * 2.0 * (1.0 + 0.1 * i as f64);
            let confidence = (1.0 - 0.08 * i as f64).max(0.3);
            ForecastPoint {
                days_ahead: i,
                forecast_value: clip(value),
                lower_bound: clip(value - interval_width),
                upper_bound: clip(value + interval_width),
                confidence,
                method: ForecastMethod::Linear,
            }
        })
        .collect()
}

fn ses_smoothed(y: &[f64], alpha: f64) -> Vec<f64> {
    let mut smoothed = vec![0.0; y.len()];
    smoothed[0] = y[0];
    for t in 1..y.len() {
        smoothed[t] = alpha * y[t] + (1.0 - alpha) * smoothed[t - 1];
    }
    smoothed
}

fn ses_mse(y: &[f64], alpha: f64) -> f64 {
    let smoothed = ses_smoothed(y, alpha);
    let n = y.len() as f64;
    y.iter().zip(smoothed.iter()).map(|(actual, fitted)| (actual - fitted).powi(2)).sum::<f64>() / n
}

/// Coordinate-descent grid search over `[0.01, 0.99]`, standing in for
/// the original's `scipy.optimize.minimize(..., method='L-BFGS-B')`.
fn optimize_ses_alpha(y: &[f64]) -> f64 {
    let mut best_alpha = 0.3;
    let mut best_mse = f64::INFINITY;
    let candidates: Vec<f64> = (1..99).map(|i| i as f64 / 100.0).collect();
    for alpha in candidates {
        let mse = ses_mse(y, alpha);
        if mse < best_mse {
            best_mse = mse;
            best_alpha = alpha;
        }
    }
    best_alpha
}

fn forecast_exponential_smoothing(y: &[f64], days_ahead: u32) -> Vec<ForecastPoint> {
    let alpha = optimize_ses_alpha(y);
    let smoothed = ses_smoothed(y, alpha);
    let forecast_value = *smoothed.last().unwrap();
    let resid: Vec<f64> = y.iter().zip(smoothed.iter()).map(|(a, s)| a - s).collect();
    let std_resid = std_dev(&resid);

    (1..=days_ahead)
        .map(|i| {
            let interval_width = std_resid * 2.0 * (i as f64).sqrt();
            let confidence = (1.0 - 0.08 * i as f64).max(0.3);
            ForecastPoint {
                days_ahead: i,
                forecast_value: clip(forecast_value),
                lower_bound: clip(forecast_value - interval_width),
                upper_bound: clip(forecast_value + interval_width),
                confidence,
                method: ForecastMethod::ExponentialSmoothing,
            }
        })
        .collect()
}

fn holt_fit(y: &[f64], alpha: f64, beta: f64) -> (Vec<f64>, Vec<f64>) {
    let n = y.len();
    let mut level = vec![0.0; n];
    let mut trend = vec![0.0; n];
    level[0] = y[0];
    trend[0] = if n > 1 { y[1] - y[0] } else { 0.0 };
    for t in 1..n {
        level[t] = alpha * y[t] + (1.0 - alpha) * (level[t - 1] + trend[t - 1]);
        trend[t] = beta * (level[t] - level[t - 1]) + (1.0 - beta) * trend[t - 1];
    }
    (level, trend)
}

fn holt_mse(y: &[f64], alpha: f64, beta: f64) -> f64 {
    let (level, trend) = holt_fit(y, alpha, beta);
    let n = y.len();
    if n < 2 {
        return f64::INFINITY;
    }
    let mut sse = 0.0;
    for t in 0..n - 1 {
        let fitted = level[t] + trend[t];
        sse += (y[t + 1] - fitted).powi(2);
    }
    sse / (n - 1) as f64
}

/// Grid search over a coarse `(alpha, beta)` lattice, same rationale as
/// [`optimize_ses_alpha`].
fn optimize_holt_params(y: &[f64]) -> (f64, f64) {
    let mut best = (0.3, 0.1);
    let mut best_mse = f64::INFINITY;
    let grid: Vec<f64> = (1..10).map(|i| i as f64 / 10.0).collect();
    for &alpha in &grid {
        for &beta in &grid {
            let mse = holt_mse(y, alpha, beta);
            if mse < best_mse {
                best_mse = mse;
                best = (alpha, beta);
            }
        }
    }
    best
}

fn forecast_holt_linear(y: &[f64], days_ahead: u32) -> Vec<ForecastPoint> {
    let (alpha, beta) = optimize_holt_params(y);
    let (level, trend) = holt_fit(y, alpha, beta);
    let n = y.len();

    let std_resid = if n > 1 {
        let resid: Vec<f64> = (0..n - 1).map(|t| y[t + 1] - (level[t] + trend[t])).collect();
        std_dev(&resid)
    } else {
        0.0
    };

    let last_level = *level.last().unwrap();
    let last_trend = *trend.last().unwrap();

    (1..=days_ahead)
        .map(|i| {
            let value = last_level + i as f64 * last_trend;
            let interval_width = std_resid * 2.0 * (i as f64).sqrt();
            let confidence = (1.0 - 0.08 * i as f64).max(0.3);
            ForecastPoint {
                days_ahead: i,
                forecast_value: clip(value),
                lower_bound: clip(value - interval_width),
                upper_bound: clip(value + interval_width),
                confidence,
                method: ForecastMethod::HoltLinear,
            }
        })
        .collect()
}

fn forecast_weighted_average(y: &[f64], days_ahead: u32) -> Vec<ForecastPoint> {
    let window = y.len().min(14);
    let recent = &y[y.len() - window..];

    let raw_weights: Vec<f64> = (0..window)
        .map(|i| {
            let t = if window > 1 { -1.0 + 1.0 * i as f64 / (window - 1) as f64 } else { 0.0 };
            t.exp()
        })
        .collect();
    let weight_sum: f64 = raw_weights.iter().sum();
    let weighted_avg: f64 =
        recent.iter().zip(raw_weights.iter()).map(|(v, w)| v * w / weight_sum).sum();

    let recent_trend = if y.len() >= 7 { (y[y.len() - 1] - y[y.len() - 7]) / 7.0 } else { 0.0 };

    let diff_source = if y.len() >= 14 { &y[y.len() - 14..] } else { y };
    let diffs: Vec<f64> = diff_source.windows(2).map(|w| w[1] - w[0]).collect();
    let std_resid = std_dev(&diffs);

    (1..=days_ahead)
        .map(|i| {
            let value = weighted_avg + i as f64 * recent_trend * 0.5;
            let interval_width = std_resid * 2.0 * (i as f64).sqrt();
            let confidence = (1.0 - 0.08 * i as f64).max(0.3);
            ForecastPoint {
                days_ahead: i,
                forecast_value: clip(value),
                lower_bound: clip(value - interval_width),
                upper_bound: clip(value + interval_width),
                confidence,
                method: ForecastMethod::WeightedAverage,
            }
        })
        .collect()
}

/// MSE of each base method's forecast over the trailing 30% of `y`,
/// fit on the leading 70%, converted to inverse-MSE ensemble weights.
/// Falls back to equal weighting with under 20 points or if every method
/// degenerates to an infinite MSE.
fn ensemble_weights(y: &[f64]) -> [f64; 4] {
    if y.len() < 20 {
        return [0.25, 0.25, 0.25, 0.25];
    }

    let split = (y.len() as f64 * 0.7) as usize;
    let (train, test) = y.split_at(split);
    if test.is_empty() {
        return [0.25, 0.25, 0.25, 0.25];
    }

    let methods: [fn(&[f64], u32) -> Vec<ForecastPoint>; 4] =
        [forecast_linear, forecast_exponential_smoothing, forecast_holt_linear, forecast_weighted_average];

    let mut mses = [f64::INFINITY; 4];
    for (idx, method) in methods.iter().enumerate() {
        let forecasts = method(train, test.len() as u32);
        let predictions: Vec<f64> = forecasts.iter().map(|f| f.forecast_value).collect();
        if predictions.len() < test.len() {
            continue;
        }
        let mse = test.iter().zip(predictions.iter()).map(|(a, p)| (a - p).powi(2)).sum::<f64>() / test.len() as f64;
        mses[idx] = if mse.is_nan() { f64::INFINITY } else { mse };
    }

    if mses.iter().all(|m| m.is_infinite()) {
        return [0.25, 0.25, 0.25, 0.25];
    }

    let finite_max = mses.iter().copied().filter(|m| m.is_finite()).fold(0.0_f64, f64::max);
    let sanitized: Vec<f64> = mses.iter().map(|&m| if m.is_infinite() { finite_max * 10.0 } else { m }).collect();
    let inverse: Vec<f64> = sanitized.iter().map(|m| 1.0 / (m + 1e-10)).collect();
    let inverse_sum: f64 = inverse.iter().sum();
    [inverse[0] / inverse_sum, inverse[1] / inverse_sum, inverse[2] / inverse_sum, inverse[3] / inverse_sum]
}

fn forecast_ensemble(y: &[f64], days_ahead: u32) -> Vec<ForecastPoint> {
    let linear = forecast_linear(y, days_ahead);
    let ses = forecast_exponential_smoothing(y, days_ahead);
    let holt = forecast_holt_linear(y, days_ahead);
    let weighted = forecast_weighted_average(y, days_ahead);
    let weights = ensemble_weights(y);

    (0..days_ahead as usize)
        .map(|i| {
            let values = [linear[i].forecast_value, ses[i].forecast_value, holt[i].forecast_value, weighted[i].forecast_value];
            let lowers = [linear[i].lower_bound, ses[i].lower_bound, holt[i].lower_bound, weighted[i].lower_bound];
            let uppers = [linear[i].upper_bound, ses[i].upper_bound, holt[i].upper_bound, weighted[i].upper_bound];

            let weighted_mean = |xs: &[f64; 4]| -> f64 { xs.iter().zip(weights.iter()).map(|(x, w)| x * w).sum() };
            let ensemble_value = weighted_mean(&values);
            let ensemble_lower = weighted_mean(&lowers);
            let ensemble_upper = weighted_mean(&uppers);

            // Each member's confidence already decays at the uniform
            // per-day-ahead rate; the ensemble combines them by the same
            // inverse-MSE weights rather than decaying a second time.
            let member_confidences =
                [linear[i].confidence, ses[i].confidence, holt[i].confidence, weighted[i].confidence];
            let weighted_confidence = weighted_mean(&member_confidences);

            let mean_val = values.iter().sum::<f64>() / 4.0;
            let disagreement = std_dev(&values);
            let agreement_factor = 1.0 - (disagreement / (mean_val + 1.0)).min(0.5);
            let confidence = (weighted_confidence * agreement_factor).clamp(0.4, 0.95);

            ForecastPoint {
                days_ahead: i as u32 + 1,
                forecast_value: clip(ensemble_value),
                lower_bound: clip(ensemble_lower),
                upper_bound: clip(ensemble_upper),
                confidence,
                method: ForecastMethod::Ensemble,
            }
        })
        .collect()
}

/// Forecast `days_ahead` points by `method`, given the indicator's
/// historical values (chronological order, no gaps).
pub fn forecast(y: &[f64], days_ahead: u32, method: ForecastMethod) -> Vec<ForecastPoint> {
    if y.is_empty() || days_ahead == 0 {
        return Vec::new();
    }
    match method {
        ForecastMethod::Linear => forecast_linear(y, days_ahead),
        ForecastMethod::ExponentialSmoothing => forecast_exponential_smoothing(y, days_ahead),
        ForecastMethod::HoltLinear => forecast_holt_linear(y, days_ahead),
        ForecastMethod::WeightedAverage => forecast_weighted_average(y, days_ahead),
        ForecastMethod::Ensemble => forecast_ensemble(y, days_ahead),
    }
}
