//! Trend detection per indicator over a window (default 30 days, spec
//! §4.6), ported from `trend_detector_enhanced.py`'s
//! `EnhancedTrendDetector.detect_trend` / `_classify_trend_direction`.
//!
//! `trend_detector_enhanced.py`'s `TrendDirection` has an eighth `UNKNOWN`
//! variant for windows too short or too flat to classify;
//! `newsroom_common::TrendDirection` has no such variant. Resolved here by
//! folding the insufficient-data case into `Stable` with `is_significant:
//! false` — a stable direction with "don't trust this" signaled through
//! the significance flag rather than a distinct enum state.

use chrono::{DateTime, Utc};
use newsroom_common::{IndicatorId, TrendDirection, TrendResult};

use crate::error::IndicatorError;
use crate::regression::{change_points, has_seasonality, linear_regression, residuals, rsi_momentum, std_dev};

const SEASONALITY_LAG_DAYS: usize = 7;
const CHANGE_POINT_THRESHOLD: f64 = 2.0;
const MOMENTUM_PERIOD: usize = 14;

/// `p > 0.05` or `r² < 0.1` ⇒ not a reliable enough fit to call a
/// direction; everything else is slope-sign plus `r²`/momentum strength.
fn classify_direction(slope: f64, r_squared: f64, p_value: f64, momentum: f64) -> (TrendDirection, bool) {
    if p_value > 0.05 || r_squared < 0.1 {
        return (TrendDirection::Stable, false);
    }

    let strong = r_squared >= 0.5 && momentum.abs() >= 50.0;
    let moderate = r_squared >= 0.25 || momentum.abs() >= 25.0;

    let direction = if slope > 0.0 {
        if strong {
            TrendDirection::StrongRising
        } else if moderate {
            TrendDirection::Rising
        } else {
            TrendDirection::WeakRising
        }
    } else if slope < 0.0 {
        if strong {
            TrendDirection::StrongFalling
        } else if moderate {
            TrendDirection::Falling
        } else {
            TrendDirection::WeakFalling
        }
    } else {
        TrendDirection::Stable
    };

    (direction, true)
}

/// `timestamps` and `values` must be the same length and chronologically
/// ordered; `window_days` records the span they were drawn over (the
/// caller is responsible for slicing to the configured window).
pub fn detect_trend(
    indicator_id: &IndicatorId,
    window_days: u32,
    timestamps: &[DateTime<Utc>],
    values: &[f64],
) -> Result<TrendResult, IndicatorError> {
    if values.is_empty() {
        return Err(IndicatorError::NoHistory(indicator_id.clone()));
    }

    let fit = linear_regression(values);
    let resid = residuals(values, &fit);
    let volatility = std_dev(&resid);
    let momentum = rsi_momentum(values, MOMENTUM_PERIOD);

    let (direction, is_significant) = classify_direction(fit.slope, fit.r_squared, fit.p_value, momentum);

    let seasonality_detected = has_seasonality(values, SEASONALITY_LAG_DAYS);

    let change_point_timestamps: Vec<DateTime<Utc>> = change_points(values, CHANGE_POINT_THRESHOLD)
        .into_iter()
        .filter_map(|i| timestamps.get(i).copied())
        .collect();

    Ok(TrendResult {
        indicator_id: indicator_id.clone(),
        window_days,
        direction,
        slope: fit.slope,
        r_squared: fit.r_squared,
        p_value: fit.p_value,
        volatility,
        momentum,
        is_significant,
        seasonality_detected,
        change_points: change_point_timestamps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn timestamps(n: usize) -> Vec<DateTime<Utc>> {
        let base = Utc::now();
        (0..n).map(|i| base + Duration::days(i as i64)).collect()
    }

    #[test]
    fn strong_rising_trend_is_significant() {
        let values: Vec<f64> = (0..30).map(|i| 20.0 + i as f64 * 2.0).collect();
        let ts = timestamps(values.len());
        let result = detect_trend(&"eco_inflation".to_string(), 30, &ts, &values).unwrap();
        assert_eq!(result.direction, TrendDirection::StrongRising);
        assert!(result.is_significant);
        assert!(result.slope > 0.0);
    }

    #[test]
    fn strong_falling_trend_is_significant() {
        let values: Vec<f64> = (0..30).map(|i| 80.0 - i as f64 * 2.0).collect();
        let ts = timestamps(values.len());
        let result = detect_trend(&"eco_inflation".to_string(), 30, &ts, &values).unwrap();
        assert_eq!(result.direction, TrendDirection::StrongFalling);
        assert!(result.is_significant);
    }

    #[test]
    fn flat_noisy_series_is_stable_and_insignificant() {
        let values: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 50.0 } else { 50.2 }).collect();
        let ts = timestamps(values.len());
        let result = detect_trend(&"eco_inflation".to_string(), 30, &ts, &values).unwrap();
        assert_eq!(result.direction, TrendDirection::Stable);
        assert!(!result.is_significant);
    }

    #[test]
    fn empty_history_is_an_error() {
        let result = detect_trend(&"eco_inflation".to_string(), 30, &[], &[]);
        assert!(result.is_err());
    }

    #[test]
    fn change_points_map_back_to_timestamps() {
        let mut values = vec![10.0; 15];
        values.extend(vec![90.0; 15]);
        let ts = timestamps(values.len());
        let result = detect_trend(&"eco_inflation".to_string(), 30, &ts, &values).unwrap();
        assert!(result.change_points.iter().all(|cp| ts.contains(cp)));
    }
}
