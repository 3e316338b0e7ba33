use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::models::{DailyVolume, ForecastResult, ForecastStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastConfig {
    /// Trailing defined points to fit.
    pub lookback: usize,
    /// Below this many points the forecast reports insufficient data.
    pub min_points: usize,
}

impl From<&AnalysisConfig> for ForecastConfig {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            lookback: config.lookback,
            min_points: config.min_points,
        }
    }
}

/// Fits a least-squares line to the recent rolling averages and projects the
/// day the trend reaches zero.
///
/// Days without an average are dropped first. The x axis is elapsed calendar
/// days since the first fitted point, so gaps in the log keep their true width.
pub fn forecast(series: &[DailyVolume], config: &ForecastConfig) -> ForecastResult {
    let defined: Vec<(NaiveDate, f64)> = series
        .iter()
        .filter_map(|day| day.rolling_average.map(|avg| (day.date, avg)))
        .collect();

    let start = defined.len().saturating_sub(config.lookback);
    let window = &defined[start..];

    if window.len() < config.min_points.max(2) {
        debug!(points = window.len(), min_points = config.min_points, "not enough history to forecast");
        return ForecastResult::insufficient(window.len());
    }

    let first = window[0].0;
    let last = window[window.len() - 1].0;
    let points: Vec<(f64, f64)> = window
        .iter()
        .map(|(date, avg)| ((*date - first).num_days() as f64, *avg))
        .collect();

    let Some((slope, intercept)) = least_squares(&points) else {
        debug!(points = points.len(), "regression is degenerate");
        return ForecastResult::insufficient(points.len());
    };

    let projected_date = if slope < 0.0 {
        let crossing = -intercept / slope;
        Duration::try_days(crossing.floor() as i64)
            .and_then(|offset| first.checked_add_signed(offset))
    } else {
        None
    };

    // A crossing too far out to be a calendar date reads as flat.
    let status = if projected_date.is_some() {
        ForecastStatus::Projected
    } else {
        ForecastStatus::Stable
    };

    ForecastResult {
        status,
        slope: Some(slope),
        intercept: Some(intercept),
        projected_date,
        window_start: Some(first),
        window_end: Some(last),
        points: points.len(),
    }
}

/// Ordinary least squares over `(x, y)` pairs, returning `(slope, intercept)`.
/// `None` when x has no spread or the fit is not finite.
fn least_squares(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in points {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }

    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    (slope.is_finite() && intercept.is_finite()).then_some((slope, intercept))
}
