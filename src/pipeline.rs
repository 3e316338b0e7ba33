use serde::Serialize;
use tracing::info;

use crate::aggregate::{daily_capacity, daily_volume};
use crate::config::AnalysisConfig;
use crate::error::ConfigError;
use crate::forecast::{forecast, ForecastConfig};
use crate::models::{
    DailyCapacity, DailyVolume, DutyRecord, FailureTally, ForecastResult, LeakRecord,
    WindowPolicy,
};
use crate::smooth::smooth;
use crate::tally::tally_failures;

/// Rows read once from the data source; every stage of a run sees this copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub leaks: Vec<LeakRecord>,
    pub duties: Vec<DutyRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub window: usize,
    pub window_policy: WindowPolicy,
    pub volume: Vec<DailyVolume>,
    pub capacity: Vec<DailyCapacity>,
    pub forecast: ForecastResult,
    pub failures: FailureTally,
}

pub fn analyze(snapshot: &Snapshot, config: &AnalysisConfig) -> Result<Dashboard, ConfigError> {
    config.validate()?;

    let volume = smooth(&daily_volume(&snapshot.leaks), config.window, config.policy);
    let capacity = daily_capacity(&snapshot.duties);
    let forecast = forecast(&volume, &ForecastConfig::from(config));
    let failures = tally_failures(&snapshot.leaks);

    info!(
        days = volume.len(),
        capacity_days = capacity.len(),
        status = ?forecast.status,
        "analysis complete"
    );

    Ok(Dashboard {
        window: config.window,
        window_policy: config.policy,
        volume,
        capacity,
        forecast,
        failures,
    })
}
