use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeakRecord {
    pub date: NaiveDate,
    pub wet_weight: f64,
    pub pressure_failure: u64,
    pub volume_failure: u64,
    pub fatigue_failure: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DutyRecord {
    pub date: NaiveDate,
    pub dry_duration: f64,
}

/// One calendar day of leak volume. `rolling_average` stays `None` until the
/// smoother fills it, and under [`WindowPolicy::Full`] before a full window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyVolume {
    pub date: NaiveDate,
    pub total_wet_weight: f64,
    pub rolling_average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCapacity {
    pub date: NaiveDate,
    pub max_dry_duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WindowPolicy {
    /// Average whatever points exist, up to the window size.
    #[default]
    Partial,
    /// Leave the average unset until a full window has accumulated.
    Full,
}

impl WindowPolicy {
    pub fn label(self) -> &'static str {
        match self {
            WindowPolicy::Partial => "partial (warm start)",
            WindowPolicy::Full => "full window only",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ForecastStatus {
    Projected,
    Stable,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub status: ForecastStatus,
    /// Grams per day.
    pub slope: Option<f64>,
    /// Fitted average at `window_start`.
    pub intercept: Option<f64>,
    pub projected_date: Option<NaiveDate>,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub points: usize,
}

impl ForecastResult {
    pub fn insufficient(points: usize) -> Self {
        Self {
            status: ForecastStatus::InsufficientData,
            slope: None,
            intercept: None,
            projected_date: None,
            window_start: None,
            window_end: None,
            points,
        }
    }

    /// True when the zero crossing falls before the last observed day.
    pub fn is_past_due(&self) -> bool {
        match (self.projected_date, self.window_end) {
            (Some(projected), Some(last)) => projected < last,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FailureCategory {
    Pressure,
    Volume,
    Fatigue,
}

impl FailureCategory {
    pub const ALL: [FailureCategory; 3] = [
        FailureCategory::Pressure,
        FailureCategory::Volume,
        FailureCategory::Fatigue,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            FailureCategory::Pressure => "P",
            FailureCategory::Volume => "V",
            FailureCategory::Fatigue => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FailureTally {
    #[serde(rename = "Pressure")]
    pub pressure: u64,
    #[serde(rename = "Volume")]
    pub volume: u64,
    #[serde(rename = "Fatigue")]
    pub fatigue: u64,
}

impl FailureTally {
    pub fn get(&self, category: FailureCategory) -> u64 {
        match category {
            FailureCategory::Pressure => self.pressure,
            FailureCategory::Volume => self.volume,
            FailureCategory::Fatigue => self.fatigue,
        }
    }

    pub fn total(&self) -> u64 {
        self.pressure
            .saturating_add(self.volume)
            .saturating_add(self.fatigue)
    }

    pub fn share(&self, category: FailureCategory) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            None
        } else {
            Some(self.get(category) as f64 / total as f64)
        }
    }

    /// Most frequent trigger. Ties go to the earlier category in
    /// [`FailureCategory::ALL`].
    pub fn dominant(&self) -> Option<FailureCategory> {
        let mut best: Option<FailureCategory> = None;
        for category in FailureCategory::ALL {
            let count = self.get(category);
            if count == 0 {
                continue;
            }
            match best {
                Some(current) if self.get(current) >= count => {}
                _ => best = Some(category),
            }
        }
        best
    }
}
