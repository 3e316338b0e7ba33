use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{DailyCapacity, DailyVolume, DutyRecord, LeakRecord};

/// Total wet weight per calendar day, ascending by date.
pub fn daily_volume(records: &[LeakRecord]) -> Vec<DailyVolume> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for record in records {
        *by_date.entry(record.date).or_insert(0.0) += record.wet_weight;
    }

    by_date
        .into_iter()
        .map(|(date, total_wet_weight)| DailyVolume {
            date,
            total_wet_weight,
            rolling_average: None,
        })
        .collect()
}

/// Longest dry interval per calendar day. Intervals are separate attempts, so
/// the day keeps its best one rather than a sum.
pub fn daily_capacity(records: &[DutyRecord]) -> Vec<DailyCapacity> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for record in records {
        let entry = by_date.entry(record.date).or_insert(record.dry_duration);
        if record.dry_duration > *entry {
            *entry = record.dry_duration;
        }
    }

    by_date
        .into_iter()
        .map(|(date, max_dry_duration)| DailyCapacity {
            date,
            max_dry_duration,
        })
        .collect()
}
