use crate::models::{FailureTally, LeakRecord};

/// Sums trigger counts over raw rows. Runs before any date bucketing, so two
/// events logged on one day both count.
pub fn tally_failures(records: &[LeakRecord]) -> FailureTally {
    records
        .iter()
        .fold(FailureTally::default(), |mut tally, record| {
            tally.pressure = tally.pressure.saturating_add(record.pressure_failure);
            tally.volume = tally.volume.saturating_add(record.volume_failure);
            tally.fatigue = tally.fatigue.saturating_add(record.fatigue_failure);
            tally
        })
}
