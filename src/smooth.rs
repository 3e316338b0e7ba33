use crate::models::{DailyVolume, WindowPolicy};

/// Trailing moving average over an aggregated, date-sorted series.
///
/// The window counts entries rather than calendar days. Each average only
/// uses entries at or before its own position, computed in one forward pass.
/// Every window is summed afresh so a large value leaves no residue once it
/// drops out.
pub fn smooth(series: &[DailyVolume], window: usize, policy: WindowPolicy) -> Vec<DailyVolume> {
    let window = window.max(1);
    let mut smoothed = Vec::with_capacity(series.len());

    for (index, day) in series.iter().enumerate() {
        let start = (index + 1).saturating_sub(window);
        let count = index + 1 - start;
        let rolling_average = match policy {
            WindowPolicy::Full if count < window => None,
            _ => {
                let total: f64 = series[start..=index]
                    .iter()
                    .map(|d| d.total_wet_weight)
                    .sum();
                Some(total / count as f64)
            }
        };

        smoothed.push(DailyVolume {
            rolling_average,
            ..day.clone()
        });
    }

    smoothed
}
