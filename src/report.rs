use std::fmt::Write;

use crate::error::IngestError;
use crate::models::{FailureCategory, ForecastStatus};
use crate::pipeline::Dashboard;

pub fn build_report(dashboard: &Dashboard, issues: &[IngestError]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# System Calibration Report");
    match (dashboard.volume.first(), dashboard.volume.last()) {
        (Some(first), Some(last)) => {
            let _ = writeln!(output, "Covering {} to {}", first.date, last.date);
        }
        _ => {
            let _ = writeln!(output, "No leak records loaded.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Daily Volume Trend");
    let _ = writeln!(
        output,
        "{}-day rolling average, {} policy",
        dashboard.window,
        dashboard.window_policy.label()
    );
    let _ = writeln!(output);

    if dashboard.volume.is_empty() {
        let _ = writeln!(output, "No leak volume recorded.");
    } else {
        let _ = writeln!(output, "| Date | Wet Weight (g) | Rolling Avg (g) |");
        let _ = writeln!(output, "| --- | ---: | ---: |");
        for day in dashboard.volume.iter() {
            let average = day
                .rolling_average
                .map(|avg| format!("{avg:.1}"))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                output,
                "| {} | {:.1} | {} |",
                day.date, day.total_wet_weight, average
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Trend Forecast");
    let forecast = &dashboard.forecast;
    match forecast.status {
        ForecastStatus::InsufficientData => {
            let _ = writeln!(
                output,
                "Not enough smoothed history yet ({} points).",
                forecast.points
            );
        }
        ForecastStatus::Stable => {
            let _ = writeln!(
                output,
                "Trend is flat or rising ({:+.2} g/day over {} points); no zero crossing projected.",
                forecast.slope.unwrap_or_default(),
                forecast.points
            );
        }
        ForecastStatus::Projected => {
            let projected = forecast
                .projected_date
                .map(|date| date.to_string())
                .unwrap_or_default();
            let _ = writeln!(
                output,
                "Trend falling {:.2} g/day over {} points; projected to reach zero on {}.",
                forecast.slope.unwrap_or_default(),
                forecast.points,
                projected
            );
            if forecast.is_past_due() {
                let _ = writeln!(
                    output,
                    "The projected date is already behind the last logged day."
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Operational Capacity");

    if dashboard.capacity.is_empty() {
        let _ = writeln!(output, "No duty-cycle intervals recorded.");
    } else {
        for day in dashboard.capacity.iter() {
            let _ = writeln!(
                output,
                "- {}: longest dry interval {:.0} min",
                day.date, day.max_dry_duration
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Failure Modes");
    let failures = &dashboard.failures;

    for category in FailureCategory::ALL {
        let share = failures
            .share(category)
            .map(|share| format!(" ({:.0}%)", share * 100.0))
            .unwrap_or_default();
        let _ = writeln!(
            output,
            "- {:?} [{}]: {}{}",
            category,
            category.tag(),
            failures.get(category),
            share
        );
    }
    if let Some(dominant) = failures.dominant() {
        let _ = writeln!(output, "Most frequent trigger: {:?}.", dominant);
    }

    if !issues.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Skipped Rows");
        for issue in issues.iter() {
            let _ = writeln!(output, "- {}", issue);
        }
    }

    output
}
