use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod aggregate;
mod config;
mod error;
mod forecast;
mod link;
mod models;
mod pipeline;
mod report;
mod smooth;
mod source;
mod tally;

use config::AnalysisConfig;
use models::WindowPolicy;
use pipeline::Snapshot;

#[derive(Parser)]
#[command(name = "calibration-log")]
#[command(about = "Trend and failure analysis for a continence calibration log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate, smooth and forecast exported log tabs
    #[command(group(
        ArgGroup::new("input")
            .args(["leaks", "duty"])
            .multiple(true)
            .required(true)
    ))]
    Analyze {
        /// CSV export of the Calibration Log tab
        #[arg(long)]
        leaks: Option<PathBuf>,
        /// CSV export of the Duty Cycle tab
        #[arg(long)]
        duty: Option<PathBuf>,
        #[arg(long, default_value_t = config::DEFAULT_WINDOW)]
        window: usize,
        #[arg(long, value_enum, default_value_t = WindowPolicy::Partial)]
        policy: WindowPolicy,
        #[arg(long, default_value_t = config::DEFAULT_LOOKBACK)]
        lookback: usize,
        #[arg(long, default_value_t = config::DEFAULT_MIN_POINTS)]
        min_points: usize,
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print CSV export links for a shared Google Sheet
    Link {
        #[arg(long)]
        url: String,
    },
    /// Write sample log exports to a directory
    Seed {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            leaks,
            duty,
            window,
            policy,
            lookback,
            min_points,
            format,
            out,
        } => {
            let config = AnalysisConfig {
                window,
                policy,
                lookback,
                min_points,
            };

            let mut snapshot = Snapshot::default();
            let mut issues = Vec::new();
            if let Some(path) = leaks {
                let ingested = source::load_leak_log(&path)?;
                snapshot.leaks = ingested.rows;
                issues.extend(ingested.issues);
            }
            if let Some(path) = duty {
                let ingested = source::load_duty_log(&path)?;
                snapshot.duties = ingested.rows;
                issues.extend(ingested.issues);
            }

            let dashboard =
                pipeline::analyze(&snapshot, &config).context("invalid analysis settings")?;
            let rendered = match format {
                Format::Markdown => report::build_report(&dashboard, &issues),
                Format::Json => {
                    let skipped: Vec<String> = issues.iter().map(ToString::to_string).collect();
                    serde_json::to_string_pretty(&serde_json::json!({
                        "dashboard": dashboard,
                        "skipped": skipped,
                    }))?
                }
            };

            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Report written to {}.", path.display());
                }
                None => print!("{rendered}"),
            }
        }
        Commands::Link { url } => {
            let links = link::sheet_links(&url)?;
            println!("Sheet {}", links.sheet_id);
            println!("{}: {}", source::LEAK_TABLE, links.leak_log);
            println!("{}: {}", source::DUTY_TABLE, links.duty_log);
        }
        Commands::Seed { dir } => {
            let (leaks, duty) = seed(&dir)?;
            println!(
                "Sample logs written to {} and {}.",
                leaks.display(),
                duty.display()
            );
        }
    }

    Ok(())
}

/// Three weeks of a slowly improving log, a few intervals a day.
fn seed(dir: &Path) -> anyhow::Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let start = NaiveDate::from_ymd_opt(2026, 1, 5).context("invalid date")?;

    let leak_path = dir.join("calibration_log.csv");
    let mut leaks = csv::Writer::from_path(&leak_path)?;
    leaks.write_record([
        "Date",
        "Wet Weight (g)",
        "Pressure Failure (P)",
        "Vol. Failure (V)",
        "Fatigue Failure (F)",
    ])?;

    let duty_path = dir.join("duty_cycle.csv");
    let mut duty = csv::Writer::from_path(&duty_path)?;
    duty.write_record(["Date", "Dry Duration (min)"])?;

    for day in 0..21i64 {
        let date = start + Duration::days(day);
        // Skip the odd day so the log has gaps like a real one.
        if day % 6 == 5 {
            continue;
        }

        let events = [
            ("07:40", 38.0 - 1.2 * day as f64, "1", "", ""),
            ("13:15", 22.0 - 0.6 * day as f64 + (day % 3) as f64 * 4.0, "", "1", ""),
            ("21:50", 30.0 - 0.9 * day as f64, "", "", if day % 4 == 0 { "1" } else { "" }),
        ];
        for (time, weight, pressure, volume, fatigue) in events {
            let weight = format!("{:.1}", weight.max(0.0));
            leaks.write_record([
                format!("{date} {time}:00").as_str(),
                weight.as_str(),
                pressure,
                volume,
                fatigue,
            ])?;
        }

        for interval in 0..3i64 {
            let minutes = 45 + day * 4 + interval * 15 - (day % 2) * 10;
            duty.write_record([date.to_string(), minutes.to_string()])?;
        }
    }

    leaks.flush()?;
    duty.flush()?;
    Ok((leak_path, duty_path))
}
