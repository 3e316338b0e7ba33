use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::IngestError;
use crate::models::{DutyRecord, LeakRecord};

pub const LEAK_TABLE: &str = "Calibration Log";
pub const DUTY_TABLE: &str = "Duty Cycle";

const DATE: &str = "Date";
const WET_WEIGHT: &str = "Wet Weight (g)";
const PRESSURE_FAILURE: &str = "Pressure Failure (P)";
const VOLUME_FAILURE: &str = "Vol. Failure (V)";
const FATIGUE_FAILURE: &str = "Fatigue Failure (F)";
const DRY_DURATION: &str = "Dry Duration (min)";

/// Largest integer an f64 holds exactly.
const MAX_EXACT_COUNT: f64 = 9_007_199_254_740_992.0;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y", "%b %d, %Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Rows that parsed, plus one issue per row that did not.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested<T> {
    pub rows: Vec<T>,
    pub issues: Vec<IngestError>,
}

#[derive(Debug, Deserialize)]
struct LeakRow {
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Wet Weight (g)")]
    wet_weight: Option<String>,
    #[serde(rename = "Pressure Failure (P)")]
    pressure_failure: Option<String>,
    #[serde(rename = "Vol. Failure (V)")]
    volume_failure: Option<String>,
    #[serde(rename = "Fatigue Failure (F)")]
    fatigue_failure: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DutyRow {
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Dry Duration (min)")]
    dry_duration: Option<String>,
}

pub fn load_leak_log(path: &Path) -> anyhow::Result<Ingested<LeakRecord>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(read_leak_log(file))
}

pub fn load_duty_log(path: &Path) -> anyhow::Result<Ingested<DutyRecord>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(read_duty_log(file))
}

pub fn read_leak_log<R: Read>(input: R) -> Ingested<LeakRecord> {
    let required = [DATE, WET_WEIGHT, PRESSURE_FAILURE, VOLUME_FAILURE, FATIGUE_FAILURE];
    read_table(input, LEAK_TABLE, &required, |line, row: LeakRow| {
        Ok(LeakRecord {
            date: required_date(line, row.date)?,
            wet_weight: required_amount(line, WET_WEIGHT, row.wet_weight)?,
            pressure_failure: count(line, PRESSURE_FAILURE, row.pressure_failure)?,
            volume_failure: count(line, VOLUME_FAILURE, row.volume_failure)?,
            fatigue_failure: count(line, FATIGUE_FAILURE, row.fatigue_failure)?,
        })
    })
}

pub fn read_duty_log<R: Read>(input: R) -> Ingested<DutyRecord> {
    read_table(input, DUTY_TABLE, &[DATE, DRY_DURATION], |line, row: DutyRow| {
        Ok(DutyRecord {
            date: required_date(line, row.date)?,
            dry_duration: required_amount(line, DRY_DURATION, row.dry_duration)?,
        })
    })
}

fn read_table<R, Row, T, F>(
    input: R,
    table: &'static str,
    required: &[&'static str],
    convert: F,
) -> Ingested<T>
where
    R: Read,
    Row: serde::de::DeserializeOwned,
    F: Fn(u64, Row) -> Result<T, IngestError>,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut ingested = Ingested {
        rows: Vec::new(),
        issues: Vec::new(),
    };

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(err) => {
            ingested.issues.push(IngestError::Malformed {
                line: 1,
                message: err.to_string(),
            });
            return finish(table, ingested);
        }
    };

    if let Some(column) = required
        .iter()
        .copied()
        .find(|column| !headers.iter().any(|header| header == *column))
    {
        ingested
            .issues
            .push(IngestError::MissingColumn { line: 1, column });
        return finish(table, ingested);
    }

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                let line = err.position().map_or(0, |pos| pos.line());
                ingested.issues.push(IngestError::Malformed {
                    line,
                    message: err.to_string(),
                });
                continue;
            }
        };

        let line = record.position().map_or(0, |pos| pos.line());
        if record.iter().all(str::is_empty) {
            debug!(table, line, "skipping blank row");
            continue;
        }

        let parsed = record
            .deserialize::<Row>(Some(&headers))
            .map_err(|err| IngestError::Malformed {
                line,
                message: err.to_string(),
            })
            .and_then(|row| convert(line, row));

        match parsed {
            Ok(row) => ingested.rows.push(row),
            Err(issue) => ingested.issues.push(issue),
        }
    }

    finish(table, ingested)
}

fn finish<T>(table: &'static str, mut ingested: Ingested<T>) -> Ingested<T> {
    for issue in &ingested.issues {
        warn!(table, %issue, "skipped row");
    }
    info!(
        table,
        rows = ingested.rows.len(),
        skipped = ingested.issues.len(),
        "loaded table"
    );
    if ingested.rows.is_empty() {
        warn!(table, "no usable rows");
        ingested.issues.push(IngestError::EmptyInput { table });
    }
    ingested
}

fn required_date(line: u64, raw: Option<String>) -> Result<NaiveDate, IngestError> {
    let raw = raw.ok_or(IngestError::MissingColumn { line, column: DATE })?;
    parse_date(&raw).ok_or(IngestError::UnparsableDate { line, value: raw })
}

fn required_amount(
    line: u64,
    column: &'static str,
    raw: Option<String>,
) -> Result<f64, IngestError> {
    let raw = raw.ok_or(IngestError::MissingColumn { line, column })?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(IngestError::InvalidNumber {
            line,
            column,
            value: raw,
        }),
    }
}

/// Trigger counts. Spreadsheets leave the cell blank when nothing happened.
fn count(line: u64, column: &'static str, raw: Option<String>) -> Result<u64, IngestError> {
    let Some(raw) = raw else {
        return Ok(0);
    };
    if let Ok(value) = raw.parse::<u64>() {
        return Ok(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value >= 0.0 && value.fract() == 0.0 && value <= MAX_EXACT_COUNT => {
            Ok(value as u64)
        }
        _ => Err(IngestError::InvalidNumber {
            line,
            column,
            value: raw,
        }),
    }
}

/// Resolves a spreadsheet date cell to a calendar day, dropping any time of day.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|datetime| datetime.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|datetime| datetime.date_naive())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const LEAK_HEADER: &str =
        "Date,Wet Weight (g),Pressure Failure (P),Vol. Failure (V),Fatigue Failure (F)\n";

    #[test]
    fn parses_common_spreadsheet_dates() {
        assert_eq!(parse_date("2024-01-05"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("1/5/2024"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("2024/01/05"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05 21:45:00"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("1/5/2024 7:30:00"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T08:15"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T23:30:00+02:00"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date(" 2024-01-05 "), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2024-02-30"), None);
    }

    #[test]
    fn reads_leak_rows_and_skips_bad_ones() {
        let csv = format!(
            "{LEAK_HEADER}\
             2024-01-01 08:00:00,50,1,0,0\n\
             not a date,20,0,0,0\n\
             2024-01-02,-3,0,0,0\n\
             2024-01-02,30,,1,\n\
             2024-01-03,abc,0,0,0\n\
             2024-01-03,12.5,0,0,1.0\n"
        );
        let ingested = read_leak_log(csv.as_bytes());

        assert_eq!(
            ingested.rows,
            vec![
                LeakRecord {
                    date: date(2024, 1, 1),
                    wet_weight: 50.0,
                    pressure_failure: 1,
                    volume_failure: 0,
                    fatigue_failure: 0,
                },
                LeakRecord {
                    date: date(2024, 1, 2),
                    wet_weight: 30.0,
                    pressure_failure: 0,
                    volume_failure: 1,
                    fatigue_failure: 0,
                },
                LeakRecord {
                    date: date(2024, 1, 3),
                    wet_weight: 12.5,
                    pressure_failure: 0,
                    volume_failure: 0,
                    fatigue_failure: 1,
                },
            ]
        );
        assert_eq!(
            ingested.issues,
            vec![
                IngestError::UnparsableDate {
                    line: 3,
                    value: "not a date".to_string()
                },
                IngestError::InvalidNumber {
                    line: 4,
                    column: WET_WEIGHT,
                    value: "-3".to_string()
                },
                IngestError::InvalidNumber {
                    line: 6,
                    column: WET_WEIGHT,
                    value: "abc".to_string()
                },
            ]
        );
    }

    #[test]
    fn rejects_counts_beyond_exact_float_range() {
        let csv = format!(
            "{LEAK_HEADER}\
             2024-01-01,10,1e19,0,0\n\
             2024-01-02,10,1e30,0,0\n\
             2024-01-03,10,4.0e3,0,0\n"
        );
        let ingested = read_leak_log(csv.as_bytes());

        assert_eq!(ingested.rows.len(), 1);
        assert_eq!(ingested.rows[0].pressure_failure, 4000);
        assert_eq!(
            ingested.issues,
            vec![
                IngestError::InvalidNumber {
                    line: 2,
                    column: PRESSURE_FAILURE,
                    value: "1e19".to_string()
                },
                IngestError::InvalidNumber {
                    line: 3,
                    column: PRESSURE_FAILURE,
                    value: "1e30".to_string()
                },
            ]
        );
    }

    #[test]
    fn short_rows_report_the_missing_field() {
        let csv = format!("{LEAK_HEADER}2024-01-01\n2024-01-02,40,0,0,0\n");
        let ingested = read_leak_log(csv.as_bytes());

        assert_eq!(ingested.rows.len(), 1);
        assert_eq!(
            ingested.issues,
            vec![IngestError::MissingColumn {
                line: 2,
                column: WET_WEIGHT
            }]
        );
    }

    #[test]
    fn missing_header_rejects_the_table() {
        let csv = "Date,Dry Minutes\n2024-01-01,30\n";
        let ingested = read_duty_log(csv.as_bytes());

        assert!(ingested.rows.is_empty());
        assert_eq!(
            ingested.issues,
            vec![
                IngestError::MissingColumn {
                    line: 1,
                    column: DRY_DURATION
                },
                IngestError::EmptyInput { table: DUTY_TABLE },
            ]
        );
    }

    #[test]
    fn reads_duty_rows_with_padded_headers_and_blank_rows() {
        let csv = " Date , Dry Duration (min) ,Notes\n\
                   2024-01-01,45,after coffee\n\
                   ,,\n\
                   2024-01-01,90,\n";
        let ingested = read_duty_log(csv.as_bytes());

        assert!(ingested.issues.is_empty());
        assert_eq!(
            ingested.rows,
            vec![
                DutyRecord {
                    date: date(2024, 1, 1),
                    dry_duration: 45.0
                },
                DutyRecord {
                    date: date(2024, 1, 1),
                    dry_duration: 90.0
                },
            ]
        );
    }

    #[test]
    fn empty_input_is_reported_not_fatal() {
        let ingested = read_leak_log("".as_bytes());
        assert!(ingested.rows.is_empty());
        assert_eq!(
            ingested.issues.last(),
            Some(&IngestError::EmptyInput { table: LEAK_TABLE })
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_duty_log(Path::new("/nonexistent/duty.csv")).unwrap_err();
        assert!(err.to_string().contains("failed to open"));
    }
}
