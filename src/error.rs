use thiserror::Error;

/// Problems found while turning CSV rows into records. None of these abort a
/// batch; the reader collects them next to the rows it could use.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error("line {line}: missing required column `{column}`")]
    MissingColumn { line: u64, column: &'static str },

    #[error("line {line}: could not resolve `{value}` to a calendar date")]
    UnparsableDate { line: u64, value: String },

    #[error("line {line}: `{column}` has invalid value `{value}`")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: malformed record: {message}")]
    Malformed { line: u64, message: String },

    #[error("{table} contains no usable rows")]
    EmptyInput { table: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("rolling window must be at least 1 point, got {0}")]
    Window(usize),

    #[error("forecast lookback must cover at least 2 points, got {0}")]
    Lookback(usize),

    #[error("minimum forecast points must be between 2 and the lookback ({lookback}), got {min_points}")]
    MinPoints { min_points: usize, lookback: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("not a Google Sheets URL (expected `/d/<sheet id>`): {0}")]
    MissingSheetId(String),
}
