use std::fmt;

use thiserror::Error;

use crate::domain::id::ExchangeId;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("unknown list mode '{0}'")]
    UnknownListMode(String),

    #[error("unknown segment source '{0}'")]
    UnknownSegmentSource(String),

    #[error("unknown exchange '{0}'")]
    UnknownExchange(String),
}

/// Failures surfaced by the resilient fetch client once retries are exhausted.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("http {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected content-type: {content_type}")]
    UnexpectedContent { content_type: String },

    #[error("json decode: {0}")]
    Decode(#[source] serde_json::Error),

    /// The exchange answered 2xx but reported an error inside the payload.
    #[error("upstream error: {reason}")]
    Upstream { exchange: &'static str, reason: String },
}

/// Segment derivation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("base {base} was not assigned to any segment")]
    Unassigned { base: String },

    #[error("base {base} was assigned to {count} segments")]
    Duplicated { base: String, count: usize },
}

/// One exchange that failed during an orchestrator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeFailure {
    pub exchange_id: ExchangeId,
    pub name: String,
    pub reason: String,
}

impl fmt::Display for ExchangeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.reason)
    }
}

/// Joined per-exchange failures, rendered one per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncFailures(pub Vec<ExchangeFailure>);

impl SyncFailures {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExchangeFailure> {
        self.0.iter()
    }
}

impl fmt::Display for SyncFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SyncFailures {}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Segment(#[from] SegmentError),

    #[error("all exchanges failed:\n{0}")]
    SyncFailed(SyncFailures),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("list not found: {0}")]
    ListNotFound(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch(FetchError::Transport(err))
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}
