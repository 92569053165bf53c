use std::time::Duration;

use crate::models::Platform;
use crate::validator::Violation;

/// Failures raised by the browser driver or while waiting on it.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("browser driver: {0}")]
    Driver(#[from] anyhow::Error),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("browser task panicked or was cancelled: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A page never reached its ready state after every retry.
#[derive(Debug, thiserror::Error)]
#[error("navigation to {url} failed after {attempts} attempt(s): {source}")]
pub struct NavigationError {
    pub url: String,
    pub attempts: u32,
    #[source]
    pub source: BrowserError,
}

/// Why one keyword contributed no records. Never aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum KeywordError {
    #[error("opening a browser session failed: {0}")]
    Session(#[source] BrowserError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("page interaction failed: {0}")]
    Page(#[source] BrowserError),
}

/// A single card could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("{field}: no element matches `{selector}`")]
    MissingElement {
        field: &'static str,
        selector: &'static str,
    },

    #[error("{field}: element text is empty")]
    EmptyText { field: &'static str },

    #[error("title link has no href")]
    MissingHref,

    #[error("cannot resolve `{href}` against {base}: {reason}")]
    InvalidUrl {
        base: String,
        href: String,
        reason: String,
    },
}

/// Every contract violation found in a table, reported together.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} schema violation(s): {}", .violations.len(), summarize(.violations))]
pub struct SchemaError {
    pub violations: Vec<Violation>,
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io on `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid object key `{0}`")]
    InvalidKey(String),

    #[error("object `{0}` not found")]
    NotFound(String),

    #[error("parquet encoding: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("csv encoding: {0}")]
    Csv(#[from] csv::Error),

    #[error("blocking write task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Run-level outcome reported to whoever invoked the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{platform}: pipeline finished with 0 records")]
    NoRecords { platform: Platform },

    #[error("{platform}: building the record table failed: {source}")]
    Table {
        platform: Platform,
        #[source]
        source: arrow_schema::ArrowError,
    },

    #[error("{platform}: {source}")]
    Schema {
        platform: Platform,
        #[source]
        source: SchemaError,
    },

    #[error("{platform}: writing the partition failed")]
    Storage { platform: Platform },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("{name} has invalid value `{value}`")]
    Invalid { name: &'static str, value: String },

    #[error(transparent)]
    Platform(#[from] crate::models::UnknownPlatform),
}
