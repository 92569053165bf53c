use std::collections::HashMap;
use std::fmt;

use arrow_array::{Array, RecordBatch, StringArray};
use arrow_schema::DataType;
use chrono::{DateTime, NaiveDateTime};

use crate::error::SchemaError;
use crate::models::Platform;
use crate::table::{self, COLUMNS};

/// Compact timestamp form older runs wrote into `scraped_at`.
const COMPACT_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

const NON_EMPTY: [&str; 4] = [
    table::JOB_ID,
    table::JOB_TITLE,
    table::COMPANY_NAME,
    table::JOB_URL,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingColumn(&'static str),
    WrongType {
        column: &'static str,
        found: DataType,
    },
    Null {
        column: &'static str,
        row: usize,
    },
    Empty {
        column: &'static str,
        row: usize,
    },
    UnknownPlatform {
        row: usize,
        value: String,
    },
    DuplicateJobId {
        job_id: String,
        row: usize,
        first_row: usize,
    },
    BadTimestamp {
        row: usize,
        value: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn(column) => write!(f, "column `{column}` is missing"),
            Self::WrongType { column, found } => {
                write!(f, "column `{column}` has type {found}, expected Utf8")
            }
            Self::Null { column, row } => write!(f, "row {row}: `{column}` is null"),
            Self::Empty { column, row } => write!(f, "row {row}: `{column}` is empty"),
            Self::UnknownPlatform { row, value } => {
                write!(f, "row {row}: platform `{value}` is not one of kalibrr, glints, jobstreet")
            }
            Self::DuplicateJobId {
                job_id,
                row,
                first_row,
            } => write!(f, "row {row}: job_id `{job_id}` already used by row {first_row}"),
            Self::BadTimestamp { row, value } => {
                write!(f, "row {row}: scraped_at `{value}` is not a timestamp")
            }
        }
    }
}

/// Checks a table against the record contract. Passes the batch through
/// untouched when it conforms; otherwise reports every violation at once.
pub fn validate(batch: RecordBatch) -> Result<RecordBatch, SchemaError> {
    let mut violations = Vec::new();
    let mut columns: HashMap<&'static str, &StringArray> = HashMap::new();

    for name in COLUMNS {
        match batch.column_by_name(name) {
            None => violations.push(Violation::MissingColumn(name)),
            Some(array) => match array.as_any().downcast_ref::<StringArray>() {
                Some(strings) => {
                    columns.insert(name, strings);
                }
                None => violations.push(Violation::WrongType {
                    column: name,
                    found: array.data_type().clone(),
                }),
            },
        }
    }

    for name in NON_EMPTY {
        if let Some(column) = columns.get(name) {
            check_non_empty(name, column, &mut violations);
        }
    }

    if let Some(platforms) = columns.get(table::PLATFORM) {
        check_platforms(platforms, &mut violations);
    }

    if let Some(ids) = columns.get(table::JOB_ID) {
        check_unique_ids(ids, &mut violations);
    }

    if let Some(timestamps) = columns.get(table::SCRAPED_AT) {
        check_timestamps(timestamps, &mut violations);
    }

    if violations.is_empty() {
        Ok(batch)
    } else {
        Err(SchemaError { violations })
    }
}

fn check_non_empty(name: &'static str, column: &StringArray, violations: &mut Vec<Violation>) {
    for row in 0..column.len() {
        if column.is_null(row) {
            violations.push(Violation::Null { column: name, row });
        } else if column.value(row).trim().is_empty() {
            violations.push(Violation::Empty { column: name, row });
        }
    }
}

fn check_platforms(column: &StringArray, violations: &mut Vec<Violation>) {
    for (row, value) in column.iter().enumerate() {
        match value {
            None => violations.push(Violation::Null {
                column: table::PLATFORM,
                row,
            }),
            Some(value) if !Platform::ALL.iter().any(|p| p.as_str() == value) => {
                violations.push(Violation::UnknownPlatform {
                    row,
                    value: value.to_string(),
                });
            }
            Some(_) => {}
        }
    }
}

fn check_unique_ids(column: &StringArray, violations: &mut Vec<Violation>) {
    let mut first_seen: HashMap<&str, usize> = HashMap::with_capacity(column.len());
    for (row, value) in column.iter().enumerate() {
        let Some(job_id) = value else { continue };
        if let Some(&first_row) = first_seen.get(job_id) {
            violations.push(Violation::DuplicateJobId {
                job_id: job_id.to_string(),
                row,
                first_row,
            });
        } else {
            first_seen.insert(job_id, row);
        }
    }
}

fn check_timestamps(column: &StringArray, violations: &mut Vec<Violation>) {
    for (row, value) in column.iter().enumerate() {
        match value {
            None => violations.push(Violation::Null {
                column: table::SCRAPED_AT,
                row,
            }),
            Some(value) if !is_timestamp(value) => violations.push(Violation::BadTimestamp {
                row,
                value: value.to_string(),
            }),
            Some(_) => {}
        }
    }
}

fn is_timestamp(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, COMPACT_TIMESTAMP).is_ok()
}
