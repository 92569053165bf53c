//! The run's tabular form: an Arrow batch with the seven record columns.

use std::sync::Arc;

use arrow_array::{Array, ArrayRef, RecordBatch, StringArray};
use arrow_schema::{ArrowError, DataType, Field, Schema, SchemaRef};

use crate::models::JobRecord;

pub const JOB_ID: &str = "job_id";
pub const JOB_TITLE: &str = "job_title";
pub const COMPANY_NAME: &str = "company_name";
pub const LOCATION: &str = "location";
pub const JOB_URL: &str = "job_url";
pub const PLATFORM: &str = "platform";
pub const SCRAPED_AT: &str = "scraped_at";

pub const COLUMNS: [&str; 7] = [
    JOB_ID,
    JOB_TITLE,
    COMPANY_NAME,
    LOCATION,
    JOB_URL,
    PLATFORM,
    SCRAPED_AT,
];

pub fn job_schema() -> SchemaRef {
    let fields: Vec<Field> = COLUMNS
        .iter()
        .map(|name| Field::new(*name, DataType::Utf8, *name == LOCATION))
        .collect();
    Arc::new(Schema::new(fields))
}

pub fn to_record_batch(records: &[JobRecord]) -> Result<RecordBatch, ArrowError> {
    RecordBatch::try_new(
        job_schema(),
        vec![
            string_array(records, |r| r.job_id.as_str()),
            string_array(records, |r| r.job_title.as_str()),
            string_array(records, |r| r.company_name.as_str()),
            string_array(records, |r| r.location.as_str()),
            string_array(records, |r| r.job_url.as_str()),
            string_array(records, |r| r.platform.as_str()),
            string_array(records, |r| r.scraped_at.as_str()),
        ],
    )
}

fn string_array<'a>(records: &'a [JobRecord], get: impl Fn(&'a JobRecord) -> &'a str) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(records.iter().map(get)))
}

pub fn empty_batch() -> RecordBatch {
    RecordBatch::new_empty(job_schema())
}

/// Looks up a Utf8 column by name.
pub fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|array| array.as_any().downcast_ref::<StringArray>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;

    #[test]
    fn batch_has_one_row_per_record_in_column_order() {
        let records = vec![JobRecord {
            job_id: "abc".to_string(),
            job_title: "Data Engineer Intern".to_string(),
            company_name: "Acme".to_string(),
            location: String::new(),
            job_url: "https://glints.com/x".to_string(),
            platform: Platform::Glints,
            scraped_at: "2026-02-27T17:32:37+07:00".to_string(),
        }];

        let batch = to_record_batch(&records).unwrap();
        assert_eq!(batch.num_rows(), 1);
        let names: Vec<_> = batch.schema().fields().iter().map(|f| f.name().clone()).collect();
        assert_eq!(names, COLUMNS);

        let platform = string_column(&batch, PLATFORM).unwrap();
        assert_eq!(platform.value(0), "glints");
        assert!(!string_column(&batch, LOCATION).unwrap().is_null(0));
    }

    #[test]
    fn empty_batch_keeps_the_schema() {
        let batch = empty_batch();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), COLUMNS.len());
    }
}
