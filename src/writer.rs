use std::fs::File;
use std::path::{Path, PathBuf};

use arrow_array::RecordBatch;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use parquet::arrow::ArrowWriter;
use tracing::{error, info};

use crate::error::StorageError;
use crate::models::{JobRecord, Platform};
use crate::storage::ObjectStore;
use crate::utils::now_wib;

/// `platform={platform}/ingestion_date={YYYY-MM-DD}/`
pub fn partition_prefix(platform: Platform, now: &DateTime<FixedOffset>) -> String {
    format!(
        "platform={}/ingestion_date={}/",
        platform,
        now.format("%Y-%m-%d")
    )
}

/// `platform={platform}/ingestion_date={YYYY-MM-DD}/{platform}_{HHMMSS}.parquet`
pub fn object_key(platform: Platform, now: &DateTime<FixedOffset>) -> String {
    format!(
        "{}{}_{}.parquet",
        partition_prefix(platform, now),
        platform,
        now.format("%H%M%S")
    )
}

pub fn encode_parquet(batch: &RecordBatch) -> Result<Bytes, StorageError> {
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(Bytes::from(buffer))
}

/// Lands validated tables in a store, one partition per platform and day.
pub struct IngestionWriter<S> {
    store: S,
}

impl<S: ObjectStore> IngestionWriter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Writes today's partition (WIB). Returns `false` instead of failing.
    pub async fn write(&self, batch: &RecordBatch, platform: Platform) -> bool {
        self.write_at(batch, platform, &now_wib()).await
    }

    pub async fn write_at(&self, batch: &RecordBatch, platform: Platform, now: &DateTime<FixedOffset>) -> bool {
        match self.try_write_at(batch, platform, now).await {
            Ok(key) => {
                info!(%platform, key = %key, rows = batch.num_rows(), "partition written");
                true
            }
            Err(e) => {
                error!(%platform, "partition write failed: {e}");
                false
            }
        }
    }

    /// Replaces everything under the partition with one new object. The
    /// table is encoded before anything is deleted, so an encoding failure
    /// leaves the previous output in place.
    pub async fn try_write_at(
        &self,
        batch: &RecordBatch,
        platform: Platform,
        now: &DateTime<FixedOffset>,
    ) -> Result<String, StorageError> {
        let body = encode_parquet(batch)?;
        let prefix = partition_prefix(platform, now);

        let existing = self.store.list(&prefix).await?;
        for key in &existing {
            self.store.delete(key).await?;
        }
        if !existing.is_empty() {
            info!(%platform, prefix = %prefix, removed = existing.len(), "cleared previous partition files");
        }

        let key = object_key(platform, now);
        self.store.put(&key, body).await?;
        Ok(key)
    }
}

/// Dumps raw (pre-dedup) records to a local CSV for debugging selector drift.
pub fn save_raw_snapshot(
    records: &[JobRecord],
    dir: &Path,
    platform: Platform,
    now: &DateTime<FixedOffset>,
) -> Result<PathBuf, StorageError> {
    std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
        key: dir.display().to_string(),
        source,
    })?;

    let path = dir.join(format!("{}_raw_{}.csv", platform, now.format("%Y%m%d_%H%M%S")));
    let file = File::create(&path).map_err(|source| StorageError::Io {
        key: path.display().to_string(),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }

    writer.flush().map_err(|source| StorageError::Io {
        key: path.display().to_string(),
        source,
    })?;
    Ok(path)
}

/// [`save_raw_snapshot`] on the blocking pool, for callers on the runtime.
pub async fn spawn_raw_snapshot(
    records: Vec<JobRecord>,
    dir: PathBuf,
    platform: Platform,
    now: DateTime<FixedOffset>,
) -> Result<PathBuf, StorageError> {
    tokio::task::spawn_blocking(move || save_raw_snapshot(&records, &dir, platform, &now)).await?
}
