use std::path::Path;

use tracing::{error, info, warn};

use crate::browser::SessionFactory;
use crate::config::PipelineConfig;
use crate::crawler::JobBoard;
use crate::error::{KeywordError, PipelineError};
use crate::identity::dedupe;
use crate::models::{JobRecord, Platform};
use crate::navigation::RetryPolicy;
use crate::storage::ObjectStore;
use crate::table::to_record_batch;
use crate::utils::now_wib;
use crate::validator::validate;
use crate::writer::{IngestionWriter, spawn_raw_snapshot};

/// What one run did, for the caller's exit status and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub platform: Platform,
    pub keywords: usize,
    pub collected: usize,
    pub duplicates_dropped: usize,
    pub written: usize,
}

pub struct IngestPipeline {
    config: PipelineConfig,
    retry: RetryPolicy,
}

#[must_use = "collected jobs must end with .commit() to be written"]
pub struct CollectedJobs {
    platform: Platform,
    keywords: usize,
    records: Vec<JobRecord>,
}

impl IngestPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Phase one. Keywords run one after another, each in a fresh session.
    /// A keyword that fails contributes nothing and the loop moves on.
    pub async fn collect(&self, board: &dyn JobBoard, factory: &dyn SessionFactory) -> CollectedJobs {
        let platform = board.platform();
        let mut records = Vec::new();

        for keyword in &self.config.keywords {
            let url = board.search_url(keyword);
            info!(%platform, keyword = %keyword, url = %url, "scraping keyword");

            match self.scrape_keyword(board, factory, &url).await {
                Ok(found) => {
                    info!(%platform, keyword = %keyword, records = found.len(), "keyword done");
                    records.extend(found);
                }
                Err(e) => warn!(%platform, keyword = %keyword, "keyword yielded no records: {e}"),
            }
        }

        info!(%platform, total = records.len(), "collection finished");
        CollectedJobs {
            platform,
            keywords: self.config.keywords.len(),
            records,
        }
    }

    async fn scrape_keyword(
        &self,
        board: &dyn JobBoard,
        factory: &dyn SessionFactory,
        url: &str,
    ) -> Result<Vec<JobRecord>, KeywordError> {
        let options = board.session_options(self.config.headless);
        let session = factory.open(&options).await.map_err(KeywordError::Session)?;

        let result = board
            .scrape(session.page(), url, &self.config.filter, &self.retry)
            .await;

        session.close().await;
        result
    }

    /// Both phases, plus the raw snapshot when one is configured.
    pub async fn run<S: ObjectStore>(
        &self,
        board: &dyn JobBoard,
        factory: &dyn SessionFactory,
        writer: &IngestionWriter<S>,
    ) -> Result<RunReport, PipelineError> {
        let mut collected = self.collect(board, factory).await;
        if let Some(dir) = &self.config.raw_snapshot_dir {
            collected = collected.save_raw_and_then(dir).await;
        }
        collected.commit(writer).await
    }
}

impl CollectedJobs {
    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    /// Writes the pre-dedup records to CSV. A failure is logged, not fatal.
    pub async fn save_raw_and_then(self, dir: impl AsRef<Path>) -> Self {
        if self.records.is_empty() {
            return self;
        }
        let dir = dir.as_ref().to_path_buf();
        match spawn_raw_snapshot(self.records.clone(), dir, self.platform, now_wib()).await {
            Ok(path) => info!(platform = %self.platform, path = %path.display(), "raw snapshot saved"),
            Err(e) => warn!(platform = %self.platform, "raw snapshot failed: {e}"),
        }
        self
    }

    /// Phase two: dedupe, validate, and replace today's partition.
    pub async fn commit<S: ObjectStore>(self, writer: &IngestionWriter<S>) -> Result<RunReport, PipelineError> {
        let platform = self.platform;
        if self.records.is_empty() {
            error!(%platform, "no records collected, nothing written");
            return Err(PipelineError::NoRecords { platform });
        }

        let collected = self.records.len();
        let unique = dedupe(self.records);
        let duplicates_dropped = collected - unique.len();
        info!(%platform, collected, unique = unique.len(), duplicates_dropped, "deduplicated");

        let batch = to_record_batch(&unique).map_err(|source| PipelineError::Table { platform, source })?;
        let batch = validate(batch).map_err(|source| {
            error!(%platform, violations = source.violations.len(), "validation failed: {source}");
            PipelineError::Schema { platform, source }
        })?;

        if !writer.write(&batch, platform).await {
            return Err(PipelineError::Storage { platform });
        }

        Ok(RunReport {
            platform,
            keywords: self.keywords,
            collected,
            duplicates_dropped,
            written: batch.num_rows(),
        })
    }
}
