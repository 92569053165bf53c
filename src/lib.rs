pub mod browser;
pub mod clients;
pub mod config;
pub mod crawler;
pub mod error;
pub mod filter;
pub mod human;
pub mod identity;
pub mod models;
pub mod navigation;
pub mod pipeline;
pub mod storage;
pub mod table;
pub mod utils;
pub mod validator;
pub mod writer;

pub use browser::{BrowserSession, ChromeSessionFactory, PageHandle, SessionFactory, SessionOptions};
pub use clients::{GlintsClient, JobStreetClient, KalibrrClient, adapter_for};
pub use config::PipelineConfig;
pub use crawler::{CardExtractor, JobBoard};
pub use error::{PipelineError, SchemaError};
pub use filter::RelevanceFilter;
pub use models::{JobRecord, Platform};
pub use pipeline::{CollectedJobs, IngestPipeline, RunReport};
pub use storage::{LocalObjectStore, MemoryObjectStore, ObjectStore};
pub use writer::IngestionWriter;
