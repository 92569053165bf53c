use std::path::PathBuf;

use crate::error::ConfigError;
use crate::filter::RelevanceFilter;
use crate::models::Platform;

pub const ENV_STORAGE_ROOT: &str = "JOBBOARD_STORAGE_ROOT";
pub const ENV_KEYWORDS: &str = "JOBBOARD_KEYWORDS";
pub const ENV_HEADLESS: &str = "JOBBOARD_HEADLESS";
pub const ENV_RAW_SNAPSHOT_DIR: &str = "JOBBOARD_RAW_SNAPSHOT_DIR";

const HYPHEN_KEYWORDS: [&str; 4] = [
    "data-engineer-intern",
    "etl-developer-intern",
    "big-data-intern",
    "bi-engineer-intern",
];

const PLUS_KEYWORDS: [&str; 4] = [
    "data+engineer+intern",
    "etl+developer+intern",
    "big+data+intern",
    "bi+engineer+intern",
];

/// Routine search terms, already encoded the way each board's URLs want them.
pub fn default_keywords(platform: Platform) -> Vec<String> {
    let keywords = match platform {
        Platform::Glints => PLUS_KEYWORDS,
        Platform::Kalibrr | Platform::JobStreet => HYPHEN_KEYWORDS,
    };
    keywords.iter().map(|k| k.to_string()).collect()
}

/// Everything one run needs, resolved up front so the pipeline never reads
/// the environment itself.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub platform: Platform,
    pub keywords: Vec<String>,
    pub headless: bool,
    pub storage_root: PathBuf,
    pub raw_snapshot_dir: Option<PathBuf>,
    pub filter: RelevanceFilter,
}

impl PipelineConfig {
    pub fn new(platform: Platform, storage_root: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            keywords: default_keywords(platform),
            headless: true,
            storage_root: storage_root.into(),
            raw_snapshot_dir: None,
            filter: RelevanceFilter::default(),
        }
    }

    pub fn with_keywords<I, K>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Reads `.env` (if present) and the `JOBBOARD_*` variables.
    pub fn from_env(platform: Platform) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(platform, |name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(platform: Platform, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_root = lookup(ENV_STORAGE_ROOT)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_STORAGE_ROOT))?;

        let mut config = Self::new(platform, storage_root.trim());

        if let Some(raw) = lookup(ENV_KEYWORDS) {
            let keywords = parse_keywords(&raw);
            if keywords.is_empty() {
                return Err(ConfigError::Invalid {
                    name: ENV_KEYWORDS,
                    value: raw,
                });
            }
            config.keywords = keywords;
        }

        if let Some(raw) = lookup(ENV_HEADLESS) {
            config.headless = parse_bool(&raw).ok_or(ConfigError::Invalid {
                name: ENV_HEADLESS,
                value: raw,
            })?;
        }

        config.raw_snapshot_dir = lookup(ENV_RAW_SNAPSHOT_DIR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }
}

fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn storage_root_is_required() {
        let err = PipelineConfig::from_lookup(Platform::Glints, lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_STORAGE_ROOT)));
    }

    #[test]
    fn defaults_follow_the_platform() {
        let config =
            PipelineConfig::from_lookup(Platform::Glints, lookup(&[(ENV_STORAGE_ROOT, "/data/lake")]))
                .unwrap();
        assert_eq!(config.keywords[0], "data+engineer+intern");
        assert!(config.headless);
        assert_eq!(config.storage_root, PathBuf::from("/data/lake"));
        assert!(config.raw_snapshot_dir.is_none());

        let kalibrr = PipelineConfig::new(Platform::Kalibrr, "/tmp");
        assert_eq!(kalibrr.keywords[0], "data-engineer-intern");
    }

    #[test]
    fn environment_overrides_apply() {
        let config = PipelineConfig::from_lookup(
            Platform::JobStreet,
            lookup(&[
                (ENV_STORAGE_ROOT, "/data/lake"),
                (ENV_KEYWORDS, " data-analyst-intern, ,sql-intern "),
                (ENV_HEADLESS, "false"),
                (ENV_RAW_SNAPSHOT_DIR, "/tmp/raw"),
            ]),
        )
        .unwrap();

        assert_eq!(config.keywords, vec!["data-analyst-intern", "sql-intern"]);
        assert!(!config.headless);
        assert_eq!(config.raw_snapshot_dir, Some(PathBuf::from("/tmp/raw")));
    }

    #[test]
    fn rejects_bad_values() {
        let err = PipelineConfig::from_lookup(
            Platform::JobStreet,
            lookup(&[(ENV_STORAGE_ROOT, "/x"), (ENV_HEADLESS, "maybe")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: ENV_HEADLESS, .. }));

        let err = PipelineConfig::from_lookup(
            Platform::JobStreet,
            lookup(&[(ENV_STORAGE_ROOT, "/x"), (ENV_KEYWORDS, " , ")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: ENV_KEYWORDS, .. }));
    }
}
