use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Job boards the pipeline knows how to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Kalibrr,
    Glints,
    JobStreet,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Kalibrr, Platform::Glints, Platform::JobStreet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kalibrr => "kalibrr",
            Self::Glints => "glints",
            Self::JobStreet => "jobstreet",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform `{0}` (expected kalibrr, glints or jobstreet)")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kalibrr" => Ok(Self::Kalibrr),
            "glints" => Ok(Self::Glints),
            "jobstreet" => Ok(Self::JobStreet),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

/// One posting found on one platform during one run. Never mutated after
/// an adapter builds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub job_id: String,
    pub job_title: String,
    pub company_name: String,
    pub location: String,
    pub job_url: String,
    pub platform: Platform,
    pub scraped_at: String,
}
