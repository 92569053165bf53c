use std::collections::HashSet;

use url::Url;

use crate::error::ExtractionError;
use crate::models::JobRecord;

/// Resolves a card's href against the platform origin. Absolute hrefs pass
/// through unchanged; relative and protocol-relative ones are joined.
pub fn canonical_url(base: &Url, href: &str) -> Result<Url, ExtractionError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(ExtractionError::MissingHref);
    }

    base.join(href).map_err(|e| ExtractionError::InvalidUrl {
        base: base.to_string(),
        href: href.to_string(),
        reason: e.to_string(),
    })
}

/// Stable identifier of a posting: hex MD5 of its canonical URL.
pub fn job_id(canonical_url: &str) -> String {
    format!("{:x}", md5::compute(canonical_url.as_bytes()))
}

/// Keeps the first record for each `job_id`, in input order.
pub fn dedupe(records: Vec<JobRecord>) -> Vec<JobRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.job_id.clone()))
        .collect()
}
