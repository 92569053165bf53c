use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::browser::{PageHandle, SessionOptions};
use crate::error::{BrowserError, ExtractionError, KeywordError, NavigationError};
use crate::filter::RelevanceFilter;
use crate::identity::{canonical_url, job_id};
use crate::models::{JobRecord, Platform};
use crate::navigation::{self, ReadyCondition, RetryPolicy};
use crate::utils::{format_scraped_at, now_wib};

/// A parsed CSS selector that remembers its source for error messages.
pub struct Css {
    pub source: &'static str,
    selector: Selector,
}

impl Css {
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            selector: Selector::parse(source).unwrap(),
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// First match inside `scope`. Lookups never leave the card.
    pub fn first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        scope.select(&self.selector).next()
    }

    /// Whitespace-collapsed text of the first match; missing or blank is an
    /// error.
    pub fn text(&self, scope: ElementRef<'_>, field: &'static str) -> Result<String, ExtractionError> {
        let element = self.first(scope).ok_or(ExtractionError::MissingElement {
            field,
            selector: self.source,
        })?;
        let text = collapse_whitespace(&element.text().collect::<String>());
        if text.is_empty() {
            return Err(ExtractionError::EmptyText { field });
        }
        Ok(text)
    }

    pub fn attr(&self, scope: ElementRef<'_>, field: &'static str, name: &str) -> Result<String, ExtractionError> {
        let element = self.first(scope).ok_or(ExtractionError::MissingElement {
            field,
            selector: self.source,
        })?;
        element
            .value()
            .attr(name)
            .map(str::to_string)
            .ok_or(ExtractionError::MissingHref)
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Per-card field lookups for one platform's search-result markup.
pub trait CardExtractor {
    fn platform(&self) -> Platform;

    /// Origin that relative posting links resolve against.
    fn base_url(&self) -> &Url;

    fn card_selector(&self) -> &Css;

    fn extract_title(&self, card: ElementRef<'_>) -> Result<String, ExtractionError>;

    fn extract_href(&self, card: ElementRef<'_>) -> Result<String, ExtractionError>;

    fn extract_company(&self, card: ElementRef<'_>) -> Result<String, ExtractionError>;

    /// Empty when the card has no location.
    fn extract_location(&self, card: ElementRef<'_>) -> String;

    fn parse_card(
        &self,
        card: ElementRef<'_>,
        filter: &RelevanceFilter,
        scraped_at: &str,
    ) -> Result<Option<JobRecord>, ExtractionError> {
        let job_title = self.extract_title(card)?;
        if !filter.is_relevant(&job_title) {
            return Ok(None);
        }

        let url = canonical_url(self.base_url(), &self.extract_href(card)?)?;
        let company_name = self.extract_company(card)?;
        let location = self.extract_location(card);

        Ok(Some(JobRecord {
            job_id: job_id(url.as_str()),
            job_title,
            company_name,
            location,
            job_url: url.into(),
            platform: self.platform(),
            scraped_at: scraped_at.to_string(),
        }))
    }

    /// Turns a results page into records. A card that fails to parse is
    /// skipped and never stops the rest of the page.
    fn parse_cards(&self, html: &str, filter: &RelevanceFilter, scraped_at: &str) -> Vec<JobRecord> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();
        let mut cards = 0;
        let mut irrelevant = 0;
        let mut failed = 0;

        for (index, card) in document.select(self.card_selector().selector()).enumerate() {
            cards += 1;
            match self.parse_card(card, filter, scraped_at) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => irrelevant += 1,
                Err(e) => {
                    failed += 1;
                    debug!(platform = %self.platform(), card = index, "card skipped: {e}");
                }
            }
        }

        info!(
            platform = %self.platform(),
            cards,
            kept = records.len(),
            irrelevant,
            failed,
            "parsed result cards"
        );
        records
    }
}

/// One job board: where to search, how to wait for it, and what to do on
/// the page before its cards are read.
#[async_trait]
pub trait JobBoard: CardExtractor + Send + Sync {
    /// `keyword` arrives already encoded the way the board expects.
    fn search_url(&self, keyword: &str) -> String;

    fn block_resources(&self) -> bool {
        false
    }

    fn ready_condition(&self) -> ReadyCondition;

    fn nav_timeout(&self) -> Duration;

    /// Pause after the ready condition; result lists keep mutating briefly.
    fn settle_delay(&self) -> Duration;

    /// Platform interactions between navigation and reading the DOM.
    async fn prepare(&self, page: &dyn PageHandle) -> Result<(), BrowserError>;

    fn session_options(&self, headless: bool) -> SessionOptions {
        SessionOptions::new(headless, self.block_resources())
    }

    async fn navigate(&self, page: &dyn PageHandle, url: &str, policy: &RetryPolicy) -> Result<(), NavigationError> {
        navigation::navigate(page, url, self.ready_condition(), self.nav_timeout(), policy).await?;
        debug!(platform = %self.platform(), delay = ?self.settle_delay(), "page ready, settling");
        tokio::time::sleep(self.settle_delay()).await;
        Ok(())
    }

    async fn extract(&self, page: &dyn PageHandle, filter: &RelevanceFilter) -> Result<Vec<JobRecord>, BrowserError> {
        self.prepare(page).await?;
        let html = page.content().await?;
        let scraped_at = format_scraped_at(&now_wib());
        Ok(self.parse_cards(&html, filter, &scraped_at))
    }

    async fn scrape(
        &self,
        page: &dyn PageHandle,
        url: &str,
        filter: &RelevanceFilter,
        policy: &RetryPolicy,
    ) -> Result<Vec<JobRecord>, KeywordError> {
        self.navigate(page, url, policy).await?;
        self.extract(page, filter).await.map_err(KeywordError::Page)
    }
}
