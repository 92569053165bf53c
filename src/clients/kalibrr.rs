use std::time::Duration;

use async_trait::async_trait;
use scraper::ElementRef;
use tracing::{debug, info, warn};
use url::Url;

use crate::browser::{Locator, PageHandle};
use crate::crawler::{CardExtractor, Css, JobBoard};
use crate::error::{BrowserError, ExtractionError};
use crate::human::human_delay;
use crate::models::Platform;
use crate::navigation::ReadyCondition;

const BASE_URL: &str = "https://www.kalibrr.com";
const SEARCH_URL: &str = "https://www.kalibrr.com/id-ID/home/w/100-internship-_-ojt/te";

/// "Load more" is clicked at most this many times. It is a safety limit,
/// not a pagination cursor.
const MAX_LOAD_MORE_CLICKS: usize = 1;
const LOAD_MORE: Locator = Locator::css("button.k-btn-primary").with_text("Load more jobs");

pub struct KalibrrClient {
    base_url: Url,
    card: Css,
    title: Css,
    company: Css,
    location: Css,
}

impl KalibrrClient {
    pub fn new() -> Self {
        Self {
            base_url: Url::parse(BASE_URL).unwrap(),
            card: Css::new("div.css-1otdiuc"),
            title: Css::new(r#"h2 a[itemprop="name"]"#),
            company: Css::new("a.k-text-subdued.k-font-bold"),
            location: Css::new("span.k-text-gray-500"),
        }
    }

    async fn load_more(&self, page: &dyn PageHandle) -> Result<(), BrowserError> {
        for click in 1..=MAX_LOAD_MORE_CLICKS {
            if !page.is_visible(&LOAD_MORE).await? {
                debug!("load-more button gone");
                return Ok(());
            }

            info!(click, "clicking load more");
            page.scroll_into_view(&LOAD_MORE).await?;
            human_delay(500, 1500).await;
            page.click(&LOAD_MORE).await?;
            human_delay(1500, 2000).await;
        }

        debug!(limit = MAX_LOAD_MORE_CLICKS, "load-more click limit reached");
        Ok(())
    }
}

impl Default for KalibrrClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CardExtractor for KalibrrClient {
    fn platform(&self) -> Platform {
        Platform::Kalibrr
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn card_selector(&self) -> &Css {
        &self.card
    }

    fn extract_title(&self, card: ElementRef<'_>) -> Result<String, ExtractionError> {
        self.title.text(card, "job_title")
    }

    fn extract_href(&self, card: ElementRef<'_>) -> Result<String, ExtractionError> {
        self.title.attr(card, "job_url", "href")
    }

    fn extract_company(&self, card: ElementRef<'_>) -> Result<String, ExtractionError> {
        self.company.text(card, "company_name")
    }

    fn extract_location(&self, card: ElementRef<'_>) -> String {
        self.location.text(card, "location").unwrap_or_default()
    }
}

#[async_trait]
impl JobBoard for KalibrrClient {
    fn search_url(&self, keyword: &str) -> String {
        format!("{}/{}", SEARCH_URL, keyword.trim())
    }

    fn block_resources(&self) -> bool {
        true
    }

    fn ready_condition(&self) -> ReadyCondition {
        ReadyCondition::DomContentLoaded
    }

    fn nav_timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_secs(2)
    }

    async fn prepare(&self, page: &dyn PageHandle) -> Result<(), BrowserError> {
        // Cards already on the page are still worth reading if this fails.
        if let Err(e) = self.load_more(page).await {
            warn!("load more failed, using the first page only: {e}");
        }
        Ok(())
    }
}
