use std::time::Duration;

use async_trait::async_trait;
use scraper::ElementRef;
use tracing::debug;
use url::Url;

use crate::browser::PageHandle;
use crate::crawler::{CardExtractor, Css, JobBoard};
use crate::error::{BrowserError, ExtractionError};
use crate::human::human_scroll;
use crate::models::Platform;
use crate::navigation::ReadyCondition;

const BASE_URL: &str = "https://id.jobstreet.com";
const SCROLL_ROUNDS: usize = 3;

pub struct JobStreetClient {
    base_url: Url,
    card: Css,
    title: Css,
    company: Css,
    location: Css,
}

impl JobStreetClient {
    pub fn new() -> Self {
        Self {
            base_url: Url::parse(BASE_URL).unwrap(),
            card: Css::new(r#"article[data-automation="normalJob"]"#),
            title: Css::new(r#"[data-automation="jobTitle"]"#),
            company: Css::new(r#"[data-automation="jobCompany"]"#),
            location: Css::new(r#"[data-automation="jobLocation"]"#),
        }
    }
}

impl Default for JobStreetClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CardExtractor for JobStreetClient {
    fn platform(&self) -> Platform {
        Platform::JobStreet
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
impl JobBoard for JobStreetClient {
    fn search_url(&self, keyword: &str) -> String {
        format!("{}/id/{}-jobs?daterange=7", BASE_URL, keyword.trim())
    }

    fn ready_condition(&self) -> ReadyCondition {
        ReadyCondition::NetworkIdle
    }

    fn nav_timeout(&self) -> Duration {
        Duration::from_secs(60)
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn prepare(&self, page: &dyn PageHandle) -> Result<(), BrowserError> {
        // Dismiss the sign-in modal that often covers the results.
        page.press_key("Escape").await?;
        tokio::time::sleep(Duration::from_secs(1)).await;

        for round in 1..=SCROLL_ROUNDS {
            debug!(round, "scrolling results");
            human_scroll(page).await;
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        Ok(())
    }
}
