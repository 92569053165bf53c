use std::time::Duration;

use async_trait::async_trait;
use scraper::ElementRef;
use url::Url;

use crate::browser::PageHandle;
use crate::crawler::{CardExtractor, Css, JobBoard};
use crate::error::{BrowserError, ExtractionError};
use crate::human::human_scroll;
use crate::models::Platform;
use crate::navigation::ReadyCondition;

const BASE_URL: &str = "https://glints.com";
const CARD_SELECTOR: &str = r#"[data-glints-tracking-element-name="job_card"]"#;
const CARD_WAIT: Duration = Duration::from_secs(20);

pub struct GlintsClient {
    base_url: Url,
    card: Css,
    title: Css,
    company: Css,
    location: Css,
}

impl GlintsClient {
    pub fn new() -> Self {
        Self {
            base_url: Url::parse(BASE_URL).unwrap(),
            card: Css::new(CARD_SELECTOR),
            title: Css::new(r#"h2[class*="JobTitle"] a"#),
            company: Css::new(r#"[data-cy="company_name_job_card"] a"#),
            location: Css::new(r#"div[class*="LocationWrapper"]"#),
        }
    }
}

impl Default for GlintsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CardExtractor for GlintsClient {
    fn platform(&self) -> Platform {
        Platform::Glints
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
impl JobBoard for GlintsClient {
    fn search_url(&self, keyword: &str) -> String {
        format!(
            "{}/id/opportunities/jobs/explore?keyword={}&country=ID&locationName=All+Cities%2FProvinces",
            BASE_URL,
            keyword.trim()
        )
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
        page.wait_for_selector(CARD_SELECTOR, CARD_WAIT).await?;
        human_scroll(page).await;
        Ok(())
    }
}
