mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use common::{FakePage, FakeSite};
use tokio::time::Instant;

use jobboard_ingest::browser::{Locator, PageHandle};
use jobboard_ingest::error::BrowserError;
use jobboard_ingest::navigation::{ReadyCondition, RetryPolicy, navigate};

const URL: &str = "https://glints.com/id/opportunities/jobs/explore?keyword=data+engineer+intern";

/// Fails the first `failures` navigations, then succeeds.
struct FlakyPage {
    failures: u32,
    calls: AtomicU32,
}

impl FlakyPage {
    fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl PageHandle for FlakyPage {
    async fn goto(&self, _url: &str, _ready: ReadyCondition) -> Result<(), BrowserError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            Err(BrowserError::Driver(anyhow!("navigation attempt {call} reset")))
        } else {
            Ok(())
        }
    }

    async fn wait_for_selector(&self, _css: &str, _timeout: Duration) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn evaluate(&self, _script: &str) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn press_key(&self, _key: &str) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn is_visible(&self, _locator: &Locator) -> Result<bool, BrowserError> {
        Ok(false)
    }

    async fn scroll_into_view(&self, _locator: &Locator) -> Result<bool, BrowserError> {
        Ok(false)
    }

    async fn click(&self, _locator: &Locator) -> Result<bool, BrowserError> {
        Ok(false)
    }

    async fn content(&self) -> Result<String, BrowserError> {
        Ok(String::new())
    }
}

/// Never finishes loading.
struct HangingPage {
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl PageHandle for HangingPage {
    async fn goto(&self, _url: &str, _ready: ReadyCondition) -> Result<(), BrowserError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    async fn wait_for_selector(&self, _css: &str, _timeout: Duration) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn evaluate(&self, _script: &str) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn press_key(&self, _key: &str) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn is_visible(&self, _locator: &Locator) -> Result<bool, BrowserError> {
        Ok(false)
    }

    async fn scroll_into_view(&self, _locator: &Locator) -> Result<bool, BrowserError> {
        Ok(false)
    }

    async fn click(&self, _locator: &Locator) -> Result<bool, BrowserError> {
        Ok(false)
    }

    async fn content(&self) -> Result<String, BrowserError> {
        Ok(String::new())
    }
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_three_attempts_with_backoff() {
    let page = FlakyPage::new(u32::MAX);
    let start = Instant::now();

    let err = navigate(
        &page,
        URL,
        ReadyCondition::NetworkIdle,
        Duration::from_secs(60),
        &RetryPolicy::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.attempts, 3);
    assert_eq!(err.url, URL);
    assert_eq!(page.calls.load(Ordering::SeqCst), 3);
    // 2s after the first failure, 4s after the second, none after the last.
    assert_eq!(start.elapsed(), Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn succeeds_on_second_attempt() {
    let page = FlakyPage::new(1);
    let start = Instant::now();

    navigate(
        &page,
        URL,
        ReadyCondition::DomContentLoaded,
        Duration::from_secs(30),
        &RetryPolicy::default(),
    )
    .await
    .unwrap();

    assert_eq!(page.calls.load(Ordering::SeqCst), 2);
    assert_eq!(start.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn each_attempt_is_bounded_by_the_timeout() {
    let calls = Arc::new(AtomicU32::new(0));
    let page = HangingPage { calls: calls.clone() };
    let start = Instant::now();

    let err = navigate(
        &page,
        URL,
        ReadyCondition::NetworkIdle,
        Duration::from_secs(5),
        &RetryPolicy::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err.source, BrowserError::Timeout { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(5 * 3 + 2 + 4));
}

#[tokio::test(start_paused = true)]
async fn healthy_page_loads_first_time() {
    let site = FakeSite::new().page(URL, "<html></html>");
    let page = FakePage::new(site.clone());

    navigate(
        &page,
        URL,
        ReadyCondition::NetworkIdle,
        Duration::from_secs(60),
        &RetryPolicy::default(),
    )
    .await
    .unwrap();

    assert_eq!(site.gotos(), vec![URL.to_string()]);
}
