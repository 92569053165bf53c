#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;

use jobboard_ingest::browser::{BrowserSession, Locator, PageHandle, SessionFactory, SessionOptions};
use jobboard_ingest::error::{BrowserError, StorageError};
use jobboard_ingest::models::{JobRecord, Platform};
use jobboard_ingest::navigation::ReadyCondition;
use jobboard_ingest::storage::ObjectStore;

/// Serves canned HTML per URL. Navigation to a URL in `failing` always errors.
#[derive(Clone, Default)]
pub struct FakeSite {
    pages: Arc<HashMap<String, String>>,
    failing: Arc<HashSet<String>>,
    gotos: Arc<Mutex<Vec<String>>>,
    load_more_visible: bool,
    broken_dom: bool,
    clicks: Arc<AtomicUsize>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.into(), html.into());
        self
    }

    pub fn failing(mut self, url: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.failing).insert(url.into());
        self
    }

    /// Every locator reports visible, so load-more buttons never run out.
    pub fn endless_load_more(mut self) -> Self {
        self.load_more_visible = true;
        self
    }

    /// Pages load fine but reading the DOM fails.
    pub fn broken_dom(mut self) -> Self {
        self.broken_dom = true;
        self
    }

    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    pub fn gotos(&self) -> Vec<String> {
        self.gotos.lock().unwrap().clone()
    }
}

pub struct FakePage {
    site: FakeSite,
    current: Mutex<Option<String>>,
}

impl FakePage {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site,
            current: Mutex::new(None),
        }
    }
}

#[async_trait]
impl PageHandle for FakePage {
    async fn goto(&self, url: &str, _ready: ReadyCondition) -> Result<(), BrowserError> {
        self.site.gotos.lock().unwrap().push(url.to_string());
        if self.site.failing.contains(url) {
            return Err(BrowserError::Driver(anyhow!("net::ERR_CONNECTION_RESET")));
        }
        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(())
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
        Ok(self.site.load_more_visible)
    }

    async fn scroll_into_view(&self, _locator: &Locator) -> Result<bool, BrowserError> {
        Ok(self.site.load_more_visible)
    }

    async fn click(&self, _locator: &Locator) -> Result<bool, BrowserError> {
        if self.site.load_more_visible {
            self.site.clicks.fetch_add(1, Ordering::SeqCst);
        }
        Ok(self.site.load_more_visible)
    }

    async fn content(&self) -> Result<String, BrowserError> {
        if self.site.broken_dom {
            return Err(BrowserError::Driver(anyhow!("Execution context was destroyed")));
        }
        let current = self.current.lock().unwrap().clone();
        Ok(current
            .and_then(|url| self.site.pages.get(&url).cloned())
            .unwrap_or_else(|| "<html><body></body></html>".to_string()))
    }
}

pub struct FakeSession {
    page: FakePage,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    fn page(&self) -> &dyn PageHandle {
        &self.page
    }

    async fn close(self: Box<Self>) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
pub struct FakeSessionFactory {
    site: FakeSite,
    refuse: bool,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl FakeSessionFactory {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site,
            ..Self::default()
        }
    }

    /// Every `open` fails, as when the browser binary is missing.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for FakeSessionFactory {
    async fn open(&self, _options: &SessionOptions) -> Result<Box<dyn BrowserSession>, BrowserError> {
        if self.refuse {
            return Err(BrowserError::Driver(anyhow!("could not auto detect a chrome executable")));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            page: FakePage::new(self.site.clone()),
            closed: self.closed.clone(),
        }))
    }
}

/// Accepts lists but rejects every upload.
#[derive(Default)]
pub struct BrokenStore {
    pub puts: AtomicUsize,
}

#[async_trait]
impl ObjectStore for BrokenStore {
    async fn list(&self, _prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(Vec::new())
    }

    async fn put(&self, key: &str, _body: Bytes) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Io {
            key: key.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
        })
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        Err(StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

pub fn kalibrr_card(title: &str, href: &str, company: Option<&str>, location: &str) -> String {
    let company = company
        .map(|c| format!(r#"<a class="k-text-subdued k-font-bold" href="/c/x">{c}</a>"#))
        .unwrap_or_default();
    format!(
        r#"<div class="css-1otdiuc">
             <h2><a itemprop="name" href="{href}">{title}</a></h2>
             {company}
             <span class="k-text-gray-500">{location}</span>
           </div>"#
    )
}

pub fn html_page(cards: &[String]) -> String {
    format!("<html><body><main>{}</main></body></html>", cards.concat())
}

pub fn record(job_id: &str, platform: Platform) -> JobRecord {
    JobRecord {
        job_id: job_id.to_string(),
        job_title: "Data Engineer Intern".to_string(),
        company_name: "PT Contoh".to_string(),
        location: "Jakarta".to_string(),
        job_url: format!("https://example.com/{job_id}"),
        platform,
        scraped_at: "2026-02-27T17:32:37+07:00".to_string(),
    }
}
