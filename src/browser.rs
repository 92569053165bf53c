//! Stealth browser sessions and the page handle every adapter drives.
//!
//! `headless_chrome` is synchronous, so each driver call is pushed onto the
//! blocking pool and awaited. The pipeline itself stays on one cooperative
//! task and yields while Chrome works.

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::browser::tab::{RequestInterceptor, RequestPausedDecision};
use headless_chrome::browser::transport::{SessionId, Transport};
use headless_chrome::protocol::cdp::Fetch::events::RequestPausedEvent;
use headless_chrome::protocol::cdp::Fetch::{FailRequest, RequestPattern, RequestStage};
use headless_chrome::protocol::cdp::Emulation;
use headless_chrome::protocol::cdp::Network::ErrorReason;
use headless_chrome::{Browser, LaunchOptions, Tab};
use rand::prelude::IndexedRandom;
use tracing::{debug, warn};

use crate::error::BrowserError;
use crate::navigation::ReadyCondition;

const ACCEPT_LANGUAGE: &str = "id-ID,id;q=0.9,en-US;q=0.8,en;q=0.7";
const READY_POLL: Duration = Duration::from_millis(250);
const NETWORK_QUIET: Duration = Duration::from_millis(500);
const DRAIN_RESOURCES_SCRIPT: &str = "(() => { \
    const n = performance.getEntriesByType('resource').length; \
    performance.clearResourceTimings(); \
    return n; })()";

const BLOCKED_HOSTS: [&str; 7] = [
    "doubleclick.net",
    "googlesyndication.com",
    "google-analytics.com",
    "googletagmanager.com",
    "adsystem.com",
    "ads.yahoo.com",
    "adservice.google.com",
];

const BLOCKED_EXTENSIONS: [&str; 7] = [".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".ico"];

/// A realistic device fingerprint. Every field of one profile describes the
/// same device, so user agent, viewport and touch support never disagree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    pub name: &'static str,
    pub user_agent: &'static str,
    /// Value exposed as `navigator.platform`.
    pub platform: &'static str,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub device_scale_factor: f64,
    pub is_mobile: bool,
    pub has_touch: bool,
}

pub static DEVICE_PROFILES: [DeviceProfile; 5] = [
    DeviceProfile {
        name: "windows_chrome_fhd",
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        platform: "Win32",
        viewport_width: 1920,
        viewport_height: 1080,
        device_scale_factor: 1.0,
        is_mobile: false,
        has_touch: false,
    },
    DeviceProfile {
        name: "macbook_chrome",
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        platform: "MacIntel",
        viewport_width: 1440,
        viewport_height: 900,
        device_scale_factor: 2.0,
        is_mobile: false,
        has_touch: false,
    },
    DeviceProfile {
        name: "windows_edge_laptop",
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36 Edg/130.0.0.0",
        platform: "Win32",
        viewport_width: 1366,
        viewport_height: 768,
        device_scale_factor: 1.0,
        is_mobile: false,
        has_touch: false,
    },
    DeviceProfile {
        name: "pixel_7",
        user_agent: "Mozilla/5.0 (Linux; Android 14; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Mobile Safari/537.36",
        platform: "Linux armv8l",
        viewport_width: 412,
        viewport_height: 915,
        device_scale_factor: 2.625,
        is_mobile: true,
        has_touch: true,
    },
    DeviceProfile {
        name: "galaxy_tab_s8",
        user_agent: "Mozilla/5.0 (Linux; Android 13; SM-X700) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
        platform: "Linux armv8l",
        viewport_width: 800,
        viewport_height: 1280,
        device_scale_factor: 2.0,
        is_mobile: false,
        has_touch: true,
    },
];

pub fn random_profile() -> &'static DeviceProfile {
    DEVICE_PROFILES
        .choose(&mut rand::rng())
        .unwrap_or(&DEVICE_PROFILES[0])
}

/// Whether a request should be aborted when resource blocking is on: ad and
/// analytics hosts, and image files.
pub fn should_block(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    if BLOCKED_HOSTS.iter().any(|host| lower.contains(host)) {
        return true;
    }

    let path = lower.split(['?', '#']).next().unwrap_or_default();
    BLOCKED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub headless: bool,
    pub block_resources: bool,
    pub profile: &'static DeviceProfile,
}

impl SessionOptions {
    pub fn new(headless: bool, block_resources: bool) -> Self {
        Self {
            headless,
            block_resources,
            profile: random_profile(),
        }
    }
}

/// An element lookup, optionally narrowed to elements whose text contains
/// `has_text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator {
    pub css: &'static str,
    pub has_text: Option<&'static str>,
}

impl Locator {
    pub const fn css(css: &'static str) -> Self {
        Self { css, has_text: None }
    }

    pub const fn with_text(self, text: &'static str) -> Self {
        Self {
            css: self.css,
            has_text: Some(text),
        }
    }

    /// Builds a script that finds the first match, runs `action` with the
    /// element bound to `el`, and evaluates to `false` when nothing matched.
    fn script(&self, action: &str) -> String {
        let css = serde_json::Value::from(self.css);
        let text = self
            .has_text
            .map(serde_json::Value::from)
            .unwrap_or(serde_json::Value::Null);
        format!(
            "(() => {{ \
               const text = {text}; \
               const el = Array.from(document.querySelectorAll({css})) \
                 .find(n => text === null || (n.textContent || '').includes(text)); \
               if (!el) return false; \
               {action} \
             }})()"
        )
    }
}

/// Everything an adapter may do to a loaded page.
#[async_trait]
pub trait PageHandle: Send + Sync {
    async fn goto(&self, url: &str, ready: ReadyCondition) -> Result<(), BrowserError>;

    async fn wait_for_selector(&self, css: &str, timeout: Duration) -> Result<(), BrowserError>;

    async fn evaluate(&self, script: &str) -> Result<(), BrowserError>;

    async fn press_key(&self, key: &str) -> Result<(), BrowserError>;

    async fn is_visible(&self, locator: &Locator) -> Result<bool, BrowserError>;

    async fn scroll_into_view(&self, locator: &Locator) -> Result<bool, BrowserError>;

    async fn click(&self, locator: &Locator) -> Result<bool, BrowserError>;

    /// Serialized DOM of the page as it is right now.
    async fn content(&self) -> Result<String, BrowserError>;
}

#[async_trait]
pub trait BrowserSession: Send + Sync {
    fn page(&self) -> &dyn PageHandle;

    /// Releases the page, context and browser process. Never fails; teardown
    /// problems are logged.
    async fn close(self: Box<Self>);
}

#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self, options: &SessionOptions) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

pub struct ChromeSessionFactory {
    default_timeout: Duration,
}

impl ChromeSessionFactory {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }
}

impl Default for ChromeSessionFactory {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    async fn open(&self, options: &SessionOptions) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let options = *options;
        let default_timeout = self.default_timeout;
        let session = tokio::task::spawn_blocking(move || launch(&options, default_timeout)).await??;
        debug!(
            profile = options.profile.name,
            block_resources = options.block_resources,
            "browser session opened"
        );
        Ok(Box::new(session))
    }
}

fn launch(options: &SessionOptions, default_timeout: Duration) -> anyhow::Result<ChromeSession> {
    let profile = options.profile;
    let mut args = vec![
        OsString::from("--disable-blink-features=AutomationControlled"),
        OsString::from(format!("--user-agent={}", profile.user_agent)),
        OsString::from(format!(
            "--force-device-scale-factor={}",
            profile.device_scale_factor
        )),
        OsString::from("--lang=id-ID"),
    ];
    if profile.has_touch {
        args.push(OsString::from("--touch-events=enabled"));
    }

    let browser = Browser::new(LaunchOptions {
        headless: options.headless,
        window_size: Some((profile.viewport_width, profile.viewport_height)),
        args: args.iter().map(|arg| arg.as_os_str()).collect(),
        ..Default::default()
    })?;

    let tab = browser.new_tab()?;
    tab.set_default_timeout(default_timeout);
    tab.set_user_agent(profile.user_agent, Some(ACCEPT_LANGUAGE), Some(profile.platform))?;
    tab.enable_stealth_mode()?;
    emulate_device(&tab, profile)?;

    if options.block_resources {
        install_resource_blocking(&tab)?;
    }

    Ok(ChromeSession {
        page: ChromePage { tab },
        browser,
    })
}

/// The window size alone leaves the page seeing a desktop; the viewport,
/// mobile flag and touch points have to be overridden to match the profile.
fn emulate_device(tab: &Tab, profile: &DeviceProfile) -> anyhow::Result<()> {
    tab.call_method(device_metrics(profile))?;
    if profile.has_touch {
        tab.call_method(Emulation::SetTouchEmulationEnabled {
            enabled: true,
            max_touch_points: Some(5),
        })?;
    }
    Ok(())
}

fn device_metrics(profile: &DeviceProfile) -> Emulation::SetDeviceMetricsOverride {
    Emulation::SetDeviceMetricsOverride {
        width: profile.viewport_width,
        height: profile.viewport_height,
        device_scale_factor: profile.device_scale_factor,
        mobile: profile.is_mobile,
        scale: None,
        screen_width: Some(profile.viewport_width),
        screen_height: Some(profile.viewport_height),
        position_x: None,
        position_y: None,
        dont_set_visible_size: None,
        screen_orientation: None,
        viewport: None,
        display_feature: None,
        device_posture: None,
    }
}

fn install_resource_blocking(tab: &Arc<Tab>) -> anyhow::Result<()> {
    let patterns = [RequestPattern {
        url_pattern: Some("*".to_string()),
        resource_Type: None,
        request_stage: Some(RequestStage::Request),
    }];
    tab.enable_fetch(Some(&patterns), None)?;

    let interceptor: Arc<dyn RequestInterceptor + Send + Sync> = Arc::new(
        |_transport: Arc<Transport>, _session_id: SessionId, event: RequestPausedEvent| {
            if should_block(&event.params.request.url) {
                RequestPausedDecision::Fail(FailRequest {
                    request_id: event.params.request_id,
                    error_reason: ErrorReason::BlockedByClient,
                })
            } else {
                RequestPausedDecision::Continue(None)
            }
        },
    );
    tab.enable_request_interception(interceptor)?;
    Ok(())
}

fn is_ready(ready: ReadyCondition, state: Option<&str>) -> bool {
    match (ready, state) {
        (_, Some("complete")) => true,
        (ReadyCondition::DomContentLoaded, Some("interactive")) => true,
        _ => false,
    }
}

pub struct ChromeSession {
    page: ChromePage,
    // Dropping the browser kills the Chrome process.
    browser: Browser,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    fn page(&self) -> &dyn PageHandle {
        &self.page
    }

    async fn close(self: Box<Self>) {
        let ChromeSession { page, browser } = *self;
        let closed = tokio::task::spawn_blocking(move || {
            if let Err(e) = page.tab.close(true) {
                debug!("tab close failed: {e}");
            }
            drop(browser);
        })
        .await;

        if let Err(e) = closed {
            warn!("browser teardown task failed: {e}");
        }
    }
}

pub struct ChromePage {
    tab: Arc<Tab>,
}

impl ChromePage {
    async fn with_tab<T, F>(&self, f: F) -> Result<T, BrowserError>
    where
        F: FnOnce(&Tab) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        let value = tokio::task::spawn_blocking(move || f(&tab)).await??;
        Ok(value)
    }

    async fn eval_value(&self, script: String) -> Result<Option<serde_json::Value>, BrowserError> {
        self.with_tab(move |tab| Ok(tab.evaluate(&script, false)?.value))
            .await
    }

    async fn eval_bool(&self, script: String) -> Result<bool, BrowserError> {
        let value = self.eval_value(script).await?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    async fn ready_state(&self) -> Result<Option<String>, BrowserError> {
        let value = self.eval_value("document.readyState".to_string()).await?;
        Ok(value.and_then(|v| v.as_str().map(str::to_owned)))
    }

    /// Resource entries recorded since the previous call. The timing buffer
    /// is cleared each time so it never fills up and stops counting.
    async fn drain_resource_count(&self) -> Result<u64, BrowserError> {
        let value = self
            .eval_value(DRAIN_RESOURCES_SCRIPT.to_string())
            .await?;
        Ok(value.and_then(|v| v.as_u64()).unwrap_or(0))
    }
}

#[async_trait]
impl PageHandle for ChromePage {
    async fn goto(&self, url: &str, ready: ReadyCondition) -> Result<(), BrowserError> {
        let url = url.to_string();
        self.with_tab(move |tab| {
            tab.navigate_to(&url)?;
            Ok(())
        })
        .await?;

        // Poll errors while the new document commits count as "not ready";
        // the caller's per-attempt timeout bounds the wait.
        loop {
            let state = match self.ready_state().await {
                Ok(state) => state,
                Err(e) => {
                    debug!("readyState poll failed, retrying: {e}");
                    None
                }
            };
            if is_ready(ready, state.as_deref()) {
                break;
            }
            tokio::time::sleep(READY_POLL).await;
        }

        // Network idle: no new resource entries across a quiet window.
        if ready == ReadyCondition::NetworkIdle {
            self.drain_resource_count().await.ok();
            loop {
                tokio::time::sleep(NETWORK_QUIET).await;
                match self.drain_resource_count().await {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) => debug!("resource poll failed, retrying: {e}"),
                }
            }
        }

        Ok(())
    }

    async fn wait_for_selector(&self, css: &str, timeout: Duration) -> Result<(), BrowserError> {
        let css = css.to_string();
        self.with_tab(move |tab| {
            tab.wait_for_element_with_custom_timeout(&css, timeout)?;
            Ok(())
        })
        .await
    }

    async fn evaluate(&self, script: &str) -> Result<(), BrowserError> {
        self.eval_value(script.to_string()).await.map(|_| ())
    }

    async fn press_key(&self, key: &str) -> Result<(), BrowserError> {
        let key = key.to_string();
        self.with_tab(move |tab| {
            tab.press_key(&key)?;
            Ok(())
        })
        .await
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, BrowserError> {
        self.eval_bool(locator.script(
            "const r = el.getBoundingClientRect(); \
             return r.width > 0 && r.height > 0 && getComputedStyle(el).visibility !== 'hidden';",
        ))
        .await
    }

    async fn scroll_into_view(&self, locator: &Locator) -> Result<bool, BrowserError> {
        self.eval_bool(locator.script(
            "el.scrollIntoView({ block: 'center', behavior: 'smooth' }); return true;",
        ))
        .await
    }

    async fn click(&self, locator: &Locator) -> Result<bool, BrowserError> {
        self.eval_bool(locator.script("el.click(); return true;"))
            .await
    }

    async fn content(&self) -> Result<String, BrowserError> {
        self.with_tab(|tab| tab.get_content()).await
    }
}
