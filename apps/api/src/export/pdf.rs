//! PDF export via headless Chromium.
//!
//! `BoundedRenderer` caps the number of prints in flight with a semaphore
//! and applies the timeout. The permit moves into the blocking task, so a
//! print that outlives its timeout still counts against the cap until it
//! actually finishes. `ChromeEngine` shares one browser process across
//! prints and relaunches it after a failure.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use headless_chrome::protocol::cdp::Emulation;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::PdfConfig;

/// A4 in inches (Chromium's print units).
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;

/// Carried in `AppState` as `Arc<dyn PdfRenderer>`.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>>;
}

/// A synchronous HTML-to-PDF backend, run on the blocking pool.
pub trait PdfEngine: Send + Sync + 'static {
    fn print(&self, html: &str) -> Result<Vec<u8>>;
}

/// Runs a `PdfEngine` with at most `max_concurrency` prints in flight and a
/// per-request timeout.
pub struct BoundedRenderer<E> {
    engine: Arc<E>,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl<E: PdfEngine> BoundedRenderer<E> {
    pub fn new(engine: E, max_concurrency: usize, timeout: Duration) -> Self {
        BoundedRenderer {
            engine: Arc::new(engine),
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
            timeout,
        }
    }
}

#[async_trait]
impl<E: PdfEngine> PdfRenderer for BoundedRenderer<E> {
    async fn render(&self, html: &str) -> Result<Vec<u8>> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .context("PDF renderer is shutting down")?;

        let html = html.to_string();
        let engine = self.engine.clone();
        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            engine.print(&html)
        });

        match tokio::time::timeout(self.timeout, task).await {
            Ok(joined) => joined.context("PDF render task panicked")?,
            Err(_) => Err(anyhow!(
                "PDF render timed out after {}ms",
                self.timeout.as_millis()
            )),
        }
    }
}

/// Headless Chromium with one browser shared by all prints.
pub struct ChromeEngine {
    config: PdfConfig,
    browser: Mutex<Option<Browser>>,
}

pub type ChromePdfRenderer = BoundedRenderer<ChromeEngine>;

impl ChromeEngine {
    pub fn new(config: PdfConfig) -> Self {
        ChromeEngine {
            config,
            browser: Mutex::new(None),
        }
    }
}

impl ChromePdfRenderer {
    pub fn chrome(config: PdfConfig) -> Self {
        let (max_concurrency, timeout) = (config.max_concurrency, config.timeout);
        BoundedRenderer::new(ChromeEngine::new(config), max_concurrency, timeout)
    }
}

impl PdfEngine for ChromeEngine {
    fn print(&self, html: &str) -> Result<Vec<u8>> {
        let result = print_with_shared_browser(&self.browser, &self.config, html);
        if result.is_err() {
            // Drop the browser so the next request starts a fresh one.
            if let Ok(mut slot) = self.browser.lock() {
                *slot = None;
            }
        }
        result
    }
}

fn launch(config: &PdfConfig) -> Result<Browser> {
    let options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(config.sandbox)
        .path(config.chrome_path.clone())
        .idle_browser_timeout(Duration::from_secs(3600))
        .build()
        .map_err(|e| anyhow!("invalid browser launch options: {e}"))?;
    let browser = Browser::new(options).context("failed to launch headless browser")?;
    info!("Launched headless browser for PDF export");
    Ok(browser)
}

fn print_with_shared_browser(
    slot: &Mutex<Option<Browser>>,
    config: &PdfConfig,
    html: &str,
) -> Result<Vec<u8>> {
    let browser = {
        let mut guard = slot
            .lock()
            .map_err(|_| anyhow!("browser handle lock poisoned"))?;
        match guard.as_ref() {
            Some(browser) => browser.clone(),
            None => {
                let browser = launch(config)?;
                *guard = Some(browser.clone());
                browser
            }
        }
    };

    // Chromium loads the page from disk; image URLs in it stay absolute.
    let mut page = tempfile::Builder::new()
        .prefix("letter-")
        .suffix(".html")
        .tempfile()
        .context("failed to create temporary HTML file")?;
    page.write_all(html.as_bytes())?;
    page.flush()?;
    let url = format!("file://{}", page.path().display());

    let tab = browser.new_tab().context("failed to open browser tab")?;
    tab.set_default_timeout(config.timeout);
    // Letter pages never run scripts.
    let printed = tab
        .call_method(Emulation::SetScriptExecutionDisabled { value: true })
        .and_then(|_| tab.navigate_to(&url))
        .and_then(|tab| tab.wait_until_navigated())
        .and_then(|tab| {
            tab.print_to_pdf(Some(PrintToPdfOptions {
                print_background: Some(true),
                paper_width: Some(A4_WIDTH_IN),
                paper_height: Some(A4_HEIGHT_IN),
                ..Default::default()
            }))
        });
    if let Err(e) = tab.close(true) {
        warn!("Failed to close browser tab: {e}");
    }

    let pdf = printed.context("failed to print page to PDF")?;
    info!("Rendered PDF ({} bytes)", pdf.len());
    Ok(pdf)
}
