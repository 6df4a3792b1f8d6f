use crate::launcher::{ChromeLauncher, ChromeProcess};
use crate::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::element::Element;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

const CONNECT_RETRIES: usize = 5;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(500);
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One headless Chrome session, exclusively owned by a single check.
///
/// Construction launches a fresh Chrome and attaches over CDP; [`close`]
/// tears everything down. There is no reuse across dates or cycles.
///
/// [`close`]: BrowserSession::close
pub struct BrowserSession {
    chrome: ChromeProcess,
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch Chrome and attach to it.
    pub async fn acquire(launcher: &ChromeLauncher) -> Result<Self> {
        let chrome = launcher.launch()?;
        let debugging_port = chrome.debugging_port();

        // Chrome may not be accepting CDP connections immediately after
        // spawn, so connect with bounded retries.
        let ws_url = format!("http://localhost:{}", debugging_port);
        let (browser, mut handler) = {
            let mut retries = CONNECT_RETRIES;
            loop {
                tracing::debug!("Attempting CDP connection to {}...", ws_url);
                match Browser::connect(&ws_url).await {
                    Ok(result) => {
                        tracing::debug!("CDP connection established");
                        break result;
                    }
                    Err(e) => {
                        retries -= 1;
                        if retries == 0 {
                            return Err(Error::Cdp(format!(
                                "Failed to connect to Chrome after {} attempts: {}",
                                CONNECT_RETRIES, e
                            )));
                        }
                        tracing::debug!(
                            "CDP connection attempt failed, retrying... ({} left)",
                            retries
                        );
                        tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                    }
                }
            }
        };

        // The handler must be polled for any browser command to complete.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        // Give Chrome a moment to create its initial tab.
        tokio::time::sleep(Duration::from_millis(500)).await;

        let page = if let Some(page) = browser.pages().await?.first() {
            page.clone()
        } else {
            browser.new_page("about:blank").await?
        };

        Ok(Self {
            chrome,
            browser,
            page,
            handler_task,
        })
    }

    /// Navigate and wait for the load to settle.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    /// Poll for an element until it appears or the timeout elapses.
    pub async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Element> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                return Ok(element);
            }
            if Instant::now() >= deadline {
                return Err(Error::WaitTimeout {
                    selector: selector.to_string(),
                    seconds: timeout.as_secs(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Run a JS expression, discarding its value.
    pub async fn eval(&self, expression: &str) -> Result<()> {
        self.page.evaluate(expression).await?;
        Ok(())
    }

    /// Run a JS expression that yields a boolean.
    pub async fn eval_bool(&self, expression: &str) -> Result<bool> {
        let result = self.page.evaluate(expression).await?;
        Ok(result.into_value::<bool>()?)
    }

    /// Scroll an element to the center of the viewport.
    pub async fn scroll_to_center(&self, selector: &str) -> Result<()> {
        let js = format!(
            "(() => {{ const el = document.querySelector('{}'); \
             if (el) el.scrollIntoView({{ block: 'center' }}); }})()",
            selector
        );
        self.eval(&js).await
    }

    /// Click an element programmatically. A synthetic `.click()` is immune
    /// to sticky headers and overlays that block a trusted pointer click.
    pub async fn click_via_js(&self, selector: &str) -> Result<bool> {
        let js = format!(
            "(() => {{ const el = document.querySelector('{}'); \
             if (!el) return false; el.click(); return true; }})()",
            selector
        );
        self.eval_bool(&js).await
    }

    /// Rendered text content of the page body.
    pub async fn page_text(&self) -> Result<String> {
        let result = self.page.evaluate("document.body.innerText").await?;
        Ok(result.into_value::<String>()?)
    }

    /// Write a PNG screenshot of the current viewport.
    pub async fn screenshot(&self, path: &Path) -> Result<()> {
        self.page
            .save_screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .build(),
                path,
            )
            .await?;
        Ok(())
    }

    /// Unconditional teardown: close the browser target, stop the CDP
    /// handler, kill Chrome, remove the throwaway profile.
    pub async fn close(mut self) {
        let _ = self.browser.close().await;
        self.handler_task.abort();
        self.chrome.kill();
    }
}

/// The session surface the availability checker drives. Seam so the check
/// sequence can be exercised without a live Chrome.
#[async_trait]
pub(crate) trait PageDriver {
    async fn goto(&self, url: &str) -> Result<()>;
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;
    async fn eval(&self, expression: &str) -> Result<()>;
    async fn eval_bool(&self, expression: &str) -> Result<bool>;
    async fn scroll_to_center(&self, selector: &str) -> Result<()>;
    async fn click_via_js(&self, selector: &str) -> Result<bool>;
    async fn page_text(&self) -> Result<String>;
    async fn screenshot(&self, path: &Path) -> Result<()>;
}

#[async_trait]
impl PageDriver for BrowserSession {
    async fn goto(&self, url: &str) -> Result<()> {
        BrowserSession::goto(self, url).await
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        BrowserSession::wait_for(self, selector, timeout)
            .await
            .map(|_| ())
    }

    async fn eval(&self, expression: &str) -> Result<()> {
        BrowserSession::eval(self, expression).await
    }

    async fn eval_bool(&self, expression: &str) -> Result<bool> {
        BrowserSession::eval_bool(self, expression).await
    }

    async fn scroll_to_center(&self, selector: &str) -> Result<()> {
        BrowserSession::scroll_to_center(self, selector).await
    }

    async fn click_via_js(&self, selector: &str) -> Result<bool> {
        BrowserSession::click_via_js(self, selector).await
    }

    async fn page_text(&self) -> Result<String> {
        BrowserSession::page_text(self).await
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        BrowserSession::screenshot(self, path).await
    }
}
