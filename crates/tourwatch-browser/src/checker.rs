use crate::launcher::ChromeLauncher;
use crate::session::{BrowserSession, PageDriver};
use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tourwatch_core::classify::classify_page_text;
use tourwatch_core::{AvailabilityProbe, CheckOutcome, TourDate};

// Selectors lifted from the live booking page.
const COOKIE_ACCEPT_SELECTOR: &str = ".js-confirm__yes";
const DATE_PICKER_SELECTOR: &str = ".js-datepicker";
const CHECK_BUTTON_SELECTOR: &str = ".c-hero__booking button.js-tour__book-button";

const ELEMENT_WAIT: Duration = Duration::from_secs(20);
const SETTLE_SHORT: Duration = Duration::from_secs(1);
const SETTLE_CLICK: Duration = Duration::from_millis(500);
/// Time for the availability results to render after the search is
/// triggered. The widget fetches slots asynchronously with no completion
/// signal we can observe, so this is a fixed settle.
const SETTLE_RESULTS: Duration = Duration::from_secs(5);

/// Diagnostic screenshot name for a classification, if one is warranted.
/// Sold-out pages are captured as proof; ambiguous pages are captured for
/// debugging the phrase list.
fn diagnostic_screenshot(outcome: &CheckOutcome) -> Option<&'static str> {
    match outcome {
        CheckOutcome::SoldOut => Some("debug_sold_out.png"),
        CheckOutcome::Unknown => Some("debug_last_check.png"),
        CheckOutcome::Available | CheckOutcome::Failed(_) => None,
    }
}

/// Drives one browser session through the booking flow for one date.
pub struct AvailabilityChecker {
    launcher: ChromeLauncher,
    tour_url: String,
    artifacts_dir: PathBuf,
}

impl AvailabilityChecker {
    pub fn new(chrome_path: Option<PathBuf>, tour_url: String, artifacts_dir: PathBuf) -> Self {
        Self {
            launcher: ChromeLauncher::new(chrome_path),
            tour_url,
            artifacts_dir,
        }
    }

    /// Check one target date. Operational failures never propagate; they
    /// come back as [`CheckOutcome::Failed`] so the caller's loop survives.
    pub async fn check(&self, date: &TourDate) -> CheckOutcome {
        let session = match BrowserSession::acquire(&self.launcher).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Could not start browser session: {}", e);
                return CheckOutcome::Failed(e.to_string());
            }
        };

        let outcome = match self.run_check(&session, date).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Error during check for {}: {}", date, e);
                self.capture(&session, "debug_error.png").await;
                CheckOutcome::Failed(e.to_string())
            }
        };

        // Teardown runs on every path, including the failure one above.
        session.close().await;
        outcome
    }

    async fn run_check<S: PageDriver>(
        &self,
        session: &S,
        date: &TourDate,
    ) -> Result<CheckOutcome> {
        tracing::info!("Navigating to {}", self.tour_url);
        session.goto(&self.tour_url).await?;

        // Dismiss the cookie banner if it shows up; its absence is normal
        // on a warm profile and not an error.
        match session.wait_for(COOKIE_ACCEPT_SELECTOR, ELEMENT_WAIT).await {
            Ok(()) => {
                session.click_via_js(COOKIE_ACCEPT_SELECTOR).await.ok();
                tracing::info!("Accepted cookies");
                tokio::time::sleep(SETTLE_SHORT).await;
            }
            Err(_) => tracing::info!("No cookie banner found or already accepted"),
        }

        // The booking widget sits below the fold.
        session.eval("window.scrollTo(0, 500)").await?;
        tokio::time::sleep(SETTLE_SHORT).await;

        tracing::info!("Attempting to select date: {}", date.site_format());
        if !self.inject_date(session, date).await? {
            tracing::error!("Could not find date picker element");
            self.capture(session, "debug_failed_datepicker.png").await;
            return Ok(CheckOutcome::Failed("date picker element not found".into()));
        }
        tokio::time::sleep(SETTLE_SHORT).await;

        // The button can disappear between the wait and the click (the
        // widget re-renders), so the click result is checked too.
        let clicked = if session
            .wait_for(CHECK_BUTTON_SELECTOR, ELEMENT_WAIT)
            .await
            .is_ok()
        {
            session.scroll_to_center(CHECK_BUTTON_SELECTOR).await?;
            tokio::time::sleep(SETTLE_CLICK).await;
            session.click_via_js(CHECK_BUTTON_SELECTOR).await?
        } else {
            false
        };
        if !clicked {
            tracing::error!("Could not find Check Availability button");
            self.capture(session, "debug_no_button.png").await;
            return Ok(CheckOutcome::Failed(
                "check availability button not found".into(),
            ));
        }
        tracing::info!("Clicked Check Availability button");

        tokio::time::sleep(SETTLE_RESULTS).await;

        let text = session.page_text().await?.to_lowercase();
        let outcome = classify_page_text(&text);

        match &outcome {
            CheckOutcome::Available => {
                tracing::info!("Status: POTENTIAL AVAILABILITY FOUND for {}!", date);
            }
            CheckOutcome::SoldOut => tracing::info!("Status: SOLD OUT for {}", date),
            CheckOutcome::Unknown => {
                tracing::warn!(
                    "Status: unsure for {}. Page content ambiguous, see debug_last_check.png",
                    date
                );
            }
            // The classifier never yields Failed; that arm belongs to the
            // error path in check().
            CheckOutcome::Failed(_) => {}
        }
        if let Some(name) = diagnostic_screenshot(&outcome) {
            self.capture(session, name).await;
        }

        Ok(outcome)
    }

    /// Set the date field directly and fire the events the site's own
    /// handlers listen for. UI interaction with the date picker is flaky;
    /// writing the value is not.
    async fn inject_date<S: PageDriver>(&self, session: &S, date: &TourDate) -> Result<bool> {
        let js = format!(
            "(() => {{ \
             const dateInput = document.querySelector('{}'); \
             if (!dateInput) return false; \
             dateInput.value = '{}'; \
             dateInput.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             dateInput.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             return true; }})()",
            DATE_PICKER_SELECTOR,
            date.site_format()
        );
        session.eval_bool(&js).await
    }

    /// Best-effort diagnostic screenshot under a fixed name, overwritten
    /// on each occurrence.
    async fn capture<S: PageDriver>(&self, session: &S, name: &str) {
        let path = self.artifacts_dir.join(name);
        if let Err(e) = session.screenshot(&path).await {
            tracing::debug!("Could not write screenshot {}: {}", path.display(), e);
        }
    }
}

#[async_trait]
impl AvailabilityProbe for AvailabilityChecker {
    async fn check(&self, date: &TourDate) -> CheckOutcome {
        AvailabilityChecker::check(self, date).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::path::Path;
    use std::sync::Mutex;

    #[test]
    fn test_diagnostic_screenshot_mapping() {
        assert_eq!(
            diagnostic_screenshot(&CheckOutcome::SoldOut),
            Some("debug_sold_out.png")
        );
        assert_eq!(
            diagnostic_screenshot(&CheckOutcome::Unknown),
            Some("debug_last_check.png")
        );
        assert_eq!(diagnostic_screenshot(&CheckOutcome::Available), None);
        assert_eq!(
            diagnostic_screenshot(&CheckOutcome::Failed("boom".into())),
            None
        );
    }

    /// Scripted stand-in for a live session.
    struct StubDriver {
        cookie_present: bool,
        date_inject_ok: bool,
        click_ok: bool,
        text: String,
        screenshots: Mutex<Vec<String>>,
    }

    impl StubDriver {
        fn with_text(text: &str) -> Self {
            Self {
                cookie_present: true,
                date_inject_ok: true,
                click_ok: true,
                text: text.to_string(),
                screenshots: Mutex::new(Vec::new()),
            }
        }

        fn captured(&self) -> Vec<String> {
            self.screenshots.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageDriver for StubDriver {
        async fn goto(&self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
            if selector == COOKIE_ACCEPT_SELECTOR && !self.cookie_present {
                return Err(Error::WaitTimeout {
                    selector: selector.to_string(),
                    seconds: timeout.as_secs(),
                });
            }
            Ok(())
        }

        async fn eval(&self, _expression: &str) -> Result<()> {
            Ok(())
        }

        async fn eval_bool(&self, _expression: &str) -> Result<bool> {
            Ok(self.date_inject_ok)
        }

        async fn scroll_to_center(&self, _selector: &str) -> Result<()> {
            Ok(())
        }

        async fn click_via_js(&self, selector: &str) -> Result<bool> {
            if selector == CHECK_BUTTON_SELECTOR {
                return Ok(self.click_ok);
            }
            Ok(true)
        }

        async fn page_text(&self) -> Result<String> {
            Ok(self.text.clone())
        }

        async fn screenshot(&self, path: &Path) -> Result<()> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.screenshots.lock().unwrap().push(name);
            Ok(())
        }
    }

    fn checker() -> AvailabilityChecker {
        AvailabilityChecker::new(
            None,
            "https://tours.example.com/".to_string(),
            PathBuf::from("artifacts"),
        )
    }

    fn date() -> TourDate {
        TourDate::parse("13/02/2026").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_sold_out_page_is_captured() {
        // Mixed case: the checker lowercases before classifying.
        let driver = StubDriver::with_text("Hobbiton Movie Set Tour - Fully Booked");

        let outcome = checker().run_check(&driver, &date()).await.unwrap();

        assert_eq!(outcome, CheckOutcome::SoldOut);
        assert_eq!(driver.captured(), vec!["debug_sold_out.png"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ambiguous_page_triggers_diagnostic_capture() {
        let driver = StubDriver::with_text("welcome to our tours");

        let outcome = checker().run_check(&driver, &date()).await.unwrap();

        assert_eq!(outcome, CheckOutcome::Unknown);
        assert_eq!(driver.captured(), vec!["debug_last_check.png"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_available_page_takes_no_screenshot() {
        let driver = StubDriver::with_text("select a time-slot ... book now");

        let outcome = checker().run_check(&driver, &date()).await.unwrap();

        assert_eq!(outcome, CheckOutcome::Available);
        assert!(driver.captured().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_cookie_banner_is_not_an_error() {
        let mut driver = StubDriver::with_text("select a time-slot ... book now");
        driver.cookie_present = false;

        let outcome = checker().run_check(&driver, &date()).await.unwrap();

        assert_eq!(outcome, CheckOutcome::Available);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_date_picker_fails_with_capture() {
        let mut driver = StubDriver::with_text("irrelevant");
        driver.date_inject_ok = false;

        let outcome = checker().run_check(&driver, &date()).await.unwrap();

        assert!(matches!(outcome, CheckOutcome::Failed(_)));
        assert_eq!(driver.captured(), vec!["debug_failed_datepicker.png"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_vanished_button_fails_with_capture() {
        // The button is present for the wait but the click reports false.
        let mut driver = StubDriver::with_text("irrelevant");
        driver.click_ok = false;

        let outcome = checker().run_check(&driver, &date()).await.unwrap();

        assert!(matches!(outcome, CheckOutcome::Failed(_)));
        assert_eq!(driver.captured(), vec!["debug_no_button.png"]);
    }
}
