use crate::date::TourDate;
use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Tour page the monitor watches.
pub const DEFAULT_TOUR_URL: &str =
    "https://www.hobbitontours.com/experiences/hobbiton-movie-set-tour/";

/// Dates watched when none are given on the command line (DD/MM/YYYY).
pub const DEFAULT_TARGET_DATES: &[&str] = &["13/02/2026", "16/02/2026"];

/// Time between check cycles in continuous mode.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30 * 60);

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP settings for outbound notifications.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Sender address, also the SMTP username.
    pub from: String,
    /// Recipient address. Falls back to the sender when unset.
    pub to: String,
    /// App-specific password for the sender account.
    pub password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl EmailConfig {
    pub fn new(
        from: Option<String>,
        to: Option<String>,
        password: Option<String>,
        smtp_host: String,
        smtp_port: u16,
    ) -> Self {
        let from = from.unwrap_or_default();
        let to = to.filter(|t| !t.is_empty()).unwrap_or_else(|| from.clone());
        Self {
            from,
            to,
            password: password.unwrap_or_default(),
            smtp_host,
            smtp_port,
        }
    }

    /// Whether enough is configured for a send to be attempted at all.
    pub fn is_configured(&self) -> bool {
        !self.from.is_empty() && !self.to.is_empty() && !self.password.is_empty()
    }
}

/// Process-wide configuration, read once at startup and immutable after.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub tour_url: String,
    pub dates: Vec<TourDate>,
    pub check_interval: Duration,
    /// Run exactly one pass and exit (CI mode).
    pub single_pass: bool,
    /// Directory for the log file and diagnostic screenshots.
    pub artifacts_dir: PathBuf,
    pub email: EmailConfig,
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dates.is_empty() {
            return Err(Error::Config("no target dates configured".into()));
        }
        if self.tour_url.is_empty() {
            return Err(Error::Config("tour URL must not be empty".into()));
        }
        if self.check_interval.is_zero() {
            return Err(Error::Config("check interval must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(from: Option<&str>, to: Option<&str>, password: Option<&str>) -> EmailConfig {
        EmailConfig::new(
            from.map(String::from),
            to.map(String::from),
            password.map(String::from),
            DEFAULT_SMTP_HOST.to_string(),
            DEFAULT_SMTP_PORT,
        )
    }

    #[test]
    fn test_recipient_defaults_to_sender() {
        let cfg = email(Some("me@example.com"), None, Some("hunter2"));
        assert_eq!(cfg.to, "me@example.com");
        assert!(cfg.is_configured());
    }

    #[test]
    fn test_empty_recipient_also_falls_back() {
        let cfg = email(Some("me@example.com"), Some(""), Some("hunter2"));
        assert_eq!(cfg.to, "me@example.com");
    }

    #[test]
    fn test_missing_password_is_not_configured() {
        let cfg = email(Some("me@example.com"), None, None);
        assert!(!cfg.is_configured());
    }

    #[test]
    fn test_validate_rejects_empty_dates() {
        let cfg = MonitorConfig {
            tour_url: DEFAULT_TOUR_URL.to_string(),
            dates: vec![],
            check_interval: DEFAULT_CHECK_INTERVAL,
            single_pass: false,
            artifacts_dir: PathBuf::from("."),
            email: email(Some("me@example.com"), None, Some("hunter2")),
        };
        assert!(cfg.validate().is_err());
    }
}
