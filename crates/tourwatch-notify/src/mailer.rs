use crate::Result;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tourwatch_core::config::EmailConfig;
use tourwatch_core::Notifier;

/// Sentinel left in place by the example configuration. A credential still
/// carrying it means the user never set a real password.
const PASSWORD_PLACEHOLDER: &str = "YOUR_APP_PASSWORD";

/// Plain-text email notifications over SMTP with STARTTLS.
///
/// The sender address doubles as the SMTP username. A fresh connection is
/// opened per send; notifications are rare enough that pooling buys nothing.
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send a notification, reporting success as a boolean. Transport
    /// failures are logged here and never surface to the scheduling loop.
    pub async fn notify(&self, subject: &str, body: &str) -> bool {
        if !self.is_sendable() {
            tracing::error!("Cannot send email: email password not configured.");
            return false;
        }

        match self.send(subject, body).await {
            Ok(()) => {
                tracing::info!("Email notification sent successfully to {}", self.config.to);
                true
            }
            Err(e) => {
                tracing::error!("Failed to send email: {}", e);
                false
            }
        }
    }

    /// Missing or placeholder credentials fail fast, before any network
    /// connection is attempted.
    fn is_sendable(&self) -> bool {
        self.config.is_configured() && !self.config.password.contains(PASSWORD_PLACEHOLDER)
    }

    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.config.from.parse()?)
            .to(self.config.to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(
            &self.config.smtp_host,
        )?
        .port(self.config.smtp_port)
        .credentials(Credentials::new(
            self.config.from.clone(),
            self.config.password.clone(),
        ))
        .build();

        transport.send(message).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpMailer {
    async fn notify(&self, subject: &str, body: &str) -> bool {
        SmtpMailer::notify(self, subject, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer(password: &str) -> SmtpMailer {
        SmtpMailer::new(EmailConfig::new(
            Some("sender@example.com".to_string()),
            None,
            Some(password.to_string()),
            "smtp.example.com".to_string(),
            587,
        ))
    }

    #[tokio::test]
    async fn test_notify_with_empty_password_fails_without_network() {
        // smtp.example.com does not resolve to a real relay; reaching the
        // network would hang or error differently. The guard must return
        // false before any connection is attempted.
        let mailer = mailer("");
        assert!(!mailer.notify("subject", "body").await);
    }

    #[tokio::test]
    async fn test_notify_with_placeholder_password_fails_without_network() {
        let mailer = mailer("YOUR_APP_PASSWORD");
        assert!(!mailer.notify("subject", "body").await);
    }

    #[test]
    fn test_real_looking_password_is_sendable() {
        assert!(mailer("abcd efgh ijkl mnop").is_sendable());
    }
}
