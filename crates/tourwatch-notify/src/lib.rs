mod error;
mod mailer;

pub use error::{Error, Result};
pub use mailer::SmtpMailer;
