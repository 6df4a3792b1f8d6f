mod checker;
mod error;
mod launcher;
mod session;

pub use checker::AvailabilityChecker;
pub use error::{Error, Result};
pub use launcher::{ChromeLauncher, ChromeProcess};
pub use session::BrowserSession;
