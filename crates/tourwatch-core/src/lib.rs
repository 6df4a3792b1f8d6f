pub mod classify;
pub mod config;
pub mod date;
pub mod error;
pub mod outcome;
pub mod probe;

pub use config::{EmailConfig, MonitorConfig};
pub use date::TourDate;
pub use error::{Error, Result};
pub use outcome::CheckOutcome;
pub use probe::{AvailabilityProbe, Notifier};
