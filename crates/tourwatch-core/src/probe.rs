//! Seams between the scheduler and its effectful collaborators.

use crate::date::TourDate;
use crate::outcome::CheckOutcome;
use async_trait::async_trait;

/// Checks one target date against the booking site.
///
/// Implementations never return an error: operational failures are folded
/// into [`CheckOutcome::Failed`] so the scheduling loop stays alive.
#[async_trait]
pub trait AvailabilityProbe {
    async fn check(&self, date: &TourDate) -> CheckOutcome;
}

/// Delivers a notification. Returns whether the send succeeded; transport
/// failures are the implementation's to log, never the caller's to handle.
#[async_trait]
pub trait Notifier {
    async fn notify(&self, subject: &str, body: &str) -> bool;
}
