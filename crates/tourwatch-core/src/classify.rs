//! Page-text classification heuristics.
//!
//! The booking site renders availability as free-form copy, not structured
//! markup, so classification is best-effort substring matching against the
//! phrases the site is known to use. Sold-out phrases are checked first:
//! a "fully booked" page still contains the word "select" in its header, so
//! the negative patterns must win any overlap.

use crate::outcome::CheckOutcome;

/// Phrases that mark a date as sold out.
const SOLD_OUT_PHRASES: &[&str] = &[
    "fully booked",
    "no availability",
    "we do not have any tours available",
];

/// Affirmative phrases that suggest bookable slots.
const AFFIRMATIVE_PHRASES: &[&str] = &["select", "book now"];

/// Corroborating signals required alongside an affirmative phrase.
/// "select"/"book now" alone can come from static chrome on the page.
const CORROBORATING_SIGNALS: &[&str] = &["time-slot", "available"];

/// Classify rendered page text. Expects lowercased input.
pub fn classify_page_text(text: &str) -> CheckOutcome {
    tracing::debug!("Classifying {} chars of page text", text.len());

    if SOLD_OUT_PHRASES.iter().any(|p| text.contains(p)) {
        return CheckOutcome::SoldOut;
    }

    let affirmative = AFFIRMATIVE_PHRASES.iter().any(|p| text.contains(p));
    let corroborated = CORROBORATING_SIGNALS.iter().any(|p| text.contains(p));
    if affirmative && corroborated {
        return CheckOutcome::Available;
    }

    CheckOutcome::Unknown
}
