use crate::error::{Error, Result};
use chrono::NaiveDate;

/// The booking site's date-picker format.
const SITE_FORMAT: &str = "%d/%m/%Y";

/// A target tour date.
///
/// The site's date picker wants `DD/MM/YYYY`; logs use ISO `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TourDate(NaiveDate);

impl TourDate {
    /// Parse a `DD/MM/YYYY` string as entered on the command line.
    pub fn parse(input: &str) -> Result<Self> {
        NaiveDate::parse_from_str(input.trim(), SITE_FORMAT)
            .map(TourDate)
            .map_err(|e| Error::InvalidDate {
                input: input.to_string(),
                reason: e.to_string(),
            })
    }

    /// Render in the form the site's date picker accepts.
    pub fn site_format(&self) -> String {
        self.0.format(SITE_FORMAT).to_string()
    }
}

impl std::fmt::Display for TourDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl std::str::FromStr for TourDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TourDate::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_site_format_round_trip() {
        let date = TourDate::parse("13/02/2026").unwrap();
        assert_eq!(date.site_format(), "13/02/2026");
    }

    #[test]
    fn test_display_is_iso() {
        let date = TourDate::parse("16/02/2026").unwrap();
        assert_eq!(date.to_string(), "2026-02-16");
    }

    #[test]
    fn test_rejects_iso_input() {
        assert!(TourDate::parse("2026-02-13").is_err());
    }

    #[test]
    fn test_rejects_impossible_date() {
        let err = TourDate::parse("31/02/2026").unwrap_err();
        assert!(err.to_string().contains("31/02/2026"));
    }

    #[test]
    fn test_trims_whitespace() {
        assert!(TourDate::parse(" 13/02/2026 ").is_ok());
    }
}
