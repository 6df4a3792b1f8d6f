use serde::Serialize;

/// Result of one availability check for one target date.
///
/// `Failed` is an operational failure (launch, navigation, missing element),
/// distinct from `Unknown`, which means the page rendered but its content
/// matched neither the sold-out nor the availability patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum CheckOutcome {
    Available,
    SoldOut,
    Unknown,
    Failed(String),
}

impl CheckOutcome {
    pub fn as_str(&self) -> &str {
        match self {
            CheckOutcome::Available => "AVAILABLE",
            CheckOutcome::SoldOut => "SOLD OUT",
            CheckOutcome::Unknown => "UNKNOWN",
            CheckOutcome::Failed(_) => "FAILED",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, CheckOutcome::Available)
    }
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckOutcome::Failed(reason) => write!(f, "FAILED ({reason})"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_available_is_available() {
        assert!(CheckOutcome::Available.is_available());
        assert!(!CheckOutcome::SoldOut.is_available());
        assert!(!CheckOutcome::Unknown.is_available());
        assert!(!CheckOutcome::Failed("boom".into()).is_available());
    }

    #[test]
    fn test_display_includes_failure_reason() {
        let outcome = CheckOutcome::Failed("navigation timed out".into());
        assert_eq!(outcome.to_string(), "FAILED (navigation timed out)");
    }
}
