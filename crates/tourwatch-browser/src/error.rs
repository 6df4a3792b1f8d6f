use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("Deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Timed out after {seconds}s waiting for '{selector}'")]
    WaitTimeout { selector: String, seconds: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_errors_convert() {
        // into_value() surfaces serde errors; they must flow through `?`.
        let serde_err = serde_json::from_str::<bool>("not json").unwrap_err();
        let err: Error = serde_err.into();
        assert!(err.to_string().starts_with("Deserialization error"));
    }
}
