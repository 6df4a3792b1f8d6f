use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid target date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
