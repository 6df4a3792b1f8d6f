use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid email address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
