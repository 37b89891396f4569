use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Too many redirects (more than {max}) starting at {url}")]
    TooManyRedirects { url: String, max: u32 },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Empty document")]
    EmptyDocument,

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BrowserError>;

/// Failures surfaced by [`crate::bank::BankSession`] and its adapters.
#[derive(Error, Debug)]
pub enum BankError {
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Account entries unavailable: {0}")]
    EntriesUnavailable(String),

    #[error("Operation not supported by this adapter: {0}")]
    Unsupported(String),

    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),

    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),
}

pub type BankResult<T> = std::result::Result<T, BankError>;

// Adapters are free to use anyhow internally
impl From<anyhow::Error> for BankError {
    fn from(err: anyhow::Error) -> Self {
        BankError::Adapter(err.to_string())
    }
}

impl BankError {
    pub fn from_any_error<E: std::fmt::Display>(err: E) -> Self {
        BankError::Adapter(err.to_string())
    }
}
