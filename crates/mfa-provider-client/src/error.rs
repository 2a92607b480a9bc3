//! Client construction error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("API token is not set")]
    MissingToken,

    #[error("Invalid API URL template: {0}")]
    InvalidUrlTemplate(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
