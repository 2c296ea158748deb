use crate::endpoints::ResponseFormat;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DirectoryError>;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error(
        "Format '{format}' is not supported for endpoint '{operation}'. Supported formats: {supported}"
    )]
    UnsupportedFormat {
        format: ResponseFormat,
        operation: String,
        supported: String,
    },

    #[error("{param} parameter is required for {operation}")]
    MissingParam {
        param: &'static str,
        operation: &'static str,
    },

    #[error("Invalid {param}: {message}")]
    InvalidParam {
        param: &'static str,
        message: String,
    },

    #[error("Invalid root server URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
