//! Error types for recipebox widgets.
//!
//! None of these reach the page as text: search failures degrade to an empty
//! suggestion list and favorite failures leave the button untouched.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request failed with HTTP status {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("config error in {path}: {message}")]
    Config { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WidgetError>;
