//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror. The relay
//! never hands these to its callers; it renders them into completion text.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Service-side failure. The message is already descriptive, so it is
    /// displayed as-is.
    #[error("{0}")]
    AiProvider(String),

    #[error("Forecast error: {0}")]
    Forecast(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
