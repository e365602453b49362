//! Error taxonomy for the tester.
//!
//! Probe-level failures never surface here; they are captured field-by-field
//! inside [`EndpointResult`](crate::models::EndpointResult). This type covers
//! the few ways the tester itself can fail before any probing starts.

use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// The base URL failed validation; no request was sent
    #[error("Invalid base_url provided: {url}")]
    InvalidBaseUrl { url: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
