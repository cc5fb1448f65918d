//! Error types for the ATECO extractor
//!
//! This module provides the error taxonomy used throughout the crate:
//! - Input validation errors (bad ATECO code, bad page size, missing token)
//! - OpenAPI platform errors mapped from HTTP status codes
//! - Structural errors for responses that violate the documented contract

use thiserror::Error;

/// Result type alias for extractor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the extractor
///
/// All errors are terminal for the current operation: there is no retry or
/// partial recovery, failures propagate to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller-supplied input was rejected before any request was made
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The bearer token was rejected by the platform (HTTP 401)
    #[error("unauthorized: {0}")]
    Authentication(String),

    /// The account has insufficient credits (HTTP 402)
    #[error("payment required: {0}")]
    PaymentRequired(String),

    /// The server rejected the request parameters (HTTP 422)
    #[error("request rejected: {0}")]
    Validation(String),

    /// The response body does not match the documented contract
    #[error("unexpected response structure: {0}")]
    UnexpectedResponse(String),

    /// Any other failure reported by the OpenAPI platform
    #[error("{0}")]
    Api(String),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid endpoint URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Workbook serialization error
    #[error("workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
