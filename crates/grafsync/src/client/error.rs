//! Monitoring API error types.

use thiserror::Error;

use crate::sanitize::truncate_body;

/// Errors of a single API request.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Connection timeout occurred for {url}")]
    ConnectTimeout { url: String },

    #[error("Read timeout occurred for {url}")]
    ReadTimeout { url: String },

    #[error("Connection to {url} failed (DNS lookup or connect): {message}")]
    ConnectionFailure { url: String, message: String },

    #[error("HTTP {status} from {url}: {}", truncate_body(body))]
    HttpError {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl ApiError {
    /// Failure kind as named in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::ConnectTimeout { .. } => "ConnectTimeout",
            ApiError::ReadTimeout { .. } => "ReadTimeout",
            ApiError::ConnectionFailure { .. } => "ConnectionFailure",
            ApiError::HttpError { .. } => "HttpError",
            ApiError::InvalidResponse { .. } => "InvalidResponse",
            ApiError::ClientBuild(_) => "ClientBuild",
        }
    }

    /// Returns true if the error is likely transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::ConnectTimeout { .. }
            | ApiError::ReadTimeout { .. }
            | ApiError::ConnectionFailure { .. } => true,
            ApiError::HttpError { status, .. } => *status >= 500 || *status == 429,
            ApiError::InvalidResponse { .. } | ApiError::ClientBuild(_) => false,
        }
    }
}

/// Maps a transport error from reqwest onto the request failure taxonomy.
pub fn classify_request_error(url: &str, err: reqwest::Error) -> ApiError {
    let url = url.to_string();
    if err.is_timeout() {
        if err.is_connect() {
            ApiError::ConnectTimeout { url }
        } else {
            ApiError::ReadTimeout { url }
        }
    } else if err.is_decode() {
        ApiError::InvalidResponse {
            url,
            message: err.to_string(),
        }
    } else {
        ApiError::ConnectionFailure {
            url,
            message: err.to_string(),
        }
    }
}
