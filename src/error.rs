use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Failure categories shown to users. Transport categories come from
/// [`FetchError::category`]; `DataIntegrity` marks sheet-format drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureCategory {
    Request,
    Connection,
    Http,
    Other,
    DataIntegrity,
}

impl FailureCategory {
    pub fn label(self) -> &'static str {
        match self {
            FailureCategory::Request => "Request Error",
            FailureCategory::Connection => "Connection Error",
            FailureCategory::Http => "HTTP Error",
            FailureCategory::Other => "Error",
            FailureCategory::DataIntegrity => "Data Error",
        }
    }

    /// In-channel notice for a transport failure.
    pub fn user_notice(self) -> String {
        match self {
            FailureCategory::Other => "Error encountered during request.".to_string(),
            other => format!("{} encountered.", other.label()),
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("http {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

impl FetchError {
    pub fn category(&self) -> FailureCategory {
        match self {
            FetchError::Timeout(_) => FailureCategory::Request,
            FetchError::Connection(_) => FailureCategory::Connection,
            FetchError::Status { .. } => FailureCategory::Http,
            FetchError::Decode(_) | FetchError::Other(_) => FailureCategory::Other,
        }
    }

    /// Message forwarded to the maintainer contact.
    pub fn diagnostic(&self) -> String {
        match self {
            FetchError::Timeout(_) => format!("Request timeout error: {self}"),
            FetchError::Connection(_) => format!("Error connecting to points tracker: {self}"),
            FetchError::Status { .. } => format!("HTTP Error: {self}"),
            FetchError::Decode(_) | FetchError::Other(_) => format!("Error: {self}"),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // Strip the url so the api key never reaches a diagnostic.
        let err = err.without_url();
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status {
                status: status.as_u16(),
                detail: err.to_string(),
            }
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Other(err.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("column '{column}' holds non-numeric value '{value}'")]
    NonNumeric { column: String, value: String },

    #[error("row for '{name}' has no '{column}' column")]
    MissingColumn { name: String, column: String },
}
