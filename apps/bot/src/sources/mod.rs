//! Upstream vehicle data sources.
//!
//! Each provider implements [`VehicleDataSource`] with its own record type.
//! The lookup service only depends on the trait, so tests can substitute
//! in-memory doubles for the HTTP clients.

pub mod mot;
pub mod ves;

use std::fmt;

use async_trait::async_trait;

pub use mot::MotClient;
pub use ves::VesClient;

// =============================================================================
// Data Source Trait
// =============================================================================

/// Fetches a vehicle record by registration from one upstream provider.
///
/// Dropping the returned future aborts the in-flight request; the lookup
/// service relies on this to cancel the slower source when the other fails.
#[async_trait]
pub trait VehicleDataSource: Send + Sync {
    /// Provider-specific record shape
    type Record: Send;

    async fn fetch(&self, registration: &str) -> Result<Self::Record, SourceError>;
}

/// Identifies which upstream produced a record or an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// DVSA MOT History API
    Mot,
    /// DVLA Vehicle Enquiry Service
    Ves,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Mot => write!(f, "MOT"),
            SourceKind::Ves => write!(f, "VES"),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Failure of a single upstream fetch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("vehicle not found")]
    NotFound,

    #[error("rate limited by upstream")]
    RateLimited,

    #[error("request timed out")]
    Timeout,

    #[error("unexpected status code: {0}")]
    UnexpectedStatus(u16),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl SourceError {
    /// Maps a non-success HTTP status to an error
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            404 => SourceError::NotFound,
            429 => SourceError::RateLimited,
            code => SourceError::UnexpectedStatus(code),
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SourceError::Timeout
        } else if e.is_decode() {
            SourceError::Decode(e.without_url().to_string())
        } else if let Some(status) = e.status() {
            SourceError::from_status(status)
        } else if e.is_connect() {
            SourceError::Request("connection failed".to_string())
        } else {
            SourceError::Request(e.without_url().to_string())
        }
    }
}

/// Builds the shared HTTP client for an upstream with the given timeout
pub(crate) fn build_http_client(timeout: std::time::Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client")
}
