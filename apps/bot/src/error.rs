use crate::sources::{SourceError, SourceKind};
use crate::transport::TransportError;

/// Application errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{provider} API error: {error}")]
    Upstream {
        provider: SourceKind,
        #[source]
        error: SourceError,
    },

    #[error("Failed to send message part {part}/{total}: {error}")]
    Delivery {
        part: usize,
        total: usize,
        #[source]
        error: TransportError,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Operation cancelled")]
    Cancelled,
}

impl AppError {
    /// Tags an upstream failure with the provider that produced it
    pub fn upstream(provider: SourceKind, error: SourceError) -> Self {
        AppError::Upstream { provider, error }
    }

    /// Which upstream provider failed, if this is a fetch error
    pub fn provider(&self) -> Option<SourceKind> {
        match self {
            AppError::Upstream { provider, .. } => Some(*provider),
            _ => None,
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
