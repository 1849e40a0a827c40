//! Client error taxonomy
//!
//! Four shapes cover every failure the data-access layer can surface:
//! rejected input, missing entity, transport trouble, and a catch-all.
//! All variants are `Clone` — the cache layer shares a failed read's error
//! with every subscriber.

use vantage_model::ValidationError;

/// Any failure from the data-access layer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Rejected input, client-side pre-flight or server echo; never retried
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The id or filter matched nothing; never retried
    #[error("{resource} {id} not found")]
    NotFound {
        /// Entity kind ("dashboard", "data source", ...)
        resource: &'static str,
        /// The id or filter description that missed
        id: String,
    },

    /// Network or server failure without a structured error body
    #[error("transport failure: {message}")]
    Transport {
        /// HTTP status when a response arrived at all
        status: Option<u16>,
        /// Underlying cause, flattened to text
        message: String,
    },

    /// Anything that fits nowhere else; logged and surfaced generically
    #[error("unexpected failure: {0}")]
    Unknown(String),
}

impl ClientError {
    /// A [`ClientError::NotFound`] for `resource`/`id`
    #[inline]
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { resource, id: id.into() }
    }

    /// A [`ClientError::Transport`] with an optional status
    #[inline]
    #[must_use]
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport { status, message: message.into() }
    }

    /// Whether retrying the same call can plausibly succeed
    ///
    /// True for connection-level failures (no status arrived) and for
    /// timeout/throttle/server statuses. Validation and not-found are
    /// deterministic and never transient.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { status, .. } => match status {
                None => true,
                Some(s) => *s == 408 || *s == 429 || *s >= 500,
            },
            Self::Validation(_) | Self::NotFound { .. } | Self::Unknown(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transience_classification() {
        assert!(ClientError::transport(None, "connection refused").is_transient());
        assert!(ClientError::transport(Some(503), "bad gateway").is_transient());
        assert!(ClientError::transport(Some(429), "slow down").is_transient());
        assert!(!ClientError::transport(Some(400), "bad request").is_transient());
        assert!(!ClientError::not_found("dashboard", "d1").is_transient());
        assert!(!ClientError::Validation(ValidationError::EmptyName).is_transient());
    }
}
