//! Error type surfaced by the list controller.

use thiserror::Error;

/// Failure of a catalog request, as seen by the list screen.
///
/// Transport errors, non-success HTTP statuses and malformed payloads
/// all collapse into this one variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// A catalog request failed.
    #[error("{0}")]
    FetchFailed(String),
}

impl FetchError {
    /// Builds a `FetchFailed` from an error, keeping its full context chain.
    #[must_use]
    pub fn from_report(err: &anyhow::Error) -> Self {
        Self::FetchFailed(format!("{err:#}"))
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::FetchFailed(message) => message,
        }
    }
}
