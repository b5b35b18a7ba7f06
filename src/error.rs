//! Error types for catalog, store and resolver operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by catalog mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The requested position does not exist (stale or invalid view).
    #[error("index {index} is out of range for {len} visible products")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors raised by a [`crate::store::CatalogStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("read catalog slot {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write catalog slot {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored bytes exist but are not a valid catalog.
    #[error("stored catalog is corrupt: {reason}")]
    Corrupt { reason: String },

    #[error("serialize catalog")]
    Serialize(#[source] serde_json::Error),
}

impl StoreError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

/// Why a metadata lookup produced no data. Never escapes the resolver.
#[derive(Debug, Error)]
pub enum ResolutionFailure {
    #[error("resolve request failed")]
    Transport(#[source] reqwest::Error),

    #[error("resolve endpoint returned {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed resolve response")]
    Body(#[source] serde_json::Error),
}
