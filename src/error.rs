//! Typed error enums for catalog loading, access checks and playback.
//!
//! None of these are fatal: the controller turns every variant into a
//! user-visible message and keeps the session alive.

use std::path::PathBuf;

use thiserror::Error;

use crate::library::SongId;

/// Failures reading raw bytes from a [`crate::library::CatalogSource`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The requested document or asset does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The backing store failed while reading.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Manifest or metadata could not be loaded.
///
/// A failing manifest aborts the load; a failing metadata record is only
/// logged and skipped.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to fetch {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: FetchError,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid field `{field}` in {path}: {reason}")]
    InvalidField {
        path: String,
        field: &'static str,
        reason: String,
    },
    #[error("{path} maps to song id {id}, which is already taken")]
    DuplicateId { path: String, id: SongId },
}

/// Outcome of a rejected unlock attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Wrong password, or ciphertext that failed authentication.
    #[error("incorrect password")]
    InvalidPassword,
    /// The encrypted (or plaintext) asset could not be fetched.
    #[error("audio for {filename} is unavailable: {reason}")]
    AssetUnavailable { filename: String, reason: String },
}

impl AccessError {
    /// Message suitable for showing in the password prompt.
    pub fn user_message(&self) -> &'static str {
        match self {
            AccessError::InvalidPassword => "Incorrect password. Please try again.",
            AccessError::AssetUnavailable { .. } => {
                "The song could not be downloaded right now. Please try again later."
            }
        }
    }
}

/// The audio sink refused an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("playback rejected: {0}")]
    Rejected(String),
    #[error("no source loaded")]
    NoSource,
}

#[derive(Debug, Error)]
pub enum SealError {
    #[error("encryption failed")]
    Encrypt,
    #[error("iteration count must be at least 1")]
    ZeroIterations,
}
