use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fingerprint::rolling_hash;

/// Stable identifier for a song, derived from its filename.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SongId(pub u32);

impl SongId {
    pub fn from_filename(filename: &str) -> Self {
        Self(rolling_hash(filename))
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a song is gated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protection {
    /// Legacy catalogs: stored fingerprint plus an unencrypted asset
    /// reference (a `data:` URL or a path inside the catalog source).
    Fingerprint { hash: String, audio_url: String },
    /// The ciphertext lives next to the metadata; salt and IV are not secret.
    Sealed {
        salt: [u8; SALT_LEN],
        iv: [u8; IV_LEN],
        iterations: u32,
    },
}

pub const SALT_LEN: usize = 16;
pub const IV_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRecord {
    pub id: SongId,
    pub filename: String,
    pub title: String,
    pub artist: Option<String>,
    pub duration: Option<Duration>,
    /// What the list shows in the duration column.
    pub display_duration: String,
    pub genres: Vec<String>,
    pub protection: Protection,
}

impl SongRecord {
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

/// Duration as written in metadata: `"3:45"` or a plain number of seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayDuration {
    Seconds(u64),
    Text(String),
}

/// Per-song metadata document, in the shape the uploader writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMetadata {
    pub filename: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<DisplayDuration>,
    #[serde(default, alias = "genre", alias = "tags")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_at: Option<String>,
    #[serde(
        default,
        alias = "passwordHash",
        skip_serializing_if = "Option::is_none"
    )]
    pub password_hash: Option<String>,
    #[serde(default, alias = "audioUrl", skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// The manifest: either a bare list of filenames or `{"songs": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Manifest {
    List(Vec<String>),
    Object { songs: Vec<String> },
}

impl Manifest {
    pub(crate) fn into_filenames(self) -> Vec<String> {
        match self {
            Manifest::List(v) | Manifest::Object { songs: v } => v,
        }
    }
}
