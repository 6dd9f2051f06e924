//! Password-gated music catalog.
//!
//! Songs are listed from a catalog manifest; each one is unlocked with its
//! own password, either by decrypting the sealed audio (PBKDF2-HMAC-SHA256
//! and AES-256-GCM) or, for legacy catalogs, by comparing a rolling-hash
//! fingerprint. Unlocked audio is handed to an [`audio::AudioSink`] through
//! the [`session::PlaybackSession`] state machine, and [`app::App`] ties it
//! all together for a [`ui::Renderer`].

pub mod access;
pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod library;
pub mod logging;
pub mod session;
pub mod ui;

pub use access::{AccessGate, PlayableAsset};
pub use app::App;
pub use config::Settings;
pub use error::{AccessError, CatalogLoadError, FetchError, PlaybackError, SealError};
pub use library::{CatalogSource, DirectorySource, Library, MemorySource, SongId, SongRecord};
pub use session::{PlaybackSession, PlaybackState, SessionPhase};
