use serde::Deserialize;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/jmusic/config.toml` or `~/.config/jmusic/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `JMUSIC__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub access: AccessSettings,
    pub catalog: CatalogSettings,
    pub cache: CacheSettings,
    pub playback: PlaybackSettings,
}

/// How songs in this deployment are protected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessPolicy {
    /// Legacy: compare a 32-bit rolling-hash fingerprint. Not a security boundary.
    #[serde(alias = "hash_compare", alias = "hash", alias = "legacy")]
    HashCompare,
    /// Derive a key from the password and authenticate-decrypt the asset.
    #[serde(alias = "derive_and_decrypt", alias = "decrypt", alias = "aes-gcm")]
    DeriveAndDecrypt,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::DeriveAndDecrypt
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccessSettings {
    pub policy: AccessPolicy,
    /// PBKDF2 iteration count for records that do not carry their own.
    pub default_iterations: u32,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            policy: AccessPolicy::default(),
            default_iterations: 100_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Root the catalog source resolves paths against.
    pub root: String,
    /// Manifest document name, relative to `root`.
    pub manifest: String,
    /// Appended to a song filename to locate its metadata document.
    pub metadata_suffix: String,
    /// Appended to a song filename to locate its ciphertext.
    pub encrypted_suffix: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            root: "music".to_string(),
            manifest: "manifest.json".to_string(),
            metadata_suffix: ".json".to_string(),
            encrypted_suffix: ".encrypted".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Upper bound on decrypted assets kept in memory, evicting the least
    /// recently used. `None` keeps everything for the session.
    pub max_entries: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Initial volume on a 0-100 scale.
    pub volume: u8,
    /// Start playing as soon as an unlocked song is ready.
    pub autoplay: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: 80,
            autoplay: true,
        }
    }
}
