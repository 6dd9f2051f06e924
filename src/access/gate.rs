use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use crate::config::{CacheSettings, CatalogSettings};
use crate::error::AccessError;
use crate::fingerprint;
use crate::library::{CatalogSource, IV_LEN, Protection, SALT_LEN, SongId, SongRecord};

use super::asset::{PlayableAsset, decode_data_url, mime_for_filename};
use super::cache::AssetCache;
use super::cipher::open;
use super::kdf::{KeyDeriver, Pbkdf2Sha256};

/// Checks passwords and releases playable audio.
///
/// Shared between the controller and unlock workers, so the cache sits
/// behind a mutex.
pub struct AccessGate {
    source: Arc<dyn CatalogSource>,
    deriver: Arc<dyn KeyDeriver>,
    cache: Mutex<AssetCache>,
    encrypted_suffix: String,
}

impl AccessGate {
    pub fn new(source: Arc<dyn CatalogSource>, catalog: &CatalogSettings, cache: &CacheSettings) -> Self {
        Self::with_deriver(source, Arc::new(Pbkdf2Sha256), catalog, cache)
    }

    pub fn with_deriver(
        source: Arc<dyn CatalogSource>,
        deriver: Arc<dyn KeyDeriver>,
        catalog: &CatalogSettings,
        cache: &CacheSettings,
    ) -> Self {
        Self {
            source,
            deriver,
            cache: Mutex::new(AssetCache::with_max_entries(cache.max_entries)),
            encrypted_suffix: catalog.encrypted_suffix.clone(),
        }
    }

    /// Verify `candidate` for `song` and return its playable audio.
    pub fn verify(&self, song: &SongRecord, candidate: &str) -> Result<PlayableAsset, AccessError> {
        match &song.protection {
            Protection::Fingerprint { hash, audio_url } => {
                self.verify_fingerprint(song, hash, audio_url, candidate)
            }
            Protection::Sealed {
                salt,
                iv,
                iterations,
            } => self.verify_sealed(song, salt, iv, *iterations, candidate),
        }
    }

    /// Whether `(song, candidate)` would be answered from the cache.
    pub fn is_cached(&self, song: SongId, candidate: &str) -> bool {
        self.cache().contains(song, candidate)
    }

    pub fn cached_entries(&self) -> usize {
        self.cache().len()
    }

    pub fn cached_entries_for(&self, song: SongId) -> usize {
        self.cache().entries_for(song)
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    fn cache(&self) -> MutexGuard<'_, AssetCache> {
        // The cache only ever holds complete entries, so a poisoned lock is still usable.
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn verify_fingerprint(
        &self,
        song: &SongRecord,
        stored: &str,
        audio_url: &str,
        candidate: &str,
    ) -> Result<PlayableAsset, AccessError> {
        if !fingerprint::matches(candidate, stored) {
            return Err(AccessError::InvalidPassword);
        }

        if let Some(asset) = decode_data_url(audio_url) {
            return Ok(asset);
        }

        let bytes = self
            .source
            .fetch(audio_url)
            .map_err(|e| AccessError::AssetUnavailable {
                filename: song.filename.clone(),
                reason: e.to_string(),
            })?;
        Ok(PlayableAsset::new(bytes, mime_for_filename(audio_url)))
    }

    fn verify_sealed(
        &self,
        song: &SongRecord,
        salt: &[u8; SALT_LEN],
        iv: &[u8; IV_LEN],
        iterations: u32,
        candidate: &str,
    ) -> Result<PlayableAsset, AccessError> {
        if let Some(asset) = self.cache().get(song.id, candidate) {
            debug!(song = %song.id, "unlock served from cache");
            return Ok(asset);
        }

        let path = format!("{}{}", song.filename, self.encrypted_suffix);
        let ciphertext = self
            .source
            .fetch(&path)
            .map_err(|e| AccessError::AssetUnavailable {
                filename: song.filename.clone(),
                reason: e.to_string(),
            })?;

        let key = self.deriver.derive(candidate, salt, iterations);
        let plaintext = open(&key, iv, &ciphertext).ok_or(AccessError::InvalidPassword)?;

        let asset = PlayableAsset::new(plaintext, mime_for_filename(&song.filename));
        self.cache().put(song.id, candidate, asset.clone());
        info!(song = %song.id, bytes = asset.len(), "song unlocked");
        Ok(asset)
    }
}
