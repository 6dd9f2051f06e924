use std::collections::HashMap;

use tracing::debug;

use crate::library::SongId;

use super::asset::PlayableAsset;

/// Decrypted assets keyed by song and the exact password that opened them.
///
/// Unbounded by default, living as long as the session. With `max_entries`
/// set, the least recently used entry is evicted to make room.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: HashMap<(SongId, String), Entry>,
    max_entries: Option<usize>,
    clock: u64,
}

#[derive(Debug)]
struct Entry {
    asset: PlayableAsset,
    last_used: u64,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: Option<usize>) -> Self {
        Self {
            max_entries: max_entries.map(|n| n.max(1)),
            ..Self::default()
        }
    }

    pub fn get(&mut self, song: SongId, password: &str) -> Option<PlayableAsset> {
        self.clock += 1;
        let now = self.clock;
        let entry = self.entries.get_mut(&(song, password.to_string()))?;
        entry.last_used = now;
        Some(entry.asset.clone())
    }

    pub fn put(&mut self, song: SongId, password: &str, asset: PlayableAsset) {
        self.clock += 1;
        let key = (song, password.to_string());

        if let Some(max) = self.max_entries {
            while !self.entries.contains_key(&key) && self.entries.len() >= max {
                self.evict_oldest();
            }
        }

        self.entries.insert(
            key,
            Entry {
                asset,
                last_used: self.clock,
            },
        );
    }

    pub fn contains(&self, song: SongId, password: &str) -> bool {
        self.entries.contains_key(&(song, password.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of cached entries for `song`, whatever password opened them.
    pub fn entries_for(&self, song: SongId) -> usize {
        self.entries.keys().filter(|(id, _)| *id == song).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_used)
            .map(|(k, _)| k.clone());
        if let Some(k) = oldest {
            debug!(song = %k.0, "evicting cached asset");
            self.entries.remove(&k);
        }
    }
}
