use std::collections::BTreeSet;

use super::model::{SongId, SongRecord};

/// Ordered, load-once collection of songs.
#[derive(Debug, Clone, Default)]
pub struct Library {
    songs: Vec<SongRecord>,
}

/// Selected genre tags. Empty means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    genres: BTreeSet<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_genres<I, S>(genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut f = Self::new();
        for g in genres {
            f.select(g.as_ref());
        }
        f
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    pub fn contains(&self, genre: &str) -> bool {
        self.genres.contains(genre.trim())
    }

    /// Returns `false` when the tag was already selected.
    pub fn select(&mut self, genre: &str) -> bool {
        let g = genre.trim();
        !g.is_empty() && self.genres.insert(g.to_string())
    }

    pub fn deselect(&mut self, genre: &str) -> bool {
        self.genres.remove(genre.trim())
    }

    /// Checkbox semantics: flip the tag, returning whether it is now selected.
    pub fn toggle(&mut self, genre: &str) -> bool {
        if self.deselect(genre) {
            false
        } else {
            self.select(genre)
        }
    }

    pub fn clear(&mut self) {
        self.genres.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.genres.iter().map(String::as_str)
    }

    /// OR semantics: a song matches if it carries any selected tag.
    pub fn matches(&self, song: &SongRecord) -> bool {
        self.is_empty() || song.genres.iter().any(|g| self.genres.contains(g))
    }
}

impl Library {
    pub fn new(songs: Vec<SongRecord>) -> Self {
        Self { songs }
    }

    pub fn songs(&self) -> &[SongRecord] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn get(&self, id: SongId) -> Option<&SongRecord> {
        self.songs.iter().find(|s| s.id == id)
    }

    /// Library order restricted to songs matching `filter`.
    pub fn filter(&self, filter: &FilterSet) -> Vec<&SongRecord> {
        self.songs.iter().filter(|s| filter.matches(s)).collect()
    }

    pub fn filtered_ids(&self, filter: &FilterSet) -> Vec<SongId> {
        self.songs
            .iter()
            .filter(|s| filter.matches(s))
            .map(|s| s.id)
            .collect()
    }

    /// Every tag used in the library, sorted and de-duplicated.
    pub fn genres(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .songs
            .iter()
            .flat_map(|s| s.genres.iter().map(String::as_str))
            .collect();
        set.into_iter().collect()
    }
}

/// The song after `current` in `view`, wrapping to the first.
///
/// A `current` that is not in the view (or none at all) yields the first song.
pub fn next_in_view(view: &[SongId], current: Option<SongId>) -> Option<SongId> {
    if view.is_empty() {
        return None;
    }

    let pos = current.and_then(|c| view.iter().position(|&i| i == c));
    match pos {
        Some(p) => Some(view[(p + 1) % view.len()]),
        None => Some(view[0]),
    }
}

/// The song before `current` in `view`, wrapping to the last.
pub fn prev_in_view(view: &[SongId], current: Option<SongId>) -> Option<SongId> {
    if view.is_empty() {
        return None;
    }

    let pos = current.and_then(|c| view.iter().position(|&i| i == c));
    match pos {
        Some(0) | None => Some(view[view.len() - 1]),
        Some(p) => Some(view[p - 1]),
    }
}
