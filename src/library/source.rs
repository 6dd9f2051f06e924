//! Where catalog documents and assets come from.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::config::CatalogSettings;
use crate::error::FetchError;

/// Fetches raw bytes by catalog-relative path.
///
/// Implementations must be shareable with the unlock worker thread.
pub trait CatalogSource: Send + Sync {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}

/// Serves a catalog laid out on disk under `root`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_settings(settings: &CatalogSettings) -> Self {
        Self::new(&settings.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `path` onto the root, refusing anything that could step outside it.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let rel = Path::new(path);
        if rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            Some(self.root.join(rel))
        } else {
            None
        }
    }
}

impl CatalogSource for DirectorySource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let full = self
            .resolve(path)
            .ok_or_else(|| FetchError::NotFound(path.to_string()))?;
        std::fs::read(&full).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(path.to_string())
            } else {
                FetchError::Io { path: full, source }
            }
        })
    }
}

/// In-memory catalog, for embedding a bundled catalog or for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }

    pub fn with(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }
}

impl CatalogSource for MemorySource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}
