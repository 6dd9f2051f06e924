use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, info, warn};

use crate::config::{AccessPolicy, AccessSettings, CatalogSettings};
use crate::error::CatalogLoadError;

use super::display::resolve_duration;
use super::model::{IV_LEN, Manifest, Protection, SALT_LEN, SongId, SongMetadata, SongRecord};
use super::source::CatalogSource;
use super::view::Library;

/// A loaded library plus the records that had to be left out.
#[derive(Debug)]
pub struct LoadOutcome {
    pub library: Library,
    pub skipped: Vec<CatalogLoadError>,
}

/// Fetch the manifest and every metadata record it lists.
///
/// Only a broken manifest is an error. Each record that fails to fetch,
/// parse or validate is logged and skipped, so a partial library is a
/// normal outcome.
pub fn load_library(
    source: &dyn CatalogSource,
    catalog: &CatalogSettings,
    access: &AccessSettings,
) -> Result<LoadOutcome, CatalogLoadError> {
    let filenames = fetch_manifest(source, &catalog.manifest)?;

    let mut songs: Vec<SongRecord> = Vec::with_capacity(filenames.len());
    let mut skipped: Vec<CatalogLoadError> = Vec::new();

    for filename in filenames {
        let filename = filename.trim();
        if filename.is_empty() {
            continue;
        }

        let path = format!("{filename}{}", catalog.metadata_suffix);
        let record = fetch_metadata(source, &path)
            .and_then(|meta| record_from_metadata(&path, filename, meta, access));

        let record = match record {
            Ok(r) if songs.iter().any(|s| s.id == r.id) => Err(CatalogLoadError::DuplicateId {
                path: path.clone(),
                id: r.id,
            }),
            other => other,
        };

        match record {
            Ok(r) => {
                debug!(id = %r.id, title = %r.title, "loaded song");
                songs.push(r);
            }
            Err(e) => {
                warn!(error = %e, "skipping song");
                skipped.push(e);
            }
        }
    }

    info!(
        loaded = songs.len(),
        skipped = skipped.len(),
        "catalog loaded"
    );

    Ok(LoadOutcome {
        library: Library::new(songs),
        skipped,
    })
}

fn fetch_manifest(source: &dyn CatalogSource, path: &str) -> Result<Vec<String>, CatalogLoadError> {
    let bytes = source.fetch(path).map_err(|e| CatalogLoadError::Fetch {
        path: path.to_string(),
        source: e,
    })?;
    let manifest: Manifest =
        serde_json::from_slice(&bytes).map_err(|e| CatalogLoadError::Parse {
            path: path.to_string(),
            source: e,
        })?;
    Ok(manifest.into_filenames())
}

fn fetch_metadata(source: &dyn CatalogSource, path: &str) -> Result<SongMetadata, CatalogLoadError> {
    let bytes = source.fetch(path).map_err(|e| CatalogLoadError::Fetch {
        path: path.to_string(),
        source: e,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| CatalogLoadError::Parse {
        path: path.to_string(),
        source: e,
    })
}

/// Validate one metadata document into a record for the deployment's policy.
///
/// The manifest filename is authoritative: it names the assets and seeds the id.
pub(crate) fn record_from_metadata(
    path: &str,
    filename: &str,
    meta: SongMetadata,
    access: &AccessSettings,
) -> Result<SongRecord, CatalogLoadError> {
    if !meta.filename.is_empty() && meta.filename != filename {
        debug!(
            manifest = filename,
            metadata = %meta.filename,
            "metadata filename differs from manifest entry"
        );
    }

    let protection = match access.policy {
        AccessPolicy::DeriveAndDecrypt => {
            let salt = decode_fixed::<SALT_LEN>(path, "salt", meta.salt.as_deref())?;
            let iv = decode_fixed::<IV_LEN>(path, "iv", meta.iv.as_deref())?;
            let iterations = match meta.iterations {
                Some(0) => {
                    return Err(CatalogLoadError::InvalidField {
                        path: path.to_string(),
                        field: "iterations",
                        reason: "must be at least 1".to_string(),
                    });
                }
                Some(n) => n,
                None => access.default_iterations,
            };
            Protection::Sealed {
                salt,
                iv,
                iterations,
            }
        }
        AccessPolicy::HashCompare => {
            let hash = required(path, "password_hash", meta.password_hash)?;
            let audio_url = meta
                .audio_url
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| filename.to_string());
            Protection::Fingerprint { hash, audio_url }
        }
    };

    let title = match meta.title.trim() {
        "" => std::path::Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename)
            .to_string(),
        t => t.to_string(),
    };

    let mut genres: Vec<String> = Vec::new();
    for g in meta.genres {
        let g = g.trim();
        if !g.is_empty() && !genres.iter().any(|x| x == g) {
            genres.push(g.to_string());
        }
    }

    let (duration, display_duration) = resolve_duration(meta.duration.as_ref());

    Ok(SongRecord {
        id: SongId::from_filename(filename),
        filename: filename.to_string(),
        title,
        artist: meta
            .artist
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty()),
        duration,
        display_duration,
        genres,
        protection,
    })
}

fn required(
    path: &str,
    field: &'static str,
    value: Option<String>,
) -> Result<String, CatalogLoadError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CatalogLoadError::InvalidField {
            path: path.to_string(),
            field,
            reason: "missing".to_string(),
        })
}

fn decode_fixed<const N: usize>(
    path: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<[u8; N], CatalogLoadError> {
    let invalid = |reason: String| CatalogLoadError::InvalidField {
        path: path.to_string(),
        field,
        reason,
    };

    let text = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| invalid("missing".to_string()))?;
    let bytes = STANDARD
        .decode(text)
        .map_err(|e| invalid(format!("not base64: {e}")))?;
    <[u8; N]>::try_from(bytes.as_slice())
        .map_err(|_| invalid(format!("expected {N} bytes, got {}", bytes.len())))
}
