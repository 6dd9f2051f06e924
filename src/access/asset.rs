use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Playable audio: the bytes handed to the sink and their MIME type.
///
/// Cloning shares the bytes, so the cache and the session can both hold one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableAsset {
    pub bytes: Arc<[u8]>,
    pub mime: String,
}

impl PlayableAsset {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: mime.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Guess a MIME type from the song's filename extension.
pub fn mime_for_filename(filename: &str) -> &'static str {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") | Some("mp4") | Some("aac") => "audio/mp4",
        Some("flac") => "audio/flac",
        Some("ogg") | Some("oga") | Some("opus") => "audio/ogg",
        _ => "application/octet-stream",
    }
}

/// Decode a `data:<mime>;base64,<payload>` URL.
///
/// Returns `None` for anything that is not a base64 data URL.
pub fn decode_data_url(url: &str) -> Option<PlayableAsset> {
    let rest = url.trim().strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let mime = if mime.is_empty() {
        "application/octet-stream"
    } else {
        mime
    };
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some(PlayableAsset::new(bytes, mime))
}
