//! AES-256-GCM over whole assets.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::SealError;
use crate::library::{DisplayDuration, IV_LEN, SALT_LEN, SongMetadata};

use super::kdf::{KEY_LEN, KeyDeriver};

/// Decrypt and authenticate. A wrong key and tampered bytes both give `None`.
pub(crate) fn open(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Option<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher.decrypt(Nonce::from_slice(iv), ciphertext).ok()
}

/// Output of [`seal`]: ciphertext and the non-secret parameters needed to open it.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; IV_LEN],
    pub iterations: u32,
}

impl Sealed {
    /// Metadata document to publish next to the ciphertext.
    pub fn metadata(
        &self,
        filename: &str,
        title: &str,
        artist: Option<&str>,
        duration: Option<DisplayDuration>,
        genres: &[&str],
    ) -> SongMetadata {
        SongMetadata {
            filename: filename.to_string(),
            title: title.to_string(),
            artist: artist.map(str::to_string),
            duration,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            salt: Some(STANDARD.encode(self.salt)),
            iv: Some(STANDARD.encode(self.iv)),
            iterations: Some(self.iterations),
            encrypted_at: None,
            password_hash: None,
            audio_url: None,
        }
    }
}

/// Encrypt `plaintext` under a key derived from `password`, with a fresh
/// random salt and IV.
pub fn seal(
    deriver: &dyn KeyDeriver,
    plaintext: &[u8],
    password: &str,
    iterations: u32,
) -> Result<Sealed, SealError> {
    if iterations == 0 {
        return Err(SealError::ZeroIterations);
    }

    let salt: [u8; SALT_LEN] = rand::random();
    let iv: [u8; IV_LEN] = rand::random();

    let key = deriver.derive(password, &salt, iterations);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| SealError::Encrypt)?;

    Ok(Sealed {
        ciphertext,
        salt,
        iv,
        iterations,
    })
}
