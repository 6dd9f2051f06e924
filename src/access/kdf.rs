use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// Turns a password into a symmetric key. The slow step of every unlock.
pub trait KeyDeriver: Send + Sync {
    fn derive(&self, password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN];
}

/// PBKDF2 with HMAC-SHA256.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pbkdf2Sha256;

impl KeyDeriver for Pbkdf2Sha256 {
    fn derive(&self, password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
        key
    }
}
