//! Password checks, decryption and the decrypted-asset cache.
//!
//! Two policies exist. Legacy catalogs store a rolling-hash fingerprint of
//! the password next to unencrypted audio; current catalogs store AES-GCM
//! ciphertext whose successful decryption is the password check.

mod asset;
mod cache;
mod cipher;
mod gate;
mod kdf;

pub use asset::{PlayableAsset, decode_data_url, mime_for_filename};
pub use cache::AssetCache;
pub use cipher::{Sealed, seal};
pub use gate::AccessGate;
pub use kdf::{KEY_LEN, KeyDeriver, Pbkdf2Sha256};
