//! Configuration loader and schema types.
//!
//! Settings select the access policy for the deployment, where the catalog
//! lives, how large the decrypted-asset cache may grow and the initial
//! playback defaults.

mod load;
mod schema;

pub use load::{default_config_path, resolve_config_path};
pub use schema::*;
