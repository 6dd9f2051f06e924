//! Application controller: wires the catalog, the access gate, the playback
//! session and the renderers together.

mod model;
mod worker;

pub use model::*;
pub use worker::{UnlockOutcome, UnlockTicket};
