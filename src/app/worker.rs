//! Runs the unlock pipeline off the controller's thread.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use tracing::debug;

use crate::access::{AccessGate, PlayableAsset};
use crate::error::AccessError;
use crate::library::{SongId, SongRecord};

/// Identifies one unlock request; a newer request for the same song gets a
/// new generation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UnlockTicket {
    pub song: SongId,
    pub generation: u64,
}

#[derive(Debug)]
pub struct UnlockOutcome {
    pub ticket: UnlockTicket,
    pub result: Result<PlayableAsset, AccessError>,
}

/// Verify on a worker thread and post the outcome to `tx`.
///
/// The receiver may be gone by the time the worker finishes; the outcome is
/// then dropped.
pub(super) fn spawn_unlock(
    gate: Arc<AccessGate>,
    song: SongRecord,
    password: String,
    ticket: UnlockTicket,
    tx: Sender<UnlockOutcome>,
) -> std::io::Result<()> {
    thread::Builder::new()
        .name(format!("unlock-{}", ticket.song))
        .spawn(move || {
            debug!(song = %ticket.song, generation = ticket.generation, "unlock started");
            let result = gate.verify(&song, &password);
            let _ = tx.send(UnlockOutcome { ticket, result });
        })?;
    Ok(())
}
