//! Playback session: current song, phase, position and volume.

mod model;

pub use model::*;
