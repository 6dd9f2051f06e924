//! The audio output seam.
//!
//! The playback session is the only writer to an [`AudioSink`]; the sink
//! reports progress back through [`AudioSink::poll_event`].

use std::time::Duration;

use crate::access::PlayableAsset;
use crate::error::PlaybackError;

/// Something that can play one in-memory asset at a time.
pub trait AudioSink {
    /// Replace the current source. The sink starts out paused.
    fn set_source(&mut self, asset: &PlayableAsset) -> Result<(), PlaybackError>;
    /// Start or resume. Hosts may refuse (e.g. autoplay restrictions).
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError>;
    /// Linear gain in `0.0..=1.0`.
    fn set_volume(&mut self, volume: f32);
    /// Next pending progress or end-of-track notification, if any.
    fn poll_event(&mut self) -> Option<SinkEvent> {
        None
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    /// Playback position advanced.
    TimeUpdated(Duration),
    /// The source played to its end.
    Ended,
}
