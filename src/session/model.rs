//! Playback session state machine.
//!
//! `Idle -> Loading -> Paused <-> Playing -> Ended`, with the controller
//! taking `Ended` back to `Loading` for the next song in the view.

use std::time::Duration;

use tracing::{debug, warn};

use crate::access::PlayableAsset;
use crate::audio::{AudioSink, SinkEvent};
use crate::error::PlaybackError;
use crate::library::{SongId, SongRecord};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Nothing loaded.
    #[default]
    Idle,
    /// Waiting for the unlock pipeline to hand over an asset.
    Loading,
    /// Source loaded and ready, not producing sound.
    Paused,
    Playing,
    /// The source played to its end.
    Ended,
}

/// Snapshot handed to renderers after every change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackState {
    pub song: Option<SongId>,
    pub phase: SessionPhase,
    pub position: Duration,
    /// 0-100.
    pub volume: u8,
    pub duration: Option<Duration>,
    /// Set when the sink refused to start; the UI should offer a play button.
    pub retry_available: bool,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.phase == SessionPhase::Playing
    }

    /// Position as a fraction of the total duration, for progress bars.
    pub fn progress(&self) -> Option<f64> {
        let total = self.duration?.as_secs_f64();
        if total <= 0.0 {
            return None;
        }
        Some((self.position.as_secs_f64() / total).clamp(0.0, 1.0))
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            song: None,
            phase: SessionPhase::Idle,
            position: Duration::ZERO,
            volume: 100,
            duration: None,
            retry_available: false,
        }
    }
}

/// Owns the audio sink and the only mutable copy of [`PlaybackState`].
pub struct PlaybackSession {
    sink: Box<dyn AudioSink>,
    state: PlaybackState,
    pending_seek: Option<Duration>,
}

impl PlaybackSession {
    pub fn new(mut sink: Box<dyn AudioSink>, volume: u8) -> Self {
        let volume = volume.min(100);
        sink.set_volume(f32::from(volume) / 100.0);
        Self {
            sink,
            state: PlaybackState {
                volume,
                ..PlaybackState::default()
            },
            pending_seek: None,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn current(&self) -> Option<SongId> {
        self.state.song
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.state.phase != phase {
            debug!(from = ?self.state.phase, to = ?phase, "playback phase");
            self.state.phase = phase;
        }
    }

    /// Start waiting for `song`. Whatever was playing is silenced.
    pub fn begin_loading(&mut self, song: &SongRecord) {
        if self.state.phase == SessionPhase::Playing {
            self.sink.pause();
        }
        self.state.song = Some(song.id);
        self.state.position = Duration::ZERO;
        self.state.duration = song.duration;
        self.state.retry_available = false;
        self.pending_seek = None;
        self.set_phase(SessionPhase::Loading);
    }

    /// Give up on the song being loaded.
    pub fn abort_loading(&mut self) {
        if self.state.phase != SessionPhase::Loading {
            return;
        }
        self.state.song = None;
        self.state.duration = None;
        self.state.position = Duration::ZERO;
        self.pending_seek = None;
        self.set_phase(SessionPhase::Idle);
    }

    /// Hand the unlocked asset to the sink. Only meaningful while `Loading`;
    /// otherwise the asset is ignored and `Ok(false)` returned.
    pub fn load(&mut self, asset: &PlayableAsset) -> Result<bool, PlaybackError> {
        if self.state.phase != SessionPhase::Loading {
            debug!(phase = ?self.state.phase, "ignoring asset outside of loading");
            return Ok(false);
        }

        if let Err(e) = self.sink.set_source(asset) {
            warn!(error = %e, "sink rejected source");
            self.state.song = None;
            self.state.duration = None;
            self.set_phase(SessionPhase::Idle);
            return Err(e);
        }
        self.set_phase(SessionPhase::Paused);

        if let Some(pos) = self.pending_seek.take() {
            self.seek(pos);
        }
        Ok(true)
    }

    /// Start or resume. A refusal from the sink leaves the session paused
    /// with a retry offered.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        match self.state.phase {
            SessionPhase::Playing => return Ok(()),
            SessionPhase::Idle | SessionPhase::Loading => return Err(PlaybackError::NoSource),
            SessionPhase::Ended => {
                // Replay from the top.
                self.set_phase(SessionPhase::Paused);
                self.seek(Duration::ZERO);
            }
            SessionPhase::Paused => {}
        }

        match self.sink.play() {
            Ok(()) => {
                self.state.retry_available = false;
                self.set_phase(SessionPhase::Playing);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "playback rejected");
                self.state.retry_available = true;
                self.set_phase(SessionPhase::Paused);
                Err(e)
            }
        }
    }

    pub fn pause(&mut self) {
        if self.state.phase == SessionPhase::Playing {
            self.sink.pause();
            self.set_phase(SessionPhase::Paused);
        }
    }

    pub fn toggle(&mut self) -> Result<(), PlaybackError> {
        if self.state.is_playing() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Closing the player: silence it but keep the song loaded.
    pub fn stop(&mut self) {
        self.pause();
    }

    /// Jump to `position`. Queued while loading, ignored when idle or ended.
    ///
    /// Returns whether the position changed (or was queued).
    pub fn seek(&mut self, position: Duration) -> bool {
        let position = match self.state.duration {
            Some(total) => position.min(total),
            None => position,
        };

        match self.state.phase {
            SessionPhase::Paused | SessionPhase::Playing => match self.sink.seek(position) {
                Ok(()) => {
                    self.state.position = position;
                    true
                }
                Err(e) => {
                    warn!(error = %e, "seek failed");
                    false
                }
            },
            SessionPhase::Loading => {
                self.pending_seek = Some(position);
                true
            }
            SessionPhase::Idle | SessionPhase::Ended => false,
        }
    }

    /// Seek to a fraction of the total duration (progress-bar clicks).
    pub fn seek_fraction(&mut self, fraction: f64) -> bool {
        let Some(total) = self.state.duration else {
            return false;
        };
        if !fraction.is_finite() {
            return false;
        }
        self.seek(total.mul_f64(fraction.clamp(0.0, 1.0)))
    }

    /// Valid in every phase; applied to the sink immediately.
    pub fn set_volume(&mut self, level: u8) {
        let level = level.min(100);
        self.state.volume = level;
        self.sink.set_volume(f32::from(level) / 100.0);
    }

    /// Apply a sink notification. Returns `true` when the track just ended.
    pub fn handle_sink_event(&mut self, event: SinkEvent) -> bool {
        match event {
            SinkEvent::TimeUpdated(pos) => {
                if matches!(
                    self.state.phase,
                    SessionPhase::Playing | SessionPhase::Paused
                ) {
                    self.state.position = pos;
                }
                false
            }
            SinkEvent::Ended => {
                if self.state.phase != SessionPhase::Playing {
                    return false;
                }
                if let Some(total) = self.state.duration {
                    self.state.position = total;
                }
                self.set_phase(SessionPhase::Ended);
                true
            }
        }
    }

    /// Next queued sink notification, if any.
    pub fn poll_sink(&mut self) -> Option<SinkEvent> {
        self.sink.poll_event()
    }

    /// Forget the current song entirely (e.g. after a catalog reload).
    pub fn reset(&mut self) {
        if self.state.phase == SessionPhase::Playing {
            self.sink.pause();
        }
        let volume = self.state.volume;
        self.state = PlaybackState {
            volume,
            ..PlaybackState::default()
        };
        self.pending_seek = None;
    }
}
