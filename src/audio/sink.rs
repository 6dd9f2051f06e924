//! `rodio`-backed [`AudioSink`] playing decrypted assets from memory.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};

use crate::access::PlayableAsset;
use crate::error::PlaybackError;

use super::types::{AudioSink, SinkEvent};

pub struct RodioSink {
    stream: OutputStream,
    sink: Option<Sink>,
    volume: f32,
    playing: bool,
    progress: Progress,
}

/// What a playing sink still owes its listener: each position once, and a
/// single `Ended` when the queue runs dry.
#[derive(Debug, Default)]
pub(crate) struct Progress {
    last_reported: Option<Duration>,
    ended_reported: bool,
}

impl Progress {
    /// A new source or a seek starts reporting afresh.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn observe(&mut self, playing: bool, drained: bool, pos: Duration) -> Option<SinkEvent> {
        if !playing {
            return None;
        }
        if drained {
            if self.ended_reported {
                return None;
            }
            self.ended_reported = true;
            return Some(SinkEvent::Ended);
        }
        if self.last_reported == Some(pos) {
            return None;
        }
        self.last_reported = Some(pos);
        Some(SinkEvent::TimeUpdated(pos))
    }
}

impl RodioSink {
    /// Open the default output device.
    pub fn open_default() -> Result<Self, PlaybackError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlaybackError::Rejected(format!("no audio output device: {e}")))?;
        // rodio logs to stderr when the stream is dropped.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            volume: 1.0,
            playing: false,
            progress: Progress::default(),
        })
    }
}

impl AudioSink for RodioSink {
    fn set_source(&mut self, asset: &PlayableAsset) -> Result<(), PlaybackError> {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.playing = false;
        self.progress.reset();

        let bytes: Arc<[u8]> = asset.bytes.clone();
        let source = Decoder::new(Cursor::new(bytes))
            .map_err(|e| PlaybackError::Rejected(format!("cannot decode {}: {e}", asset.mime)))?;

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.pause();
        self.sink = Some(sink);
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let sink = self.sink.as_ref().ok_or(PlaybackError::NoSource)?;
        sink.play();
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(ref s) = self.sink {
            s.pause();
        }
        self.playing = false;
    }

    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
        let sink = self.sink.as_ref().ok_or(PlaybackError::NoSource)?;
        sink.try_seek(position)
            .map_err(|e| PlaybackError::Rejected(format!("seek failed: {e}")))?;
        self.progress.reset();
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(ref s) = self.sink {
            s.set_volume(self.volume);
        }
    }

    fn poll_event(&mut self) -> Option<SinkEvent> {
        let sink = self.sink.as_ref()?;
        let event = self.progress.observe(self.playing, sink.empty(), sink.get_pos());
        if event == Some(SinkEvent::Ended) {
            self.playing = false;
        }
        event
    }
}
