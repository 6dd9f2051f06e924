//! Audio output: the sink trait the playback session drives, plus a
//! `rodio` implementation behind the `rodio-sink` feature.

#[cfg(feature = "rodio-sink")]
mod sink;
mod types;

#[cfg(feature = "rodio-sink")]
pub use sink::RodioSink;
pub use types::{AudioSink, SinkEvent};
