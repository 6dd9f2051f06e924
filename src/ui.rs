//! The rendering collaborator.
//!
//! The core never touches layout; it tells every subscribed [`Renderer`]
//! what changed and lets it draw however it likes.

use crate::library::SongRecord;
use crate::session::PlaybackState;

pub trait Renderer {
    /// The filtered song list changed.
    fn render(&mut self, view: &[&SongRecord]);
    fn show_error(&mut self, message: &str);
    /// An unlock is running (or finished).
    fn show_decrypting(&mut self, active: bool);
    fn update_playback(&mut self, state: &PlaybackState);
    /// Navigation reached a song that still needs its password.
    fn request_password(&mut self, _song: &SongRecord) {}
}
