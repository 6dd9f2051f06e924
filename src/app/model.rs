//! The application controller.
//!
//! `App` owns the library, the genre filter, the playback session and the
//! renderer subscriptions. Unlocks run on worker threads; their outcomes
//! are applied by [`App::pump`] only if they still answer the current
//! request.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::access::AccessGate;
use crate::audio::AudioSink;
use crate::config::{AccessSettings, CatalogSettings, PlaybackSettings};
use crate::error::{AccessError, CatalogLoadError};
use crate::library::{
    CatalogSource, FilterSet, Library, SongId, SongRecord, load_library, next_in_view,
    prev_in_view,
};
use crate::session::{PlaybackSession, PlaybackState, SessionPhase};
use crate::ui::Renderer;

use super::worker::{UnlockOutcome, UnlockTicket, spawn_unlock};

const PLAYBACK_BLOCKED: &str = "Playback was blocked. Press play to start the song.";
const UNLOCK_FAILED: &str = "Could not start decrypting. Please try again.";
/// Upper bound on sink events drained by one [`App::pump`].
const SINK_EVENTS_PER_PUMP: usize = 64;

struct PendingUnlock {
    ticket: UnlockTicket,
    password: String,
}

pub struct App {
    library: Library,
    filter: FilterSet,
    gate: Arc<AccessGate>,
    session: PlaybackSession,
    subscribers: Vec<Box<dyn Renderer>>,
    autoplay: bool,

    /// Song whose password prompt is open.
    prompt: Option<SongId>,
    pending: Option<PendingUnlock>,
    generation: u64,
    /// Passwords that unlocked a song this session, for next/previous.
    passwords: HashMap<SongId, String>,

    tx: Sender<UnlockOutcome>,
    rx: Receiver<UnlockOutcome>,
}

impl App {
    pub fn new(
        library: Library,
        gate: Arc<AccessGate>,
        sink: Box<dyn AudioSink>,
        playback: &PlaybackSettings,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<UnlockOutcome>();
        Self {
            library,
            filter: FilterSet::new(),
            gate,
            session: PlaybackSession::new(sink, playback.volume),
            subscribers: Vec::new(),
            autoplay: playback.autoplay,
            prompt: None,
            pending: None,
            generation: 0,
            passwords: HashMap::new(),
            tx,
            rx,
        }
    }

    /// Register a renderer and bring it up to date.
    pub fn subscribe(&mut self, mut renderer: Box<dyn Renderer>) {
        renderer.render(&self.library.filter(&self.filter));
        renderer.update_playback(self.session.state());
        self.subscribers.push(renderer);
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn filter(&self) -> &FilterSet {
        &self.filter
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn playback(&self) -> &PlaybackState {
        self.session.state()
    }

    pub fn prompt(&self) -> Option<SongId> {
        self.prompt
    }

    pub fn unlock_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The filtered view, in library order.
    pub fn view(&self) -> Vec<&SongRecord> {
        self.library.filter(&self.filter)
    }

    pub fn view_ids(&self) -> Vec<SongId> {
        self.library.filtered_ids(&self.filter)
    }

    /// Replace the library from `source`.
    ///
    /// On failure the current library stays and subscribers see the error.
    /// Returns how many songs were loaded.
    pub fn reload(
        &mut self,
        source: &dyn CatalogSource,
        catalog: &CatalogSettings,
        access: &AccessSettings,
    ) -> Result<usize, CatalogLoadError> {
        let outcome = match load_library(source, catalog, access) {
            Ok(o) => o,
            Err(e) => {
                warn!(error = %e, "catalog load failed");
                self.notify_error("The music catalog could not be loaded.");
                return Err(e);
            }
        };

        self.library = outcome.library;
        self.passwords
            .retain(|id, _| self.library.get(*id).is_some());
        if let Some(cur) = self.session.current() {
            if self.library.get(cur).is_none() {
                self.session.reset();
            }
        }
        if self.prompt.is_some_and(|id| self.library.get(id).is_none()) {
            self.prompt = None;
        }

        self.notify_view();
        self.notify_playback();
        Ok(self.library.len())
    }

    // Genre filter.

    pub fn toggle_genre(&mut self, genre: &str) -> bool {
        let selected = self.filter.toggle(genre);
        self.notify_view();
        selected
    }

    pub fn set_filter(&mut self, filter: FilterSet) {
        self.filter = filter;
        self.notify_view();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.notify_view();
    }

    // Password prompt.

    /// Open the password prompt for `song`. Returns `false` for unknown ids.
    pub fn open_prompt(&mut self, song: SongId) -> bool {
        if self.library.get(song).is_none() {
            return false;
        }
        self.prompt = Some(song);
        true
    }

    /// Close the prompt. An unlock still in flight is abandoned.
    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
        if self.pending.take().is_some() {
            debug!("abandoning in-flight unlock");
            self.notify_decrypting(false);
        }
        if self.session.phase() == SessionPhase::Loading {
            self.session.abort_loading();
            self.notify_playback();
        }
    }

    /// Check `password` for the song in the open prompt.
    ///
    /// Returns `false` when no prompt is open.
    pub fn submit_password(&mut self, password: &str) -> bool {
        let Some(song) = self.prompt else {
            return false;
        };
        self.start_unlock(song, password.to_string());
        true
    }

    fn start_unlock(&mut self, id: SongId, password: String) {
        let Some(song) = self.library.get(id).cloned() else {
            return;
        };

        self.generation += 1;
        let ticket = UnlockTicket {
            song: id,
            generation: self.generation,
        };

        self.session.begin_loading(&song);

        if let Err(e) = spawn_unlock(
            self.gate.clone(),
            song,
            password.clone(),
            ticket,
            self.tx.clone(),
        ) {
            warn!(error = %e, "failed to spawn unlock worker");
            self.pending = None;
            self.session.abort_loading();
            self.notify_error(UNLOCK_FAILED);
            self.notify_playback();
            return;
        }

        self.pending = Some(PendingUnlock { ticket, password });
        self.notify_decrypting(true);
        self.notify_playback();
    }

    // Worker and sink events.

    /// Apply finished unlocks and pending sink events without blocking.
    ///
    /// At most `SINK_EVENTS_PER_PUMP` sink events are taken per call, so a
    /// sink that never runs dry cannot stall the caller. Returns the number
    /// of events handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(outcome) = self.rx.try_recv() {
            self.apply_unlock(outcome);
            handled += 1;
        }
        // Position updates are coalesced into one notification per pump.
        let mut moved = false;
        for _ in 0..SINK_EVENTS_PER_PUMP {
            let Some(event) = self.session.poll_sink() else {
                break;
            };
            handled += 1;
            if self.session.handle_sink_event(event) {
                moved = false;
                self.advance_after_end();
                break;
            }
            moved = true;
        }
        if moved {
            self.notify_playback();
        }
        handled
    }

    /// Block until the current unlock is applied or `timeout` passes.
    ///
    /// Stale outcomes that arrive meanwhile are discarded. Returns whether
    /// an outcome was applied.
    pub fn wait_for_unlock(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pending.is_some() {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(outcome) => {
                    if self.apply_unlock(outcome) {
                        return true;
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return false,
            }
        }
        false
    }

    /// Returns `false` when the outcome no longer matches the request.
    fn apply_unlock(&mut self, outcome: UnlockOutcome) -> bool {
        let current = self.pending.as_ref().map(|p| p.ticket);
        if current != Some(outcome.ticket) {
            debug!(
                song = %outcome.ticket.song,
                generation = outcome.ticket.generation,
                "discarding stale unlock"
            );
            return false;
        }
        let Some(PendingUnlock { ticket, password }) = self.pending.take() else {
            return false;
        };
        self.notify_decrypting(false);

        match outcome.result {
            Ok(asset) => {
                info!(song = %ticket.song, "unlock applied");
                self.passwords.insert(ticket.song, password);
                if self.prompt == Some(ticket.song) {
                    self.prompt = None;
                }

                match self.session.load(&asset) {
                    Ok(_) => {
                        if self.autoplay && self.session.play().is_err() {
                            self.notify_error(PLAYBACK_BLOCKED);
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "could not load unlocked song");
                        self.notify_error("This song could not be played.");
                    }
                }
            }
            Err(e) => {
                self.session.abort_loading();
                if e == AccessError::InvalidPassword {
                    // A remembered password that stopped working is useless now.
                    self.passwords.remove(&ticket.song);
                    if self.prompt.is_none() {
                        self.prompt = Some(ticket.song);
                        self.notify_password_request(ticket.song);
                    }
                }
                self.notify_error(e.user_message());
            }
        }
        self.notify_playback();
        true
    }

    // Player controls.

    pub fn toggle_play(&mut self) {
        if self.session.toggle().is_err() && self.session.state().retry_available {
            self.notify_error(PLAYBACK_BLOCKED);
        }
        self.notify_playback();
    }

    pub fn play(&mut self) {
        if self.session.play().is_err() && self.session.state().retry_available {
            self.notify_error(PLAYBACK_BLOCKED);
        }
        self.notify_playback();
    }

    pub fn pause(&mut self) {
        self.session.pause();
        self.notify_playback();
    }

    /// Close the player: playback stops, the song stays loaded.
    pub fn close_player(&mut self) {
        self.session.stop();
        self.notify_playback();
    }

    pub fn seek(&mut self, position: Duration) {
        if self.session.seek(position) {
            self.notify_playback();
        }
    }

    pub fn seek_fraction(&mut self, fraction: f64) {
        if self.session.seek_fraction(fraction) {
            self.notify_playback();
        }
    }

    pub fn set_volume(&mut self, level: u8) {
        self.session.set_volume(level);
        self.notify_playback();
    }

    /// Skip to the next song in the filtered view, wrapping around.
    pub fn next(&mut self) {
        if let Some(id) = next_in_view(&self.view_ids(), self.session.current()) {
            self.navigate_to(id);
        }
    }

    /// Skip to the previous song in the filtered view, wrapping around.
    pub fn prev(&mut self) {
        if let Some(id) = prev_in_view(&self.view_ids(), self.session.current()) {
            self.navigate_to(id);
        }
    }

    fn advance_after_end(&mut self) {
        if self.session.phase() == SessionPhase::Ended && !self.view_ids().is_empty() {
            self.next();
        } else {
            self.notify_playback();
        }
    }

    /// Load `id` with its remembered password, or ask for one.
    fn navigate_to(&mut self, id: SongId) {
        if let Some(password) = self.passwords.get(&id).cloned() {
            self.prompt = None;
            self.start_unlock(id, password);
            return;
        }

        let Some(song) = self.library.get(id).cloned() else {
            return;
        };
        // Anything still decrypting belongs to the song we are leaving.
        if self.pending.take().is_some() {
            self.notify_decrypting(false);
        }
        self.session.begin_loading(&song);
        self.prompt = Some(id);
        self.notify_password_request(id);
        self.notify_playback();
    }

    // Subscriber dispatch.

    fn notify_view(&mut self) {
        let view = self.library.filter(&self.filter);
        for r in self.subscribers.iter_mut() {
            r.render(&view);
        }
    }

    fn notify_playback(&mut self) {
        let state = self.session.state();
        for r in self.subscribers.iter_mut() {
            r.update_playback(state);
        }
    }

    fn notify_error(&mut self, message: &str) {
        for r in self.subscribers.iter_mut() {
            r.show_error(message);
        }
    }

    fn notify_decrypting(&mut self, active: bool) {
        for r in self.subscribers.iter_mut() {
            r.show_decrypting(active);
        }
    }

    fn notify_password_request(&mut self, id: SongId) {
        let Some(song) = self.library.get(id) else {
            return;
        };
        for r in self.subscribers.iter_mut() {
            r.request_password(song);
        }
    }
}
