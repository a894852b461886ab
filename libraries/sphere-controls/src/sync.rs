//! Playback/scrubber synchronization
//!
//! Reconciles two input streams into one displayed position:
//! - media time updates from the host element (continuous)
//! - scrub, seek and play/pause inputs from the user
//!
//! While the user holds the scrubber, time updates are dropped rather than
//! queued. After the scrub is committed the next natural time update
//! re-establishes ground truth.

use crate::{
    display::{format_time, ScrubberView},
    error::{ControlError, Result},
    events::ControlEvent,
    media::MediaSource,
    types::{PlaybackState, PlayerConfig},
};
use tracing::{debug, info, trace, warn};

/// Outcome of a play/pause toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayPauseAction {
    /// A play request was issued; completion arrives via `resolve_play`
    PlayRequested,

    /// Playback was paused
    Paused,

    /// A play request is already outstanding; nothing was done
    Ignored,
}

/// Owns the canonical playback position and the scrubber it drives
pub struct PlaybackSyncController<M: MediaSource> {
    media: M,
    state: PlaybackState,

    // Displayed (uncommitted) position while scrubbing
    preview_position: Option<f64>,

    // Single outstanding play request
    play_pending: bool,

    seek_step_secs: f64,
    unmute_on_first_play: bool,

    pending_events: Vec<ControlEvent>,
}

impl<M: MediaSource> PlaybackSyncController<M> {
    /// Create a controller bound to a media source
    pub fn new(media: M, config: &PlayerConfig) -> Self {
        let mut state = PlaybackState::new(media.is_muted());
        state.duration_secs = sanitize_duration(media.duration());
        state.current_position_secs = clamp_position(media.current_time(), state.duration_secs);

        Self {
            media,
            state,
            preview_position: None,
            play_pending: false,
            seek_step_secs: config.seek_step_secs.abs(),
            unmute_on_first_play: config.unmute_on_first_play,
            pending_events: Vec::new(),
        }
    }

    // ===== Play / Pause =====

    /// Toggle between playing and paused
    ///
    /// The first play request ever unmutes the media (when enabled in the
    /// config). Pausing is synchronous; playing only issues the request.
    pub fn toggle_play_pause(&mut self) -> PlayPauseAction {
        if self.play_pending {
            debug!("Play request already outstanding, ignoring toggle");
            return PlayPauseAction::Ignored;
        }

        if self.state.is_playing {
            self.media.pause();
            self.state.is_playing = false;
            info!("Playback paused");
            self.emit(ControlEvent::PlaybackChanged { playing: false });
            return PlayPauseAction::Paused;
        }

        if !self.state.has_ever_played {
            self.state.has_ever_played = true;
            if self.unmute_on_first_play && self.state.is_muted {
                debug!("First play, unmuting media");
                self.set_muted(false);
            }
        }

        self.play_pending = true;
        self.media.play();
        info!("Play requested");
        self.emit(ControlEvent::PlayRequested);
        PlayPauseAction::PlayRequested
    }

    /// Report the outcome of the outstanding play request
    ///
    /// A rejection leaves the controller paused and usable; the next toggle
    /// retries.
    pub fn resolve_play(&mut self, outcome: std::result::Result<(), String>) -> Result<()> {
        if !self.play_pending {
            return Err(ControlError::InvalidTransition(
                "play resolved without an outstanding request".to_string(),
            ));
        }
        self.play_pending = false;

        match outcome {
            Ok(()) => {
                self.state.is_playing = true;
                info!("Playback started");
                self.emit(ControlEvent::PlaybackChanged { playing: true });
                Ok(())
            }
            Err(reason) => {
                warn!(%reason, "Play request rejected");
                let err = ControlError::PlaybackStartFailed(reason);
                self.emit(ControlEvent::Error {
                    kind: err.kind().to_string(),
                    message: err.user_message(),
                });
                Err(err)
            }
        }
    }

    // ===== Seek =====

    /// Seek by a signed offset, clamped to `[0, duration]`
    ///
    /// Ignored while scrubbing. Returns the committed target.
    pub fn seek_relative(&mut self, delta_secs: f64) -> Option<f64> {
        if self.state.is_scrubbing {
            debug!(delta_secs, "Seek ignored while scrubbing");
            return None;
        }

        self.refresh_duration();
        let base = sanitize_position(self.media.current_time());
        let target = clamp_position(base + delta_secs, self.state.duration_secs);
        self.commit_position(target);
        debug!(delta_secs, target, "Relative seek");
        Some(target)
    }

    /// Rewind by the configured step
    pub fn seek_backward(&mut self) -> Option<f64> {
        self.seek_relative(-self.seek_step_secs)
    }

    /// Fast forward by the configured step
    pub fn seek_forward(&mut self) -> Option<f64> {
        self.seek_relative(self.seek_step_secs)
    }

    // ===== Scrubbing =====

    /// User pressed the scrubber; time updates stop moving the display
    pub fn begin_scrub(&mut self) {
        self.state.is_scrubbing = true;
        self.preview_position = Some(self.state.current_position_secs);
        trace!("Scrub started");
    }

    /// Move the displayed position without touching playback
    ///
    /// Returns the new view, or `None` when no scrub is in progress.
    pub fn update_scrub_preview(&mut self, position_secs: f64) -> Option<ScrubberView> {
        if !self.state.is_scrubbing {
            return None;
        }

        self.preview_position = Some(clamp_position(position_secs, self.state.duration_secs));
        let view = self.view();
        self.emit(ControlEvent::ScrubberChanged(view.clone()));
        Some(view)
    }

    /// User released the scrubber; commit the clamped position to playback
    pub fn commit_scrub(&mut self, position_secs: f64) -> f64 {
        self.state.is_scrubbing = false;
        self.preview_position = None;

        self.refresh_duration();
        let target = clamp_position(position_secs, self.state.duration_secs);
        self.commit_position(target);
        debug!(target, "Scrub committed");
        target
    }

    // ===== Media Events =====

    /// Host playback tick
    ///
    /// Dropped while scrubbing. Returns whether the update was applied.
    pub fn on_time_update(&mut self, position_secs: f64, duration_secs: f64) -> bool {
        if self.state.is_scrubbing {
            trace!(position_secs, "Time update dropped while scrubbing");
            return false;
        }

        self.state.duration_secs = sanitize_duration(duration_secs);
        self.state.current_position_secs = clamp_position(position_secs, self.state.duration_secs);
        let view = self.view();
        self.emit(ControlEvent::ScrubberChanged(view));
        true
    }

    /// Media metadata arrived; duration is now known
    pub fn on_loaded_metadata(&mut self, duration_secs: f64) {
        self.state.duration_secs = sanitize_duration(duration_secs);
        self.state.current_position_secs =
            clamp_position(self.state.current_position_secs, self.state.duration_secs);
        info!(duration_secs = self.state.duration_secs, "Media metadata loaded");

        let view = self.view();
        self.emit(ControlEvent::DurationChanged {
            duration_label: format_time(self.state.duration_secs),
            scrubber_max: view.max,
        });
        self.emit(ControlEvent::ScrubberChanged(view));
    }

    // ===== Mute =====

    /// Flip the mute flag; returns the new value
    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.state.is_muted;
        self.set_muted(muted);
        muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.media.set_muted(muted);
        self.state.is_muted = muted;
        self.emit(ControlEvent::MuteChanged { muted });
    }

    // ===== State Queries =====

    /// Current playback state
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Position currently shown to the user (preview while scrubbing)
    pub fn displayed_position(&self) -> f64 {
        self.preview_position
            .unwrap_or(self.state.current_position_secs)
    }

    /// Derived scrubber view for the displayed position
    pub fn view(&self) -> ScrubberView {
        ScrubberView::derive(self.displayed_position(), self.state.duration_secs)
    }

    /// Whether a play request is outstanding
    pub fn is_play_pending(&self) -> bool {
        self.play_pending
    }

    /// Borrow the media source
    pub fn media(&self) -> &M {
        &self.media
    }

    /// Mutably borrow the media source
    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    // ===== Events =====

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<ControlEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn emit(&mut self, event: ControlEvent) {
        self.pending_events.push(event);
    }

    // ===== Internal =====

    fn commit_position(&mut self, target: f64) {
        self.media.set_current_time(target);
        self.state.current_position_secs = target;
        let view = self.view();
        self.emit(ControlEvent::ScrubberChanged(view));
    }

    /// Pick up a duration the media learned since the last tick
    fn refresh_duration(&mut self) {
        let duration = sanitize_duration(self.media.duration());
        if duration > 0.0 {
            self.state.duration_secs = duration;
        }
    }
}

/// Non-finite or negative durations count as unknown (0)
fn sanitize_duration(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

/// Non-finite or negative media times read as the start of the video
fn sanitize_position(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

fn clamp_position(position: f64, duration: f64) -> f64 {
    sanitize_position(position).min(duration)
}
