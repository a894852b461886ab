//! Host capability traits
//!
//! Abstracts the media element and the camera rig so the control layer
//! runs the same on a browser page and in tests without a DOM.

/// Media element exposed by the host
///
/// The controller is the only writer of position and mute state. Playback
/// start is asynchronous on every platform we target: `play` only issues
/// the request, and the host reports the outcome back through
/// `PlaybackSyncController::resolve_play`.
pub trait MediaSource {
    /// Issue a play request
    fn play(&mut self);

    /// Pause playback (always succeeds synchronously)
    fn pause(&mut self);

    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Move playback to a position in seconds
    fn set_current_time(&mut self, seconds: f64);

    /// Media duration in seconds (NaN or 0 before metadata)
    fn duration(&self) -> f64;

    /// Whether audio is muted
    fn is_muted(&self) -> bool;

    /// Mute or unmute audio
    fn set_muted(&mut self, muted: bool);
}

/// Look-controls orientation reset
pub trait CameraReset {
    /// Reset the camera to identity orientation
    ///
    /// Returns false when the look controls are not initialized yet.
    fn reset_orientation(&mut self) -> bool;
}

/// Media source that records calls, for unit tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingMedia {
    pub position: f64,
    pub duration: f64,
    pub muted: bool,
    pub play_calls: usize,
    pub pause_calls: usize,
    pub seeks: Vec<f64>,
}

#[cfg(test)]
impl RecordingMedia {
    /// Create a muted media source with the given duration
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            muted: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl MediaSource for RecordingMedia {
    fn play(&mut self) {
        self.play_calls += 1;
    }

    fn pause(&mut self) {
        self.pause_calls += 1;
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.position = seconds;
        self.seeks.push(seconds);
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}
