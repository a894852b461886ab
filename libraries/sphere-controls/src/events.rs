//! Control Events
//!
//! Event-based communication for UI synchronization.
//! Components push events as they transition; the host drains them
//! after every input and renders them. Events are emitted for:
//! - Play/pause and mute changes
//! - Scrubber view changes (time updates, scrub preview, seek)
//! - Preload and permission status changes
//! - Transient status notices

use crate::display::ScrubberView;
use crate::types::{PermissionStatus, PreloadStatus};
use serde::{Deserialize, Serialize};

/// Events emitted by the control layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlEvent {
    /// A play request was handed to the media source
    PlayRequested,

    /// Playing flag changed (play resolved or pause)
    PlaybackChanged {
        /// Whether the media is now playing
        playing: bool,
    },

    /// Mute flag changed
    MuteChanged {
        /// Whether audio is now muted
        muted: bool,
    },

    /// Scrubber, progress fill or time label needs redrawing
    ScrubberChanged(ScrubberView),

    /// Media duration became known
    DurationChanged {
        /// Formatted duration label
        duration_label: String,
        /// New range input max
        scrubber_max: u64,
    },

    /// Preload status changed
    PreloadChanged {
        /// The new preload status
        status: PreloadStatus,
    },

    /// Permission status changed
    PermissionChanged {
        /// The new permission status
        status: PermissionStatus,
        /// Whether the consent affordance should be visible
        show_affordance: bool,
    },

    /// Motion-based look control may be enabled
    MotionLookEnabled,

    /// Show a status notice
    Notice(Notice),

    /// Hide the notice with this id
    NoticeCleared {
        /// Id of the notice being hidden
        id: u64,
    },

    /// Camera orientation was reset
    CameraReset,

    /// Recoverable error surfaced to the user
    Error {
        /// Error kind (see `ControlError::kind`)
        kind: String,
        /// User-facing message
        message: String,
    },
}

/// Transient status message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Monotonic id, used to expire timed notices
    pub id: u64,

    /// Message text
    pub text: String,

    /// Hide after this many milliseconds (None = stays until replaced)
    pub hide_after_ms: Option<u64>,
}

/// Tracks the notice currently on screen
///
/// A timed notice only hides if it is still the current one when its
/// timer fires; a newer notice always wins.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    next_id: u64,
    current: Option<Notice>,
}

impl NoticeBoard {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current notice
    pub fn post(&mut self, text: impl Into<String>, hide_after_ms: Option<u64>) -> Notice {
        self.next_id += 1;
        let notice = Notice {
            id: self.next_id,
            text: text.into(),
            hide_after_ms,
        };
        self.current = Some(notice.clone());
        notice
    }

    /// Hide the notice if it is still current; returns whether it was hidden
    pub fn expire(&mut self, id: u64) -> bool {
        if self.current.as_ref().is_some_and(|n| n.id == id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// Hide the current notice if its text matches; returns its id
    pub fn clear_if_text(&mut self, text: &str) -> Option<u64> {
        match self.current {
            Some(ref notice) if notice.text == text => {
                let id = notice.id;
                self.current = None;
                Some(id)
            }
            _ => None,
        }
    }

    /// Notice currently on screen
    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }
}
