//! Sphere Player - Playback Controls
//!
//! Platform-agnostic control layer for an immersive (360°) video player.
//!
//! This crate provides:
//! - Play/pause with first-play unmute and recoverable play rejections
//! - Relative seek (rewind/forward) clamped to the media duration
//! - Scrubber synchronization: time updates are suppressed while the user
//!   holds the scrubber, then committed on release
//! - Off-screen preload with stale-attempt protection
//! - The motion-sensor permission flow for platforms that gate it
//! - Time labels (`M:SS`), progress fill and transient status notices
//!
//! # Architecture
//!
//! `sphere-controls` never touches a DOM or a decoder:
//! - The media element is reached through [`MediaSource`]
//! - The motion permission API through [`GatedMotionCapability`]
//! - The camera rig through [`CameraReset`]
//!
//! Every component is an explicit state machine driven by named inputs.
//! Asynchronous platform operations (play promise, preload fetch,
//! permission request) are reported back as inputs, so hosts can use
//! callbacks, futures or message channels. With the `wasm` feature the
//! crate binds itself to a browser `<video>` element.
//!
//! # Example: Scrubbing
//!
//! ```rust
//! use sphere_controls::{MediaSource, PlayerConfig, PlayerSession};
//!
//! struct Video { time: f64, muted: bool }
//!
//! impl MediaSource for Video {
//!     fn play(&mut self) {}
//!     fn pause(&mut self) {}
//!     fn current_time(&self) -> f64 { self.time }
//!     fn set_current_time(&mut self, seconds: f64) { self.time = seconds; }
//!     fn duration(&self) -> f64 { 300.0 }
//!     fn is_muted(&self) -> bool { self.muted }
//!     fn set_muted(&mut self, muted: bool) { self.muted = muted; }
//! }
//!
//! let video = Video { time: 0.0, muted: true };
//! let mut session = PlayerSession::new(video, "/v/tour.mp4", PlayerConfig::default());
//!
//! session.on_time_update(75.0, 300.0);
//! assert_eq!(session.view().current_label, "1:15");
//! assert_eq!(session.view().progress_percent, 25.0);
//!
//! // Ticks are dropped while the scrubber is held
//! session.begin_scrub();
//! session.update_scrub_preview(150.0);
//! session.on_time_update(76.0, 300.0);
//! assert_eq!(session.view().current_label, "2:30");
//!
//! session.commit_scrub(150.0);
//! assert_eq!(session.state().current_position_secs, 150.0);
//! ```
//!
//! # Example: Play Requests
//!
//! ```rust
//! # use sphere_controls::{MediaSource, PlayerConfig, PlayerSession};
//! # struct Video { muted: bool }
//! # impl MediaSource for Video {
//! #     fn play(&mut self) {}
//! #     fn pause(&mut self) {}
//! #     fn current_time(&self) -> f64 { 0.0 }
//! #     fn set_current_time(&mut self, _: f64) {}
//! #     fn duration(&self) -> f64 { 60.0 }
//! #     fn is_muted(&self) -> bool { self.muted }
//! #     fn set_muted(&mut self, muted: bool) { self.muted = muted; }
//! # }
//! use sphere_controls::PlayPauseAction;
//!
//! let mut session = PlayerSession::new(Video { muted: true }, "/v/tour.mp4", PlayerConfig::default());
//!
//! // First play unmutes, then waits for the platform
//! assert_eq!(session.toggle_play_pause(), PlayPauseAction::PlayRequested);
//! assert!(!session.state().is_muted);
//!
//! // Autoplay policy said no: reported, still paused, retry allowed
//! assert!(session.resolve_play(Err("NotAllowedError".into())).is_err());
//! assert!(!session.state().is_playing);
//! assert_eq!(session.toggle_play_pause(), PlayPauseAction::PlayRequested);
//! ```

pub mod display;
mod error;
pub mod events;
mod keyboard;
mod media;
mod permission;
mod preload;
mod scene;
mod session;
mod sync;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use display::{format_time, progress_percent, ScrubberView};
pub use error::{ControlError, Result};
pub use events::{ControlEvent, Notice};
pub use keyboard::{ShortcutAction, ShortcutGate};
pub use media::{CameraReset, MediaSource};
pub use permission::{GatedMotionCapability, PermissionFlow};
pub use preload::{PreloadAttempt, PreloadCoordinator, ResourceLoader};
pub use scene::SceneInfo;
pub use session::PlayerSession;
pub use sync::{PlayPauseAction, PlaybackSyncController};
pub use types::{
    DeviceKind, PermissionResponse, PermissionStatus, PlaybackState, PlayerConfig, PreloadStatus,
};
