//! Player session - ties the controls together
//!
//! Owns the sync controller, the preload coordinator, the permission flow
//! and the page-level flags for first play and input focus. It also owns
//! the status-notice copy so hosts only have to render events.

use crate::{
    display::ScrubberView,
    error::{ControlError, Result},
    events::{ControlEvent, Notice, NoticeBoard},
    keyboard::{ShortcutAction, ShortcutGate},
    media::{CameraReset, MediaSource},
    permission::{GatedMotionCapability, PermissionFlow},
    preload::{PreloadAttempt, PreloadCoordinator},
    scene::SceneInfo,
    sync::{PlayPauseAction, PlaybackSyncController},
    types::{PermissionResponse, PermissionStatus, PlaybackState, PlayerConfig},
};
use tracing::{error, info};

const PRELOADING: &str = "Preloading video...";
const PRELOADED: &str = "Video preloaded. Click play to start.";
const LOADING: &str = "Loading video...";
const METADATA_READY: &str = "Video ready. Click play to start.";
const MEDIA_ERROR: &str = "Error loading video";
const LOADED_MOBILE: &str = "360° Video Loaded. Use your phone to look around.";
const LOADED_DESKTOP: &str = "360° Video Loaded. Use your mouse to look around.";
const MOTION_GRANTED: &str = "Motion controls enabled. Use your phone to look around.";
const MOTION_DENIED: &str = "Motion controls denied. Use touch to look around.";
const CAMERA_RESET: &str = "Camera view reset";

/// One player page's control state
pub struct PlayerSession<M: MediaSource> {
    config: PlayerConfig,
    video_url: String,
    controller: PlaybackSyncController<M>,
    preload: PreloadCoordinator,
    permission: PermissionFlow,
    shortcuts: ShortcutGate,
    scene: SceneInfo,
    notices: NoticeBoard,
    started: bool,
    pending_events: Vec<ControlEvent>,
}

impl<M: MediaSource> PlayerSession<M> {
    /// Create a session for the visible media element and its source URL
    pub fn new(media: M, video_url: impl Into<String>, config: PlayerConfig) -> Self {
        let video_url = video_url.into();
        let scene = SceneInfo::new(config.scene_name.clone(), config.playlist_name.clone())
            .merge(SceneInfo::from_video_path(&video_url, None).unwrap_or_default());

        Self {
            controller: PlaybackSyncController::new(media, &config),
            preload: PreloadCoordinator::new(),
            permission: PermissionFlow::not_required(),
            shortcuts: ShortcutGate::new(config.device),
            scene,
            notices: NoticeBoard::new(),
            started: false,
            pending_events: Vec::new(),
            video_url,
            config,
        }
    }

    // ===== Startup =====

    /// Begin the preload and, on mobile, detect the motion permission gate
    ///
    /// The host performs the off-screen load for the returned attempt and
    /// reports back through `preload_ready` / `preload_failed`. A session
    /// starts once; later calls fail without side effects and retries go
    /// through `retry_preload`.
    pub fn start<C: GatedMotionCapability + ?Sized>(&mut self, capability: &C) -> Result<PreloadAttempt> {
        if self.started {
            return Err(ControlError::InvalidTransition(
                "session already started".to_string(),
            ));
        }

        info!(url = %self.video_url, device = ?self.config.device, "Starting player session");
        let attempt = self.start_preload()?;
        if self.config.device.is_mobile() {
            self.permission = PermissionFlow::detect(capability);
        }
        self.started = true;
        Ok(attempt)
    }

    /// User asked to retry a failed preload
    pub fn retry_preload(&mut self) -> Result<PreloadAttempt> {
        self.start_preload()
    }

    fn start_preload(&mut self) -> Result<PreloadAttempt> {
        let attempt = self.preload.start(&self.video_url)?;
        self.notice(PRELOADING, None);
        Ok(attempt)
    }

    /// Off-screen resource can play through
    pub fn preload_ready(&mut self, attempt: PreloadAttempt) -> bool {
        let accepted = self.preload.on_playable(attempt);
        if accepted {
            self.notice(PRELOADED, Some(self.config.notice_hide_ms));
        }
        accepted
    }

    /// Off-screen resource failed to load
    pub fn preload_failed(&mut self, attempt: PreloadAttempt, reason: &str) -> Option<ControlError> {
        let err = self.preload.on_load_error(attempt, reason)?;
        self.notice(err.user_message(), None);
        Some(err)
    }

    // ===== Playback =====

    /// Play/pause button or shortcut
    ///
    /// Playing never waits for the preload; if it isn't ready yet a
    /// loading notice is shown until the play request resolves.
    pub fn toggle_play_pause(&mut self) -> PlayPauseAction {
        let action = self.controller.toggle_play_pause();
        if action == PlayPauseAction::PlayRequested && !self.preload.is_ready() {
            self.notice(LOADING, None);
        }
        action
    }

    /// Outcome of the outstanding play request
    pub fn resolve_play(&mut self, outcome: std::result::Result<(), String>) -> Result<()> {
        match self.controller.resolve_play(outcome) {
            Ok(()) => {
                self.collect();
                if let Some(id) = self.notices.clear_if_text(LOADING) {
                    self.pending_events.push(ControlEvent::NoticeCleared { id });
                }
                Ok(())
            }
            Err(err @ ControlError::PlaybackStartFailed(_)) => {
                self.notice(err.user_message(), None);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Rewind button
    pub fn seek_backward(&mut self) -> Option<f64> {
        self.controller.seek_backward()
    }

    /// Forward button
    pub fn seek_forward(&mut self) -> Option<f64> {
        self.controller.seek_forward()
    }

    /// Seek by a signed offset
    pub fn seek_relative(&mut self, delta_secs: f64) -> Option<f64> {
        self.controller.seek_relative(delta_secs)
    }

    /// Mute button; returns the new mute flag
    pub fn toggle_mute(&mut self) -> bool {
        self.controller.toggle_mute()
    }

    // ===== Scrubber =====

    /// Pointer or touch pressed on the scrubber
    pub fn begin_scrub(&mut self) {
        self.controller.begin_scrub();
    }

    /// Scrubber value changed while held
    pub fn update_scrub_preview(&mut self, position_secs: f64) -> Option<ScrubberView> {
        self.controller.update_scrub_preview(position_secs)
    }

    /// Pointer or touch released
    pub fn commit_scrub(&mut self, position_secs: f64) -> f64 {
        self.controller.commit_scrub(position_secs)
    }

    // ===== Media Events =====

    /// Media `timeupdate`
    pub fn on_time_update(&mut self, position_secs: f64, duration_secs: f64) -> bool {
        self.controller.on_time_update(position_secs, duration_secs)
    }

    /// Media `loadedmetadata`
    pub fn on_loaded_metadata(&mut self, duration_secs: f64) {
        self.controller.on_loaded_metadata(duration_secs);
        if !self.preload.is_ready() {
            self.notice(METADATA_READY, None);
        }
    }

    /// Media `loadeddata`
    pub fn on_loaded_data(&mut self) {
        let text = if self.config.device.is_mobile() {
            LOADED_MOBILE
        } else {
            LOADED_DESKTOP
        };
        self.notice(text, Some(self.config.notice_hide_ms));
    }

    /// Media `error`
    pub fn on_media_error(&mut self, reason: &str) {
        error!(reason, "Video error");
        self.notice(MEDIA_ERROR, None);
    }

    // ===== Motion Permission =====

    /// Consent gesture; runs the platform request to completion
    pub async fn request_motion_permission<C: GatedMotionCapability + ?Sized>(
        &mut self,
        capability: &C,
    ) -> Result<PermissionStatus> {
        let status = self.permission.request(capability).await?;
        self.announce_permission(status);
        Ok(status)
    }

    /// Consent gesture for hosts that await the platform promise themselves
    pub fn begin_motion_request(&mut self) -> Result<()> {
        self.permission.begin_request()
    }

    /// Platform answered the permission request
    pub fn resolve_motion_permission(&mut self, response: PermissionResponse) -> Result<PermissionStatus> {
        let status = self.permission.resolve(response)?;
        self.announce_permission(status);
        Ok(status)
    }

    /// Platform rejected the permission request
    pub fn reject_motion_permission(&mut self, reason: &str) -> Result<PermissionStatus> {
        let status = self.permission.reject(reason)?;
        self.announce_permission(status);
        Ok(status)
    }

    fn announce_permission(&mut self, status: PermissionStatus) {
        let text = match status {
            PermissionStatus::Granted => MOTION_GRANTED.to_string(),
            PermissionStatus::Denied => MOTION_DENIED.to_string(),
            PermissionStatus::Error => {
                ControlError::PermissionRequestFailed(String::new()).user_message()
            }
            PermissionStatus::NotRequired | PermissionStatus::Pending => return,
        };
        self.notice(text, Some(self.config.notice_hide_ms));
    }

    // ===== Keyboard / Camera =====

    /// Key press; returns the playback action when a shortcut fired
    pub fn on_key(&mut self, code: &str) -> Option<PlayPauseAction> {
        match self.shortcuts.on_key(code)? {
            ShortcutAction::TogglePlayPause => Some(self.toggle_play_pause()),
        }
    }

    /// Focus entered an element
    pub fn focus_in(&mut self, tag_name: &str) {
        self.shortcuts.focus_in(tag_name);
    }

    /// Focus left an element
    pub fn focus_out(&mut self, tag_name: &str) {
        self.shortcuts.focus_out(tag_name);
    }

    /// Reset button; returns false when the look controls aren't ready
    pub fn reset_camera(&mut self, camera: &mut dyn CameraReset) -> bool {
        if !camera.reset_orientation() {
            return false;
        }
        self.collect();
        self.pending_events.push(ControlEvent::CameraReset);
        self.notice(CAMERA_RESET, Some(self.config.camera_notice_hide_ms));
        true
    }

    // ===== Notices =====

    /// A timed notice's delay elapsed; hides it if still current
    pub fn expire_notice(&mut self, id: u64) -> bool {
        let hidden = self.notices.expire(id);
        if hidden {
            self.collect();
            self.pending_events.push(ControlEvent::NoticeCleared { id });
        }
        hidden
    }

    /// Notice currently on screen
    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.current()
    }

    fn notice(&mut self, text: impl Into<String>, hide_after_ms: Option<u64>) {
        // Keep component events ahead of the notice they caused
        self.collect();
        let notice = self.notices.post(text, hide_after_ms);
        self.pending_events.push(ControlEvent::Notice(notice));
    }

    // ===== State Queries =====

    /// Playback state
    pub fn state(&self) -> &PlaybackState {
        self.controller.state()
    }

    /// Derived scrubber view
    pub fn view(&self) -> ScrubberView {
        self.controller.view()
    }

    /// Sync controller
    pub fn controller(&self) -> &PlaybackSyncController<M> {
        &self.controller
    }

    /// Mutably borrow the media source
    pub fn media_mut(&mut self) -> &mut M {
        self.controller.media_mut()
    }

    /// Preload coordinator
    pub fn preload(&self) -> &PreloadCoordinator {
        &self.preload
    }

    /// Permission flow
    pub fn permission(&self) -> &PermissionFlow {
        &self.permission
    }

    /// Scene labels
    pub fn scene(&self) -> &SceneInfo {
        &self.scene
    }

    /// Session configuration
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Source URL of the video
    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    // ===== Events =====

    /// Drain all pending events, in emission order
    pub fn drain_events(&mut self) -> Vec<ControlEvent> {
        self.collect();
        std::mem::take(&mut self.pending_events)
    }

    fn collect(&mut self) {
        self.pending_events.extend(self.controller.drain_events());
        self.pending_events.extend(self.preload.drain_events());
        self.pending_events.extend(self.permission.drain_events());
    }
}
