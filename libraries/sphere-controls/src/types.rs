//! Core types for player controls

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Playback state owned by the sync controller
///
/// `current_position_secs` never exceeds `duration_secs`. While
/// `is_scrubbing` is set, media time updates do not touch the position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Media is playing (play request resolved, not paused since)
    pub is_playing: bool,

    /// Media audio is muted
    pub is_muted: bool,

    /// Last committed playback position in seconds
    pub current_position_secs: f64,

    /// Media duration in seconds (0 until metadata is known)
    pub duration_secs: f64,

    /// User is holding the scrubber
    pub is_scrubbing: bool,

    /// A play request has been issued at least once
    pub has_ever_played: bool,
}

impl PlaybackState {
    /// Initial state for a media element with the given mute flag
    pub fn new(is_muted: bool) -> Self {
        Self {
            is_playing: false,
            is_muted,
            current_position_secs: 0.0,
            duration_secs: 0.0,
            is_scrubbing: false,
            has_ever_played: false,
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        // Players start muted so the page may autoplay-preload
        Self::new(true)
    }
}

/// Preload status
///
/// Moves forward only: Idle -> Loading -> Ready | Failed.
/// Failed may re-enter Loading on user retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreloadStatus {
    /// Nothing requested yet
    Idle,

    /// Off-screen fetch in progress
    Loading,

    /// Resource reached the playable threshold
    Ready,

    /// Fetch failed; retry allowed
    Failed,
}

impl PreloadStatus {
    /// Whether a new attempt may start; Loading is superseded, Ready is final
    pub fn can_start(self) -> bool {
        self != Self::Ready
    }
}

/// Motion permission status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    /// Platform has no gated request API (terminal)
    NotRequired,

    /// Waiting for the user gesture or the platform answer
    Pending,

    /// User granted access (terminal)
    Granted,

    /// User denied access (terminal)
    Denied,

    /// Platform rejected the request (terminal)
    Error,
}

impl PermissionStatus {
    /// Whether the flow has finished
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Answer from the gated capability request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionResponse {
    Granted,
    Denied,
}

impl PermissionResponse {
    /// Parse the platform string answer; anything but "granted" is a denial
    pub fn from_platform(answer: &str) -> Self {
        if answer == "granted" {
            Self::Granted
        } else {
            Self::Denied
        }
    }
}

/// Device class, decides look-around copy and whether shortcuts apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Mouse and keyboard
    Desktop,

    /// Touch device with motion sensors
    Mobile,
}

/// User agent fragments that mark a mobile browser
const MOBILE_AGENT_MARKERS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

impl DeviceKind {
    /// Classify a browser user agent string
    pub fn from_user_agent(user_agent: &str) -> Self {
        let agent = user_agent.to_ascii_lowercase();
        if MOBILE_AGENT_MARKERS.iter().any(|m| agent.contains(m)) {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    /// Whether this is a mobile device
    pub fn is_mobile(self) -> bool {
        self == Self::Mobile
    }
}

/// Configuration for a player session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Rewind/forward step in seconds (default: 10)
    pub seek_step_secs: f64,

    /// Unmute the media on the first play request (default: true)
    pub unmute_on_first_play: bool,

    /// Auto-hide delay for status notices (default: 3000 ms)
    pub notice_hide_ms: u64,

    /// Auto-hide delay for the camera reset notice (default: 1500 ms)
    pub camera_notice_hide_ms: u64,

    /// Device class (default: Desktop)
    pub device: DeviceKind,

    /// Scene name shown in the info panel
    pub scene_name: Option<String>,

    /// Playlist name shown in the info panel
    pub playlist_name: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            seek_step_secs: 10.0,
            unmute_on_first_play: true,
            notice_hide_ms: 3000,
            camera_notice_hide_ms: 1500,
            device: DeviceKind::Desktop,
            scene_name: None,
            playlist_name: None,
        }
    }
}

impl PlayerConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.seek_step_secs, 10.0);
        assert!(config.unmute_on_first_play);
        assert_eq!(config.notice_hide_ms, 3000);
        assert_eq!(config.camera_notice_hide_ms, 1500);
        assert_eq!(config.device, DeviceKind::Desktop);
    }

    #[test]
    fn partial_json_config_keeps_defaults() {
        let config =
            PlayerConfig::from_json(r#"{"seek_step_secs": 5.0, "device": "mobile"}"#).unwrap();
        assert_eq!(config.seek_step_secs, 5.0);
        assert_eq!(config.device, DeviceKind::Mobile);
        assert_eq!(config.notice_hide_ms, 3000);
    }

    #[test]
    fn malformed_json_config_is_config_error() {
        let err = PlayerConfig::from_json("{not json").unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn user_agent_classification() {
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
        let desktop = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/120.0";
        assert_eq!(DeviceKind::from_user_agent(iphone), DeviceKind::Mobile);
        assert_eq!(DeviceKind::from_user_agent(desktop), DeviceKind::Desktop);
        assert_eq!(
            DeviceKind::from_user_agent("Opera/9.80 (J2ME/MIDP; Opera Mini/9.80)"),
            DeviceKind::Mobile
        );
    }

    #[test]
    fn preload_start_allowed_until_ready() {
        assert!(PreloadStatus::Idle.can_start());
        assert!(PreloadStatus::Loading.can_start());
        assert!(PreloadStatus::Failed.can_start());
        assert!(!PreloadStatus::Ready.can_start());
    }

    #[test]
    fn permission_terminal_states() {
        assert!(!PermissionStatus::Pending.is_terminal());
        assert!(PermissionStatus::NotRequired.is_terminal());
        assert!(PermissionStatus::Granted.is_terminal());
        assert!(PermissionStatus::Denied.is_terminal());
        assert!(PermissionStatus::Error.is_terminal());
    }

    #[test]
    fn platform_answer_parsing() {
        assert_eq!(PermissionResponse::from_platform("granted"), PermissionResponse::Granted);
        assert_eq!(PermissionResponse::from_platform("denied"), PermissionResponse::Denied);
        assert_eq!(PermissionResponse::from_platform("prompt"), PermissionResponse::Denied);
    }
}
