//! Error types for player controls

use thiserror::Error;

/// Control errors
///
/// The first three variants are user-facing and recoverable: the session
/// keeps running and the user retries by repeating the originating action.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    /// Off-screen preload of the video resource failed
    #[error("Failed to preload {url}: {reason}")]
    ResourceLoadFailed { url: String, reason: String },

    /// The media element rejected a play request (autoplay policy, codec, network)
    #[error("Playback start failed: {0}")]
    PlaybackStartFailed(String),

    /// The platform raised an error while requesting motion permission
    #[error("Permission request failed: {0}")]
    PermissionRequestFailed(String),

    /// An input arrived in a state that cannot accept it
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(String),
}

impl ControlError {
    /// Whether the session can continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ResourceLoadFailed { .. }
                | Self::PlaybackStartFailed(_)
                | Self::PermissionRequestFailed(_)
        )
    }

    /// Stable short name used in events and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ResourceLoadFailed { .. } => "resource_load_failed",
            Self::PlaybackStartFailed(_) => "playback_start_failed",
            Self::PermissionRequestFailed(_) => "permission_request_failed",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::Config(_) => "config",
        }
    }

    /// Transient status text shown to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::ResourceLoadFailed { .. } => {
                "Error preloading video. Click play to try again.".to_string()
            }
            Self::PlaybackStartFailed(_) => "Error playing video. Please try again.".to_string(),
            Self::PermissionRequestFailed(_) => "Error enabling motion controls.".to_string(),
            Self::InvalidTransition(_) | Self::Config(_) => self.to_string(),
        }
    }
}

impl From<serde_json::Error> for ControlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_errors_are_recoverable() {
        assert!(ControlError::PlaybackStartFailed("NotAllowedError".into()).is_recoverable());
        assert!(ControlError::PermissionRequestFailed("boom".into()).is_recoverable());
        assert!(ControlError::ResourceLoadFailed {
            url: "a.mp4".into(),
            reason: "404".into()
        }
        .is_recoverable());
        assert!(!ControlError::InvalidTransition("x".into()).is_recoverable());
    }

    #[test]
    fn user_messages_match_player_copy() {
        assert_eq!(
            ControlError::PlaybackStartFailed("x".into()).user_message(),
            "Error playing video. Please try again."
        );
        assert_eq!(
            ControlError::PermissionRequestFailed("x".into()).user_message(),
            "Error enabling motion controls."
        );
    }
}
