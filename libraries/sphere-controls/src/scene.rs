//! Scene and playlist information

use serde::{Deserialize, Serialize};

/// Labels for the info panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneInfo {
    pub scene_name: Option<String>,
    pub playlist_name: Option<String>,
}

impl SceneInfo {
    /// Create scene info from explicit labels
    pub fn new(scene_name: Option<String>, playlist_name: Option<String>) -> Self {
        Self {
            scene_name,
            playlist_name,
        }
    }

    /// Extract the scene name from a video path
    ///
    /// Files are named `YYYY-MM-DD-SCENE-...`; the fourth dash-separated
    /// token is the scene, title-cased. Returns `None` when the name has
    /// fewer than four tokens.
    pub fn from_video_path(path: &str, playlist_name: Option<String>) -> Option<Self> {
        let filename = path.rsplit('/').next().filter(|f| !f.is_empty())?;
        let token = filename.split('-').nth(3).filter(|t| !t.is_empty())?;

        let mut chars = token.chars();
        let first = chars.next()?;
        let scene: String = first.to_string() + &chars.as_str().to_lowercase();

        Some(Self::new(Some(scene), playlist_name))
    }

    /// Fill unset labels from `other`
    pub fn merge(self, other: SceneInfo) -> Self {
        Self {
            scene_name: self.scene_name.or(other.scene_name),
            playlist_name: self.playlist_name.or(other.playlist_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_scene_from_dated_filename() {
        let info = SceneInfo::from_video_path(
            "https://cdn.example.com/v/2025-03-08-JAPANTOWN-XR1-LOW.mp4",
            Some("San Francisco 360°".to_string()),
        )
        .unwrap();
        assert_eq!(info.scene_name.as_deref(), Some("Japantown"));
        assert_eq!(info.playlist_name.as_deref(), Some("San Francisco 360°"));
    }

    #[test]
    fn short_filenames_yield_none() {
        assert!(SceneInfo::from_video_path("/v/intro.mp4", None).is_none());
        assert!(SceneInfo::from_video_path("/v/2025-03-08.mp4", None).is_none());
        assert!(SceneInfo::from_video_path("/v/", None).is_none());
    }

    #[test]
    fn merge_prefers_explicit_labels() {
        let explicit = SceneInfo::new(Some("Mission".into()), None);
        let derived = SceneInfo::new(Some("Japantown".into()), Some("SF".into()));
        let merged = explicit.merge(derived);
        assert_eq!(merged.scene_name.as_deref(), Some("Mission"));
        assert_eq!(merged.playlist_name.as_deref(), Some("SF"));
    }
}
