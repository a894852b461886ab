//! Off-screen preload of the video resource
//!
//! Fetches the resource to a playable threshold on an independent,
//! muted, never-attached media instance before the user presses play.
//! The visible player is never touched, and playback never waits on the
//! preload: it is a latency optimization only.
//!
//! Every `start` opens a new attempt. Outcomes carry the attempt token
//! they belong to, and are ignored unless that attempt is still current
//! and loading. The host discards the off-screen resource of any attempt
//! once it reports an outcome, stale or not.

use crate::{
    error::{ControlError, Result},
    events::ControlEvent,
    types::PreloadStatus,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Token identifying one preload attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreloadAttempt(u64);

impl PreloadAttempt {
    /// Raw attempt number (1-based)
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Loads a resource off-screen until it can play through
#[async_trait(?Send)]
pub trait ResourceLoader {
    /// Resolve once the resource is playable; the error is a reason string
    async fn load_to_playable(&self, url: &str) -> std::result::Result<(), String>;
}

/// Preload state machine
#[derive(Debug)]
pub struct PreloadCoordinator {
    status: PreloadStatus,
    url: Option<String>,
    current: Option<PreloadAttempt>,
    attempts: u64,
    pending_events: Vec<ControlEvent>,
}

impl Default for PreloadCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl PreloadCoordinator {
    /// Create an idle coordinator
    pub fn new() -> Self {
        Self {
            status: PreloadStatus::Idle,
            url: None,
            current: None,
            attempts: 0,
            pending_events: Vec::new(),
        }
    }

    /// Begin a new attempt
    ///
    /// Allowed from Idle, Failed (user retry) and Loading (supersedes the
    /// running attempt). A Ready preload cannot go back to Loading.
    pub fn start(&mut self, url: &str) -> Result<PreloadAttempt> {
        if !self.status.can_start() {
            return Err(ControlError::InvalidTransition(
                "preload already ready".to_string(),
            ));
        }

        self.attempts += 1;
        let attempt = PreloadAttempt(self.attempts);
        if let Some(previous) = self.current.replace(attempt) {
            if self.status == PreloadStatus::Loading {
                debug!(previous = previous.id(), "Superseding running preload");
            }
        }
        self.url = Some(url.to_string());
        self.set_status(PreloadStatus::Loading);
        info!(url, attempt = attempt.id(), "Preloading video");
        Ok(attempt)
    }

    /// Attempt reached the playable threshold
    ///
    /// Returns whether the outcome was accepted. Stale outcomes are ignored.
    pub fn on_playable(&mut self, attempt: PreloadAttempt) -> bool {
        if !self.is_live(attempt) {
            debug!(attempt = attempt.id(), "Ignoring stale preload success");
            return false;
        }

        self.set_status(PreloadStatus::Ready);
        info!(attempt = attempt.id(), "Video preloaded");
        true
    }

    /// Attempt failed to load
    ///
    /// Returns the error when accepted; stale failures yield `None`.
    pub fn on_load_error(&mut self, attempt: PreloadAttempt, reason: &str) -> Option<ControlError> {
        if !self.is_live(attempt) {
            debug!(attempt = attempt.id(), reason, "Ignoring stale preload failure");
            return None;
        }

        let err = ControlError::ResourceLoadFailed {
            url: self.url.clone().unwrap_or_default(),
            reason: reason.to_string(),
        };
        warn!(attempt = attempt.id(), reason, "Video preload failed");
        self.set_status(PreloadStatus::Failed);
        self.pending_events.push(ControlEvent::Error {
            kind: err.kind().to_string(),
            message: err.user_message(),
        });
        Some(err)
    }

    /// Run one attempt end to end with an async loader
    pub async fn preload<L: ResourceLoader + ?Sized>(&mut self, loader: &L, url: &str) -> Result<()> {
        let attempt = self.start(url)?;
        match loader.load_to_playable(url).await {
            Ok(()) => {
                self.on_playable(attempt);
                Ok(())
            }
            Err(reason) => match self.on_load_error(attempt, &reason) {
                Some(err) => Err(err),
                None => Ok(()),
            },
        }
    }

    /// Current status
    pub fn status(&self) -> PreloadStatus {
        self.status
    }

    /// Whether the resource is known to be playable
    pub fn is_ready(&self) -> bool {
        self.status == PreloadStatus::Ready
    }

    /// URL of the latest attempt
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Latest attempt token
    pub fn current_attempt(&self) -> Option<PreloadAttempt> {
        self.current
    }

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<ControlEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn is_live(&self, attempt: PreloadAttempt) -> bool {
        self.status == PreloadStatus::Loading && self.current == Some(attempt)
    }

    fn set_status(&mut self, status: PreloadStatus) {
        self.status = status;
        self.pending_events
            .push(ControlEvent::PreloadChanged { status });
    }
}
