//! Motion-sensor permission flow
//!
//! Some platforms gate device-motion access behind a request that must be
//! issued from a direct user gesture. The flow runs at most once:
//!
//! ```text
//! detect ──(no request API)──> NotRequired
//!    │
//!    └──> Pending ──gesture──> request ──> Granted | Denied | Error
//! ```
//!
//! All terminal states are one-shot; nothing re-enters the flow.

use crate::{
    error::{ControlError, Result},
    events::ControlEvent,
    types::{PermissionResponse, PermissionStatus},
};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Platform capability that needs an explicit permission grant
#[async_trait(?Send)]
pub trait GatedMotionCapability {
    /// Whether the platform exposes the gated request API
    fn is_request_needed(&self) -> bool;

    /// Ask the user; the error is the platform's rejection reason
    async fn request(&self) -> std::result::Result<PermissionResponse, String>;
}

/// Permission state machine
#[derive(Debug)]
pub struct PermissionFlow {
    status: PermissionStatus,
    in_flight: bool,
    pending_events: Vec<ControlEvent>,
}

impl PermissionFlow {
    /// Decide at startup whether the consent affordance is needed
    pub fn detect<C: GatedMotionCapability + ?Sized>(capability: &C) -> Self {
        if capability.is_request_needed() {
            Self::pending()
        } else {
            Self::not_required()
        }
    }

    /// Flow for platforms without the gated API; no UI is shown
    pub fn not_required() -> Self {
        debug!("Device motion permission not required or not available");
        Self {
            status: PermissionStatus::NotRequired,
            in_flight: false,
            pending_events: Vec::new(),
        }
    }

    /// Flow waiting for the user's consent gesture
    pub fn pending() -> Self {
        info!("Device motion permission required, showing consent affordance");
        Self {
            status: PermissionStatus::Pending,
            in_flight: false,
            pending_events: vec![ControlEvent::PermissionChanged {
                status: PermissionStatus::Pending,
                show_affordance: true,
            }],
        }
    }

    /// User gesture arrived; the platform request is being issued
    pub fn begin_request(&mut self) -> Result<()> {
        if self.status != PermissionStatus::Pending {
            return Err(ControlError::InvalidTransition(format!(
                "permission request in {:?} state",
                self.status
            )));
        }
        if self.in_flight {
            return Err(ControlError::InvalidTransition(
                "permission request already in flight".to_string(),
            ));
        }

        self.in_flight = true;
        debug!("Requesting device motion permission");
        Ok(())
    }

    /// Platform answered the request
    pub fn resolve(&mut self, response: PermissionResponse) -> Result<PermissionStatus> {
        self.finish_request()?;

        let status = match response {
            PermissionResponse::Granted => {
                info!("Device motion permission granted");
                PermissionStatus::Granted
            }
            PermissionResponse::Denied => {
                info!("Device motion permission denied");
                PermissionStatus::Denied
            }
        };
        self.settle(status);
        if status == PermissionStatus::Granted {
            self.pending_events.push(ControlEvent::MotionLookEnabled);
        }
        Ok(status)
    }

    /// Platform rejected the request
    pub fn reject(&mut self, reason: &str) -> Result<PermissionStatus> {
        self.finish_request()?;

        warn!(reason, "Error requesting device motion permission");
        let err = ControlError::PermissionRequestFailed(reason.to_string());
        self.settle(PermissionStatus::Error);
        self.pending_events.push(ControlEvent::Error {
            kind: err.kind().to_string(),
            message: err.user_message(),
        });
        Ok(PermissionStatus::Error)
    }

    /// Run the request end to end with an async capability
    pub async fn request<C: GatedMotionCapability + ?Sized>(
        &mut self,
        capability: &C,
    ) -> Result<PermissionStatus> {
        self.begin_request()?;
        match capability.request().await {
            Ok(response) => self.resolve(response),
            Err(reason) => self.reject(&reason),
        }
    }

    /// Current status
    pub fn status(&self) -> PermissionStatus {
        self.status
    }

    /// Whether the consent affordance should be visible
    pub fn show_affordance(&self) -> bool {
        self.status == PermissionStatus::Pending
    }

    /// Whether a platform request is outstanding
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<ControlEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn finish_request(&mut self) -> Result<()> {
        if !self.in_flight {
            return Err(ControlError::InvalidTransition(
                "permission answer without a request".to_string(),
            ));
        }
        self.in_flight = false;
        Ok(())
    }

    fn settle(&mut self, status: PermissionStatus) {
        self.status = status;
        self.pending_events.push(ControlEvent::PermissionChanged {
            status,
            show_affordance: false,
        });
    }
}
