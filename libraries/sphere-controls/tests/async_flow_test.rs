//! Async adapter tests for preload and motion permission
//!
//! Drives the end-to-end `preload` / `request` helpers with mock
//! capabilities on a current-thread runtime.

use async_trait::async_trait;
use sphere_controls::{
    ControlError, ControlEvent, DeviceKind, GatedMotionCapability, MediaSource, PermissionFlow,
    PermissionResponse, PermissionStatus, PlayerConfig, PlayerSession, PreloadCoordinator,
    PreloadStatus, ResourceLoader,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

// ===== Test Helpers =====

/// Loader that answers from a script, one entry per call
struct ScriptedLoader {
    outcomes: RefCell<VecDeque<Result<(), String>>>,
    calls: Cell<usize>,
}

impl ScriptedLoader {
    fn new(outcomes: Vec<Result<(), String>>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.into()),
            calls: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl ResourceLoader for ScriptedLoader {
    async fn load_to_playable(&self, _url: &str) -> Result<(), String> {
        self.calls.set(self.calls.get() + 1);
        tokio::task::yield_now().await;
        self.outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err("script exhausted".to_string()))
    }
}

/// Motion capability with a fixed platform answer
struct MockMotion {
    needed: bool,
    answer: Result<PermissionResponse, String>,
    calls: Cell<usize>,
}

impl MockMotion {
    fn answering(answer: Result<PermissionResponse, String>) -> Self {
        Self {
            needed: true,
            answer,
            calls: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl GatedMotionCapability for MockMotion {
    fn is_request_needed(&self) -> bool {
        self.needed
    }

    async fn request(&self) -> Result<PermissionResponse, String> {
        self.calls.set(self.calls.get() + 1);
        tokio::task::yield_now().await;
        self.answer.clone()
    }
}

struct SilentMedia;

impl MediaSource for SilentMedia {
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn current_time(&self) -> f64 {
        0.0
    }
    fn set_current_time(&mut self, _seconds: f64) {}
    fn duration(&self) -> f64 {
        120.0
    }
    fn is_muted(&self) -> bool {
        true
    }
    fn set_muted(&mut self, _muted: bool) {}
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ===== Preload =====

#[tokio::test]
async fn preload_reaches_ready() {
    init_tracing();
    let loader = ScriptedLoader::new(vec![Ok(())]);
    let mut preload = PreloadCoordinator::new();

    preload.preload(&loader, "/v/tour.mp4").await.unwrap();
    assert_eq!(preload.status(), PreloadStatus::Ready);
    assert_eq!(preload.url(), Some("/v/tour.mp4"));
}

#[tokio::test]
async fn preload_failure_then_user_retry() {
    init_tracing();
    let loader = ScriptedLoader::new(vec![Err("HTTP 503".to_string()), Ok(())]);
    let mut preload = PreloadCoordinator::new();

    let err = preload.preload(&loader, "/v/tour.mp4").await.unwrap_err();
    assert_eq!(
        err,
        ControlError::ResourceLoadFailed {
            url: "/v/tour.mp4".to_string(),
            reason: "HTTP 503".to_string(),
        }
    );
    assert_eq!(preload.status(), PreloadStatus::Failed);

    preload.preload(&loader, "/v/tour.mp4").await.unwrap();
    assert_eq!(preload.status(), PreloadStatus::Ready);
    assert_eq!(loader.calls.get(), 2);
}

#[tokio::test]
async fn preload_after_ready_is_rejected_without_fetching() {
    let loader = ScriptedLoader::new(vec![Ok(())]);
    let mut preload = PreloadCoordinator::new();
    preload.preload(&loader, "/v/tour.mp4").await.unwrap();

    let err = preload.preload(&loader, "/v/tour.mp4").await.unwrap_err();
    assert!(matches!(err, ControlError::InvalidTransition(_)));
    assert_eq!(loader.calls.get(), 1);
}

// ===== Permission =====

#[tokio::test]
async fn permission_granted_enables_motion_look() {
    init_tracing();
    let motion = MockMotion::answering(Ok(PermissionResponse::Granted));
    let mut flow = PermissionFlow::detect(&motion);
    assert_eq!(flow.status(), PermissionStatus::Pending);

    let status = flow.request(&motion).await.unwrap();
    assert_eq!(status, PermissionStatus::Granted);
    assert!(flow.drain_events().contains(&ControlEvent::MotionLookEnabled));
}

#[tokio::test]
async fn permission_request_is_one_shot() {
    let motion = MockMotion::answering(Ok(PermissionResponse::Denied));
    let mut flow = PermissionFlow::detect(&motion);

    assert_eq!(flow.request(&motion).await.unwrap(), PermissionStatus::Denied);
    assert!(flow.request(&motion).await.is_err());
    assert_eq!(motion.calls.get(), 1);
}

#[tokio::test]
async fn permission_platform_error_maps_to_error_status() {
    let motion = MockMotion::answering(Err("SecurityError".to_string()));
    let mut flow = PermissionFlow::detect(&motion);

    assert_eq!(flow.request(&motion).await.unwrap(), PermissionStatus::Error);
    assert!(!flow.show_affordance());
}

#[tokio::test]
async fn permission_absent_api_is_not_required() {
    let motion = MockMotion {
        needed: false,
        answer: Ok(PermissionResponse::Granted),
        calls: Cell::new(0),
    };
    let mut flow = PermissionFlow::detect(&motion);
    assert_eq!(flow.status(), PermissionStatus::NotRequired);
    assert!(!flow.show_affordance());
    assert!(flow.request(&motion).await.is_err());
    assert_eq!(motion.calls.get(), 0);
}

#[tokio::test]
async fn session_announces_permission_outcome() {
    init_tracing();
    let config = PlayerConfig {
        device: DeviceKind::Mobile,
        ..PlayerConfig::default()
    };
    let motion = MockMotion::answering(Ok(PermissionResponse::Granted));
    let mut session = PlayerSession::new(SilentMedia, "/v/tour.mp4", config);
    session.start(&motion).unwrap();
    session.drain_events();

    let status = session.request_motion_permission(&motion).await.unwrap();
    assert_eq!(status, PermissionStatus::Granted);

    let notice = session.current_notice().unwrap();
    assert_eq!(
        notice.text,
        "Motion controls enabled. Use your phone to look around."
    );
    assert_eq!(notice.hide_after_ms, Some(3000));
}
