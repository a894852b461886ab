//! Browser implementations of the host capabilities

use crate::{CameraReset, GatedMotionCapability, MediaSource, PermissionResponse};
use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlMediaElement;

/// Best-effort message for a JS exception or rejection value
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Visible `<video>` element
///
/// `play()` returns a promise in browsers; it is parked here until the
/// session wrapper awaits it and reports the outcome.
pub struct WebMedia {
    element: HtmlMediaElement,
    play_request: Option<Result<Promise, String>>,
}

impl WebMedia {
    /// Wrap a media element
    pub fn new(element: HtmlMediaElement) -> Self {
        Self {
            element,
            play_request: None,
        }
    }

    /// Take the promise (or synchronous failure) of the last play request
    pub fn take_play_request(&mut self) -> Option<Result<Promise, String>> {
        self.play_request.take()
    }

    /// Underlying element
    pub fn element(&self) -> &HtmlMediaElement {
        &self.element
    }
}

impl MediaSource for WebMedia {
    fn play(&mut self) {
        self.play_request = Some(self.element.play().map_err(|e| js_error_message(&e)));
    }

    fn pause(&mut self) {
        if let Err(e) = self.element.pause() {
            warn!(error = %js_error_message(&e), "Media pause threw");
        }
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn duration(&self) -> f64 {
        self.element.duration()
    }

    fn is_muted(&self) -> bool {
        self.element.muted()
    }

    fn set_muted(&mut self, muted: bool) {
        self.element.set_muted(muted);
    }
}

/// `DeviceMotionEvent.requestPermission`, when the browser has it
#[derive(Clone)]
pub struct WebMotionCapability {
    // (DeviceMotionEvent constructor, requestPermission)
    request: Option<(JsValue, Function)>,
}

impl WebMotionCapability {
    /// Look the gated API up on the global object
    pub fn from_global() -> Self {
        let ctor = Reflect::get(&js_sys::global(), &JsValue::from_str("DeviceMotionEvent"))
            .ok()
            .filter(|c| !c.is_undefined() && !c.is_null());

        let request = ctor.and_then(|ctor| {
            Reflect::get(&ctor, &JsValue::from_str("requestPermission"))
                .ok()
                .and_then(|f| f.dyn_into::<Function>().ok())
                .map(|f| (ctor, f))
        });

        Self { request }
    }
}

#[async_trait(?Send)]
impl GatedMotionCapability for WebMotionCapability {
    fn is_request_needed(&self) -> bool {
        self.request.is_some()
    }

    async fn request(&self) -> Result<PermissionResponse, String> {
        let (ctor, request) = self
            .request
            .as_ref()
            .ok_or_else(|| "DeviceMotionEvent.requestPermission is unavailable".to_string())?;

        let promise: Promise = request
            .call0(ctor)
            .map_err(|e| js_error_message(&e))?
            .dyn_into()
            .map_err(|_| "requestPermission did not return a promise".to_string())?;

        let answer = JsFuture::from(promise)
            .await
            .map_err(|e| js_error_message(&e))?;
        Ok(PermissionResponse::from_platform(
            &answer.as_string().unwrap_or_default(),
        ))
    }
}

/// Camera reset delegated to a JS function returning a boolean
pub struct JsCameraReset<'a> {
    pub reset: &'a Function,
}

impl CameraReset for JsCameraReset<'_> {
    fn reset_orientation(&mut self) -> bool {
        self.reset
            .call0(&JsValue::NULL)
            .map(|v| v.as_bool().unwrap_or(false))
            .unwrap_or(false)
    }
}
