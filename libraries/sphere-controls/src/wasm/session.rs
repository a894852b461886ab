//! WASM-compatible PlayerSession wrapper

use super::platform::{js_error_message, JsCameraReset, WebMedia, WebMotionCapability};
use crate::{
    ControlError, DeviceKind, GatedMotionCapability, PlayPauseAction, PlayerConfig, PlayerSession,
    PreloadAttempt,
};
use js_sys::Function;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Event, HtmlMediaElement, HtmlVideoElement};

type SharedSession = Rc<RefCell<PlayerSession<WebMedia>>>;
type SharedListener = Rc<RefCell<Option<Function>>>;
type PreloadSlot = Rc<RefCell<Option<PreloadListeners>>>;

/// WASM-compatible player session
///
/// Wraps the core `PlayerSession` with a JavaScript-friendly API. Every
/// call drains the resulting events into the `onEvent` callback. Async
/// platform work (play promise, preload element, motion permission) is
/// awaited on the JS event loop and fed back as inputs.
#[wasm_bindgen]
pub struct WasmPlayerSession {
    inner: SharedSession,
    motion: WebMotionCapability,
    on_event: SharedListener,
    preload_slot: PreloadSlot,
}

#[wasm_bindgen]
impl WasmPlayerSession {
    /// Create a session for a `<video>` element
    ///
    /// `config` is a config object or undefined/null for defaults. When a
    /// user agent is given it decides the device class.
    #[wasm_bindgen(constructor)]
    pub fn new(
        video: HtmlMediaElement,
        video_url: String,
        config: JsValue,
        user_agent: Option<String>,
    ) -> Result<WasmPlayerSession, JsValue> {
        // Enable panic hooks for better error messages in console
        console_error_panic_hook::set_once();

        let mut config: PlayerConfig = if config.is_undefined() || config.is_null() {
            PlayerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?
        };
        if let Some(agent) = user_agent {
            config.device = DeviceKind::from_user_agent(&agent);
        }

        Ok(Self {
            inner: Rc::new(RefCell::new(PlayerSession::new(
                WebMedia::new(video),
                video_url,
                config,
            ))),
            motion: WebMotionCapability::from_global(),
            on_event: Rc::new(RefCell::new(None)),
            preload_slot: Rc::new(RefCell::new(None)),
        })
    }

    // ===== Startup =====

    /// Start the preload and detect the motion permission gate
    pub fn start(&self) -> Result<(), JsValue> {
        let started = self.inner.borrow_mut().start(&self.motion);
        let attempt = started.map_err(|e| self.handle_error(e))?;
        self.spawn_preload(attempt)?;
        self.flush();
        Ok(())
    }

    /// Retry a failed preload
    #[wasm_bindgen(js_name = retryPreload)]
    pub fn retry_preload(&self) -> Result<(), JsValue> {
        let started = self.inner.borrow_mut().retry_preload();
        let attempt = started.map_err(|e| self.handle_error(e))?;
        self.spawn_preload(attempt)?;
        self.flush();
        Ok(())
    }

    // ===== Playback Control =====

    /// Toggle play/pause
    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&self) {
        let action = self.inner.borrow_mut().toggle_play_pause();
        self.after_toggle(action);
    }

    /// Rewind by the configured step
    #[wasm_bindgen(js_name = seekBackward)]
    pub fn seek_backward(&self) {
        self.inner.borrow_mut().seek_backward();
        self.flush();
    }

    /// Fast forward by the configured step
    #[wasm_bindgen(js_name = seekForward)]
    pub fn seek_forward(&self) {
        self.inner.borrow_mut().seek_forward();
        self.flush();
    }

    /// Toggle mute; returns the new mute flag
    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) -> bool {
        let muted = self.inner.borrow_mut().toggle_mute();
        self.flush();
        muted
    }

    // ===== Scrubber =====

    /// mousedown / touchstart on the scrubber
    #[wasm_bindgen(js_name = beginScrub)]
    pub fn begin_scrub(&self) {
        self.inner.borrow_mut().begin_scrub();
    }

    /// input event on the scrubber
    #[wasm_bindgen(js_name = updateScrubPreview)]
    pub fn update_scrub_preview(&self, position_secs: f64) {
        self.inner.borrow_mut().update_scrub_preview(position_secs);
        self.flush();
    }

    /// mouseup / touchend on the scrubber
    #[wasm_bindgen(js_name = commitScrub)]
    pub fn commit_scrub(&self, position_secs: f64) {
        self.inner.borrow_mut().commit_scrub(position_secs);
        self.flush();
    }

    // ===== Media Events =====

    /// timeupdate
    #[wasm_bindgen(js_name = onTimeUpdate)]
    pub fn on_time_update(&self, position_secs: f64, duration_secs: f64) {
        self.inner
            .borrow_mut()
            .on_time_update(position_secs, duration_secs);
        self.flush();
    }

    /// loadedmetadata
    #[wasm_bindgen(js_name = onLoadedMetadata)]
    pub fn on_loaded_metadata(&self, duration_secs: f64) {
        self.inner.borrow_mut().on_loaded_metadata(duration_secs);
        self.flush();
    }

    /// loadeddata
    #[wasm_bindgen(js_name = onLoadedData)]
    pub fn on_loaded_data(&self) {
        self.inner.borrow_mut().on_loaded_data();
        self.flush();
    }

    /// error
    #[wasm_bindgen(js_name = onMediaError)]
    pub fn on_media_error(&self, reason: String) {
        self.inner.borrow_mut().on_media_error(&reason);
        self.flush();
    }

    // ===== Motion Permission =====

    /// Consent gesture; must be called from a user-interaction handler
    #[wasm_bindgen(js_name = requestMotionPermission)]
    pub fn request_motion_permission(&self) -> Result<(), JsValue> {
        let begun = self.inner.borrow_mut().begin_motion_request();
        begun.map_err(|e| self.handle_error(e))?;

        let capability = self.motion.clone();
        let inner = Rc::clone(&self.inner);
        let on_event = Rc::clone(&self.on_event);
        spawn_local(async move {
            let outcome = capability.request().await;
            let settled = {
                let mut session = inner.borrow_mut();
                match outcome {
                    Ok(response) => session.resolve_motion_permission(response),
                    Err(reason) => session.reject_motion_permission(&reason),
                }
            };
            if let Err(e) = settled {
                tracing::warn!(error = %e, "Motion permission answer rejected");
            }
            flush(&inner, &on_event);
        });
        Ok(())
    }

    // ===== Keyboard / Camera =====

    /// keydown; returns true when the key was handled (prevent default)
    #[wasm_bindgen(js_name = onKey)]
    pub fn on_key(&self, code: String) -> bool {
        let action = self.inner.borrow_mut().on_key(&code);
        match action {
            Some(action) => {
                self.after_toggle(action);
                true
            }
            None => false,
        }
    }

    /// focusin
    #[wasm_bindgen(js_name = focusIn)]
    pub fn focus_in(&self, tag_name: String) {
        self.inner.borrow_mut().focus_in(&tag_name);
    }

    /// focusout
    #[wasm_bindgen(js_name = focusOut)]
    pub fn focus_out(&self, tag_name: String) {
        self.inner.borrow_mut().focus_out(&tag_name);
    }

    /// Reset camera; `reset` performs the look-controls reset and returns
    /// whether it succeeded
    #[wasm_bindgen(js_name = resetCamera)]
    pub fn reset_camera(&self, reset: Function) -> bool {
        let mut camera = JsCameraReset { reset: &reset };
        let done = self.inner.borrow_mut().reset_camera(&mut camera);
        self.flush();
        done
    }

    /// A timed notice's delay elapsed
    #[wasm_bindgen(js_name = expireNotice)]
    pub fn expire_notice(&self, id: f64) -> bool {
        let hidden = self.inner.borrow_mut().expire_notice(id as u64);
        self.flush();
        hidden
    }

    // ===== State Queries =====

    /// Current scrubber view as an object
    pub fn view(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.borrow().view()).unwrap_or(JsValue::NULL)
    }

    /// Current playback state as an object
    pub fn state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.borrow().state()).unwrap_or(JsValue::NULL)
    }

    /// Scene labels as an object
    #[wasm_bindgen(js_name = sceneInfo)]
    pub fn scene_info(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.borrow().scene()).unwrap_or(JsValue::NULL)
    }

    /// Preload status ("idle" | "loading" | "ready" | "failed")
    #[wasm_bindgen(js_name = preloadStatus)]
    pub fn preload_status(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.borrow().preload().status())
            .unwrap_or(JsValue::NULL)
    }

    /// Permission status ("not_required" | "pending" | "granted" | "denied" | "error")
    #[wasm_bindgen(js_name = permissionStatus)]
    pub fn permission_status(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.borrow().permission().status())
            .unwrap_or(JsValue::NULL)
    }

    /// Whether the motion consent affordance should be visible
    #[wasm_bindgen(js_name = showPermissionAffordance)]
    pub fn show_permission_affordance(&self) -> bool {
        self.inner.borrow().permission().show_affordance()
    }

    // ===== Event Listener =====

    /// Register the event callback; receives one event object per call
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, callback: Function) {
        *self.on_event.borrow_mut() = Some(callback);
    }

    // ===== Internal =====

    fn after_toggle(&self, action: PlayPauseAction) {
        if action == PlayPauseAction::PlayRequested {
            let request = self.inner.borrow_mut().media_mut().take_play_request();
            match request {
                Some(Ok(promise)) => {
                    let inner = Rc::clone(&self.inner);
                    let on_event = Rc::clone(&self.on_event);
                    spawn_local(async move {
                        let outcome = JsFuture::from(promise)
                            .await
                            .map(|_| ())
                            .map_err(|e| js_error_message(&e));
                        let resolved = inner.borrow_mut().resolve_play(outcome);
                        if let Err(e) = resolved {
                            tracing::warn!(error = %e, "Play request settled with an error");
                        }
                        flush(&inner, &on_event);
                    });
                }
                Some(Err(reason)) => {
                    let resolved = self.inner.borrow_mut().resolve_play(Err(reason));
                    if let Err(e) = resolved {
                        tracing::warn!(error = %e, "Play request rejected synchronously");
                    }
                }
                None => {}
            }
        }
        self.flush();
    }

    /// Load the video on a detached, muted element and report the outcome
    fn spawn_preload(&self, attempt: PreloadAttempt) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("No document available for preload"))?;
        let element: HtmlVideoElement = document.create_element("video")?.dyn_into()?;
        element.set_muted(true);
        element.set_preload("auto");
        element.set_cross_origin(Some("anonymous"));
        element.set_src(self.inner.borrow().video_url());

        // A superseded attempt's element is detached before it is dropped
        if let Some(previous) = self.preload_slot.borrow_mut().take() {
            previous.detach();
        }

        let on_ready = {
            let inner = Rc::clone(&self.inner);
            let on_event = Rc::clone(&self.on_event);
            let slot = Rc::clone(&self.preload_slot);
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                settle_preload(&slot);
                inner.borrow_mut().preload_ready(attempt);
                flush(&inner, &on_event);
            })
        };
        let on_error = {
            let inner = Rc::clone(&self.inner);
            let on_event = Rc::clone(&self.on_event);
            let slot = Rc::clone(&self.preload_slot);
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                settle_preload(&slot);
                inner
                    .borrow_mut()
                    .preload_failed(attempt, "preload element error");
                flush(&inner, &on_event);
            })
        };

        element.add_event_listener_with_callback(
            "canplaythrough",
            on_ready.as_ref().unchecked_ref(),
        )?;
        element.add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())?;
        element.load();

        *self.preload_slot.borrow_mut() = Some(PreloadListeners {
            element,
            on_ready,
            on_error,
        });
        Ok(())
    }

    fn flush(&self) {
        flush(&self.inner, &self.on_event);
    }

    fn handle_error(&self, error: ControlError) -> JsValue {
        let err_msg = error.to_string();
        self.flush();
        JsValue::from_str(&err_msg)
    }
}

impl Drop for WasmPlayerSession {
    fn drop(&mut self) {
        if let Some(listeners) = self.preload_slot.borrow_mut().take() {
            listeners.detach();
        }
    }
}

/// Off-screen element of the running preload attempt and its listeners
///
/// The closures live as long as this value. Listeners are removed before
/// the element's source is cleared, so the `error` the browser fires for an
/// emptied source never reaches them.
struct PreloadListeners {
    element: HtmlVideoElement,
    on_ready: Closure<dyn FnMut(Event)>,
    on_error: Closure<dyn FnMut(Event)>,
}

impl PreloadListeners {
    /// Remove both listeners and drop the element's resource
    fn detach(&self) {
        let listeners = [("canplaythrough", &self.on_ready), ("error", &self.on_error)];
        for (kind, callback) in listeners {
            let removed = self
                .element
                .remove_event_listener_with_callback(kind, callback.as_ref().unchecked_ref());
            if let Err(e) = removed {
                tracing::warn!(
                    event = kind,
                    error = %js_error_message(&e),
                    "Failed to remove preload listener"
                );
            }
        }
        self.element.set_src("");
        self.element.load();
    }
}

/// First outcome of an attempt detaches its listeners
///
/// Called from inside one of the closures, which must not be dropped while
/// it runs, so the handles are dropped on a later microtask.
fn settle_preload(slot: &PreloadSlot) {
    let taken = slot.borrow_mut().take();
    if let Some(listeners) = taken {
        listeners.detach();
        spawn_local(async move { drop(listeners) });
    }
}

/// Deliver pending events without holding the session borrow
fn flush(inner: &SharedSession, on_event: &SharedListener) {
    let events = inner.borrow_mut().drain_events();
    let listener = on_event.borrow().clone();
    if let Some(cb) = listener {
        for event in events {
            if let Ok(js_event) = serde_wasm_bindgen::to_value(&event) {
                cb.call1(&JsValue::NULL, &js_event).ok();
            }
        }
    }
}
