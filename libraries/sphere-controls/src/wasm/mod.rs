//! WASM bindings for sphere-controls
//!
//! This module binds the control layer to a browser page: the visible
//! `<video>` element, an off-screen preload element and the
//! `DeviceMotionEvent.requestPermission` gate.

#[cfg(feature = "wasm")]
pub mod platform;

#[cfg(feature = "wasm")]
pub mod session;

#[cfg(feature = "wasm")]
pub use platform::{WebMedia, WebMotionCapability};

#[cfg(feature = "wasm")]
pub use session::WasmPlayerSession;
