//! # hearing-relay-windows
//!
//! Windows WASAPI backend for the live hearing relay.
//!
//! Provides:
//! - `WasapiPlatform` — `AudioPlatform` over the default capture/render endpoints
//! - `WasapiCapture` — event-driven 16-bit mono microphone endpoint
//! - `WasapiRender` — event-driven 16-bit stereo headset endpoint
//! - `DeviceEnumerator` — render-device listing with headphone/headset detection
//!
//! ## Platform Requirements
//! - Windows 10 1809+ for low-latency shared streams (`IAudioClient3`);
//!   older builds fall back to plain shared mode
//!
//! ## Usage
//! ```ignore
//! use hearing_relay_core::RelayEngine;
//! use hearing_relay_windows::WasapiPlatform;
//!
//! let engine = RelayEngine::new(WasapiPlatform::new())?;
//! engine.set_amplitude_observer(|level| println!("level {level}"));
//! engine.start();
//! ```

pub mod device_kind;

#[cfg(target_os = "windows")]
mod com;
#[cfg(target_os = "windows")]
pub mod device_enumerator;
#[cfg(target_os = "windows")]
pub mod wasapi_capture;
#[cfg(target_os = "windows")]
pub mod wasapi_platform;
#[cfg(target_os = "windows")]
pub mod wasapi_render;
#[cfg(target_os = "windows")]
mod wasapi_stream;

#[cfg(target_os = "windows")]
pub use device_enumerator::DeviceEnumerator;
#[cfg(target_os = "windows")]
pub use wasapi_capture::WasapiCapture;
#[cfg(target_os = "windows")]
pub use wasapi_platform::WasapiPlatform;
#[cfg(target_os = "windows")]
pub use wasapi_render::WasapiRender;
