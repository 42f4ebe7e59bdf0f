//! # hearing-relay-core
//!
//! Platform-agnostic live hearing relay.
//!
//! Captures the microphone, pans it across a stereo headset with an adjustable
//! balance, and plays it back with as little buffering as the hardware allows.
//! Refuses to run unless a head-worn output is attached. Platform backends
//! (Windows WASAPI) implement the `AudioPlatform` trait and plug into the
//! generic `RelayEngine`.
//!
//! ## Architecture
//!
//! ```text
//! hearing-relay-core (this crate)
//! ├── traits/       ← AudioPlatform, CaptureEndpoint, RenderEndpoint, observers
//! ├── models/       ← RelayError, EngineState, RelayConfiguration, StreamConfig, OutputDevice
//! ├── gate/         ← DeviceGate (feedback-safe output check)
//! ├── processing/   ← Panner, amplitude meter, StreamConfigurator
//! └── session/      ← RelayEngine (lifecycle + capture/render loop), Notifier
//! ```

pub mod gate;
pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use gate::device_gate::DeviceGate;
pub use models::audio_models::{OutputDevice, OutputDeviceKind, RelayDiagnostics};
pub use models::config::{RelayConfiguration, StreamConfig};
pub use models::error::RelayError;
pub use models::state::EngineState;
pub use processing::panning::{pan, Panner};
pub use processing::stream_configurator::StreamConfigurator;
pub use session::relay_engine::RelayEngine;
pub use traits::audio_platform::AudioPlatform;
pub use traits::endpoint::{CaptureEndpoint, RenderEndpoint};
pub use traits::observer::{AmplitudeObserver, ErrorObserver};
