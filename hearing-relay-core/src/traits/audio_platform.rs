use crate::models::audio_models::OutputDevice;
use crate::models::config::StreamConfig;
use crate::models::error::RelayError;

use super::endpoint::{CaptureEndpoint, RenderEndpoint};

/// Interface for the platform audio system the relay runs on.
///
/// Implemented by:
/// - `WasapiPlatform` (Windows)
/// - the mock platform used by the engine tests
///
/// Queries may be called from any thread. `open_capture`/`open_render` are
/// called on the relay thread, and the returned endpoints never leave it.
pub trait AudioPlatform: Send + Sync {
    /// Output devices attached right now. Never cached.
    fn output_devices(&self) -> Result<Vec<OutputDevice>, RelayError>;

    /// Native output sample rate, if the platform reports one.
    fn preferred_sample_rate(&self) -> Option<u32>;

    /// Native output burst size in frames, if the platform reports one.
    ///
    /// `low_latency` matches the mode the endpoints will be opened in, so the
    /// burst is the period that mode actually runs at.
    fn preferred_burst_frames(&self, low_latency: bool) -> Option<u32>;

    /// Smallest capture buffer, in bytes, for 16-bit mono at `sample_rate`.
    fn min_capture_buffer_bytes(&self, sample_rate: u32) -> Option<u32>;

    fn open_capture(&self, config: &StreamConfig) -> Result<Box<dyn CaptureEndpoint>, RelayError>;

    fn open_render(&self, config: &StreamConfig) -> Result<Box<dyn RenderEndpoint>, RelayError>;
}
