use crate::models::error::RelayError;

/// An opened capture handle producing 16-bit mono PCM.
///
/// Created by [`AudioPlatform::open_capture`](super::audio_platform::AudioPlatform)
/// on the relay thread and used only there. Dropping the endpoint releases the
/// native handle.
pub trait CaptureEndpoint {
    /// Begin capturing. Transitions: open → started.
    fn start(&mut self) -> Result<(), RelayError>;

    /// Blocking read of up to `buffer.len()` mono frames.
    ///
    /// Returns the number of frames written into `buffer`. `Ok(0)` means no
    /// data this time and is not an error.
    fn read(&mut self, buffer: &mut [i16]) -> Result<usize, RelayError>;

    /// Stop capturing. Transitions: started → open.
    fn stop(&mut self) -> Result<(), RelayError>;
}

/// An opened render handle consuming 16-bit interleaved stereo PCM.
///
/// Same threading and release rules as [`CaptureEndpoint`].
pub trait RenderEndpoint {
    fn start(&mut self) -> Result<(), RelayError>;

    /// Blocking write of all of `samples` (interleaved L, R pairs).
    ///
    /// Returns once the samples are queued to the device, which paces the
    /// relay loop to the device's playback rate.
    fn write(&mut self, samples: &[i16]) -> Result<(), RelayError>;

    fn stop(&mut self) -> Result<(), RelayError>;

    /// Drain or discard queued audio so the next start does not click.
    fn flush(&mut self) -> Result<(), RelayError>;
}
