//! WASAPI headset render endpoint.
//!
//! Opens the default render endpoint as 16-bit interleaved stereo. `write`
//! blocks until every sample has been queued, which paces the relay loop to
//! the device.

use windows::Win32::Media::Audio::*;

use hearing_relay_core::{RelayError, RenderEndpoint, StreamConfig};

use crate::wasapi_stream::StreamClient;

const CHANNELS: usize = 2;

pub struct WasapiRender {
    render_client: IAudioRenderClient,
    stream: StreamClient,
}

impl WasapiRender {
    pub fn open(config: &StreamConfig) -> Result<Self, RelayError> {
        let stream = StreamClient::open(
            eRender,
            CHANNELS as u16,
            config.sample_rate,
            config.render_buffer_bytes,
            config.low_latency,
        )?;
        let render_client: IAudioRenderClient = stream.service()?;

        log::debug!(
            "Render endpoint open: {} Hz, {} frame buffer, low latency: {}",
            config.sample_rate,
            stream.buffer_frames,
            stream.low_latency
        );

        Ok(Self { render_client, stream })
    }

    fn free_frames(&self) -> Result<u32, RelayError> {
        let padding = unsafe {
            self.stream
                .client
                .GetCurrentPadding()
                .map_err(|e| RelayError::RuntimeStream(format!("GetCurrentPadding failed: {}", e)))?
        };
        Ok(self.stream.buffer_frames.saturating_sub(padding))
    }
}

impl RenderEndpoint for WasapiRender {
    fn start(&mut self) -> Result<(), RelayError> {
        self.stream.start()
    }

    fn write(&mut self, samples: &[i16]) -> Result<(), RelayError> {
        let mut remaining = samples;

        while remaining.len() >= CHANNELS {
            let free = self.free_frames()? as usize;
            if free == 0 {
                self.stream.event.wait()?;
                continue;
            }

            let frames = free.min(remaining.len() / CHANNELS);
            let count = frames * CHANNELS;
            unsafe {
                let buffer = self
                    .render_client
                    .GetBuffer(frames as u32)
                    .map_err(|e| RelayError::RuntimeStream(format!("GetBuffer failed: {}", e)))?;
                std::ptr::copy_nonoverlapping(remaining.as_ptr(), buffer as *mut i16, count);
                self.render_client
                    .ReleaseBuffer(frames as u32, 0)
                    .map_err(|e| RelayError::RuntimeStream(format!("ReleaseBuffer failed: {}", e)))?;
            }
            remaining = &remaining[count..];
        }

        Ok(())
    }

    fn stop(&mut self) -> Result<(), RelayError> {
        self.stream.stop()
    }

    fn flush(&mut self) -> Result<(), RelayError> {
        self.stream.reset()
    }
}
