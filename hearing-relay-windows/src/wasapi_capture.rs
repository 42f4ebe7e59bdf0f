//! WASAPI microphone capture endpoint.
//!
//! Opens the default capture endpoint as 16-bit mono and hands out blocks
//! through a blocking, event-driven `read`.

use std::collections::VecDeque;

use windows::Win32::Media::Audio::*;

use hearing_relay_core::{CaptureEndpoint, RelayError, StreamConfig};

use crate::wasapi_stream::StreamClient;

/// WASAPI capture endpoint.
///
/// WASAPI delivers whole device periods, which need not match the relay's
/// read size; leftover frames are kept for the next read.
pub struct WasapiCapture {
    capture_client: IAudioCaptureClient,
    pending: VecDeque<i16>,
    stream: StreamClient,
}

impl WasapiCapture {
    pub fn open(config: &StreamConfig) -> Result<Self, RelayError> {
        let stream = StreamClient::open(
            eCapture,
            1,
            config.sample_rate,
            config.capture_buffer_bytes,
            config.low_latency,
        )?;
        let capture_client: IAudioCaptureClient = stream.service()?;

        log::debug!(
            "Capture endpoint open: {} Hz, {} frame buffer, low latency: {}",
            config.sample_rate,
            stream.buffer_frames,
            stream.low_latency
        );

        Ok(Self {
            capture_client,
            pending: VecDeque::with_capacity(config.read_chunk_frames * 2),
            stream,
        })
    }

    /// Move the next WASAPI packet, if any, into `pending`.
    fn pull_packet(&mut self) -> Result<bool, RelayError> {
        unsafe {
            let packet_length = self
                .capture_client
                .GetNextPacketSize()
                .map_err(|e| RelayError::RuntimeStream(format!("GetNextPacketSize failed: {}", e)))?;
            if packet_length == 0 {
                return Ok(false);
            }

            let mut buffer_ptr: *mut u8 = std::ptr::null_mut();
            let mut num_frames: u32 = 0;
            let mut flags: u32 = 0;
            self.capture_client
                .GetBuffer(&mut buffer_ptr, &mut num_frames, &mut flags, None, None)
                .map_err(|e| RelayError::RuntimeStream(format!("GetBuffer failed: {}", e)))?;

            if num_frames > 0 {
                let silent = flags & (AUDCLNT_BUFFERFLAGS_SILENT.0 as u32) != 0;
                if silent || buffer_ptr.is_null() {
                    self.pending.extend(std::iter::repeat(0i16).take(num_frames as usize));
                } else {
                    let samples = std::slice::from_raw_parts(buffer_ptr as *const i16, num_frames as usize);
                    self.pending.extend(samples.iter().copied());
                }
            }

            self.capture_client
                .ReleaseBuffer(num_frames)
                .map_err(|e| RelayError::RuntimeStream(format!("ReleaseBuffer failed: {}", e)))?;
            Ok(true)
        }
    }
}

impl CaptureEndpoint for WasapiCapture {
    fn start(&mut self) -> Result<(), RelayError> {
        self.stream.start()
    }

    fn read(&mut self, buffer: &mut [i16]) -> Result<usize, RelayError> {
        while self.pending.len() < buffer.len() {
            if !self.pull_packet()? {
                if !self.pending.is_empty() {
                    break;
                }
                self.stream.event.wait()?;
                if !self.pull_packet()? {
                    // Spurious wake; nothing captured this time.
                    return Ok(0);
                }
            }
        }

        let frames = buffer.len().min(self.pending.len());
        for (slot, sample) in buffer.iter_mut().zip(self.pending.drain(..frames)) {
            *slot = sample;
        }
        Ok(frames)
    }

    fn stop(&mut self) -> Result<(), RelayError> {
        self.stream.stop()
    }
}
