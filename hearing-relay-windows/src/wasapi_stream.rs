//! Shared WASAPI stream setup for the capture and render endpoints.
//!
//! Both directions run event-driven in shared mode with a 16-bit PCM client
//! format. When low latency is requested the stream is first opened through
//! `IAudioClient3` at the engine's minimum period; if that is unsupported
//! (older Windows, or a driver without small-period support) it is reopened
//! with a plain `IAudioClient::Initialize`.

use windows::core::{Interface, PCWSTR};
use windows::Win32::Foundation::{CloseHandle, HANDLE, WAIT_FAILED};
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::*;
use windows::Win32::System::Threading::{CreateEventW, WaitForSingleObject, INFINITE};

use hearing_relay_core::RelayError;

use crate::com::ComGuard;
use crate::device_enumerator::DeviceEnumerator;

const HNS_PER_SECOND: u64 = 10_000_000;

/// Auto-reset event signalled by WASAPI when a period is ready.
pub(crate) struct EventHandle(HANDLE);

impl EventHandle {
    fn new() -> Result<Self, RelayError> {
        unsafe {
            CreateEventW(None, false, false, PCWSTR::null())
                .map(Self)
                .map_err(|e| RelayError::StreamSetup(format!("CreateEventW failed: {}", e)))
        }
    }

    /// Block until WASAPI signals. No timeout: a hung device hangs the caller.
    pub fn wait(&self) -> Result<(), RelayError> {
        let result = unsafe { WaitForSingleObject(self.0, INFINITE) };
        if result == WAIT_FAILED {
            return Err(RelayError::RuntimeStream("WaitForSingleObject failed".into()));
        }
        Ok(())
    }
}

impl Drop for EventHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// An initialized, not yet started, WASAPI client.
///
/// Field order is drop order: the client is released before the event is
/// closed and COM is uninitialized.
pub(crate) struct StreamClient {
    pub client: IAudioClient,
    pub event: EventHandle,
    pub buffer_frames: u32,
    pub low_latency: bool,
    _com: ComGuard,
}

impl StreamClient {
    pub fn open(
        data_flow: EDataFlow,
        channels: u16,
        sample_rate: u32,
        buffer_bytes: u32,
        low_latency: bool,
    ) -> Result<Self, RelayError> {
        let com = ComGuard::init()?;
        let device = DeviceEnumerator::new()?.default_device(data_flow)?;
        let format = pcm16_format(sample_rate, channels);
        let event = EventHandle::new()?;

        let fast = if low_latency {
            match open_low_latency(&device, &format, &event) {
                Ok(client) => Some(client),
                Err(e) => {
                    log::debug!("Low-latency stream unavailable, using plain mode: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let (client, low_latency) = match fast {
            Some(client) => (client, true),
            None => (open_plain(&device, &format, &event, buffer_bytes)?, false),
        };

        let buffer_frames = unsafe {
            client
                .GetBufferSize()
                .map_err(|e| RelayError::StreamSetup(format!("GetBufferSize failed: {}", e)))?
        };

        Ok(Self {
            client,
            event,
            buffer_frames,
            low_latency,
            _com: com,
        })
    }

    pub fn start(&self) -> Result<(), RelayError> {
        unsafe {
            self.client
                .Start()
                .map_err(|e| RelayError::StreamSetup(format!("IAudioClient::Start failed: {}", e)))
        }
    }

    pub fn stop(&self) -> Result<(), RelayError> {
        unsafe {
            self.client
                .Stop()
                .map_err(|e| RelayError::RuntimeStream(format!("IAudioClient::Stop failed: {}", e)))
        }
    }

    /// Discard queued audio. Only valid while stopped.
    pub fn reset(&self) -> Result<(), RelayError> {
        unsafe {
            self.client
                .Reset()
                .map_err(|e| RelayError::RuntimeStream(format!("IAudioClient::Reset failed: {}", e)))
        }
    }

    pub fn service<T: Interface>(&self) -> Result<T, RelayError> {
        unsafe {
            self.client
                .GetService()
                .map_err(|e| RelayError::StreamSetup(format!("GetService failed: {}", e)))
        }
    }
}

fn open_low_latency(
    device: &IMMDevice,
    format: &WAVEFORMATEX,
    event: &EventHandle,
) -> Result<IAudioClient, RelayError> {
    unsafe {
        let client: IAudioClient3 = device
            .Activate(CLSCTX_ALL, None)
            .map_err(|e| RelayError::StreamSetup(format!("IAudioClient3 unavailable: {}", e)))?;

        let mut default_period = 0u32;
        let mut fundamental_period = 0u32;
        let mut min_period = 0u32;
        let mut max_period = 0u32;
        client
            .GetSharedModeEnginePeriod(
                format,
                &mut default_period,
                &mut fundamental_period,
                &mut min_period,
                &mut max_period,
            )
            .map_err(|e| RelayError::StreamSetup(format!("GetSharedModeEnginePeriod failed: {}", e)))?;

        client
            .InitializeSharedAudioStream(AUDCLNT_STREAMFLAGS_EVENTCALLBACK, min_period, format, None)
            .map_err(|e| RelayError::StreamSetup(format!("InitializeSharedAudioStream failed: {}", e)))?;
        client
            .SetEventHandle(event.0)
            .map_err(|e| RelayError::StreamSetup(format!("SetEventHandle failed: {}", e)))?;

        log::debug!("Low-latency stream at {} frames per period", min_period);
        client
            .cast::<IAudioClient>()
            .map_err(|e| RelayError::StreamSetup(format!("IAudioClient cast failed: {}", e)))
    }
}

fn open_plain(
    device: &IMMDevice,
    format: &WAVEFORMATEX,
    event: &EventHandle,
    buffer_bytes: u32,
) -> Result<IAudioClient, RelayError> {
    unsafe {
        let client: IAudioClient = device
            .Activate(CLSCTX_ALL, None)
            .map_err(|e| RelayError::StreamSetup(format!("Activate failed: {}", e)))?;

        let block_align = format.nBlockAlign.max(1) as u64;
        let sample_rate = format.nSamplesPerSec.max(1) as u64;
        let buffer_frames = buffer_bytes as u64 / block_align;
        let buffer_duration = (buffer_frames * HNS_PER_SECOND / sample_rate) as i64;

        client
            .Initialize(
                AUDCLNT_SHAREMODE_SHARED,
                AUDCLNT_STREAMFLAGS_EVENTCALLBACK
                    | AUDCLNT_STREAMFLAGS_AUTOCONVERTPCM
                    | AUDCLNT_STREAMFLAGS_SRC_DEFAULT_QUALITY
                    | AUDCLNT_STREAMFLAGS_NOPERSIST,
                buffer_duration,
                0,
                format,
                None,
            )
            .map_err(|e| RelayError::StreamSetup(format!("IAudioClient::Initialize failed: {}", e)))?;
        client
            .SetEventHandle(event.0)
            .map_err(|e| RelayError::StreamSetup(format!("SetEventHandle failed: {}", e)))?;

        Ok(client)
    }
}

/// Little-endian 16-bit PCM, interleaved when `channels > 1`.
pub(crate) fn pcm16_format(sample_rate: u32, channels: u16) -> WAVEFORMATEX {
    let block_align = channels * 2;
    WAVEFORMATEX {
        wFormatTag: WAVE_FORMAT_PCM as u16,
        nChannels: channels,
        nSamplesPerSec: sample_rate,
        nAvgBytesPerSec: sample_rate * block_align as u32,
        nBlockAlign: block_align,
        wBitsPerSample: 16,
        cbSize: 0,
    }
}

/// Convert a WASAPI period in 100 ns units to frames at `sample_rate`.
pub(crate) fn period_to_frames(period_hns: i64, sample_rate: u32) -> u32 {
    let frames = period_hns.max(0) as u64 * sample_rate as u64 + HNS_PER_SECOND / 2;
    (frames / HNS_PER_SECOND) as u32
}
