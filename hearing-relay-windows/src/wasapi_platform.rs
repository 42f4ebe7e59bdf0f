//! `AudioPlatform` implementation on top of WASAPI.

use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::*;

use hearing_relay_core::{
    AudioPlatform, CaptureEndpoint, OutputDevice, RelayError, RenderEndpoint, StreamConfig,
};

use crate::com::ComGuard;
use crate::device_enumerator::DeviceEnumerator;
use crate::wasapi_capture::WasapiCapture;
use crate::wasapi_render::WasapiRender;
use crate::wasapi_stream::{pcm16_format, period_to_frames};

const BYTES_PER_MONO_FRAME: u32 = 2;

/// Default-device WASAPI platform.
///
/// Queries always look at the current default endpoints, so plugging in a
/// headset between sessions is picked up by the next start. Latency mode
/// comes from the engine's `RelayConfiguration`.
#[derive(Debug, Default)]
pub struct WasapiPlatform;

impl WasapiPlatform {
    pub fn new() -> Self {
        Self
    }

    fn with_client<T>(
        data_flow: EDataFlow,
        query: impl FnOnce(&IAudioClient) -> Result<T, RelayError>,
    ) -> Result<T, RelayError> {
        let _com = ComGuard::init()?;
        let device = DeviceEnumerator::new()?.default_device(data_flow)?;
        let client: IAudioClient = unsafe {
            device
                .Activate(CLSCTX_ALL, None)
                .map_err(|e| RelayError::StreamSetup(format!("Activate failed: {}", e)))?
        };
        query(&client)
    }
}

fn mix_rate(client: &IAudioClient) -> Result<u32, RelayError> {
    unsafe {
        let format_ptr = client
            .GetMixFormat()
            .map_err(|e| RelayError::StreamSetup(format!("GetMixFormat failed: {}", e)))?;
        let rate = (*format_ptr).nSamplesPerSec;
        CoTaskMemFree(Some(format_ptr as *const _));
        Ok(rate)
    }
}

fn device_periods(client: &IAudioClient) -> Result<(i64, i64), RelayError> {
    let mut default_period = 0i64;
    let mut min_period = 0i64;
    unsafe {
        client
            .GetDevicePeriod(Some(&mut default_period as *mut i64), Some(&mut min_period as *mut i64))
            .map_err(|e| RelayError::StreamSetup(format!("GetDevicePeriod failed: {}", e)))?;
    }
    Ok((default_period, min_period))
}

fn engine_min_period(client: &IAudioClient, sample_rate: u32) -> Result<u32, RelayError> {
    use windows::core::Interface;

    let client: IAudioClient3 = client
        .cast()
        .map_err(|e| RelayError::StreamSetup(format!("IAudioClient3 unavailable: {}", e)))?;
    let format = pcm16_format(sample_rate, 2);
    let (mut default_period, mut fundamental, mut min_period, mut max_period) = (0u32, 0u32, 0u32, 0u32);
    unsafe {
        client
            .GetSharedModeEnginePeriod(
                &format,
                &mut default_period,
                &mut fundamental,
                &mut min_period,
                &mut max_period,
            )
            .map_err(|e| RelayError::StreamSetup(format!("GetSharedModeEnginePeriod failed: {}", e)))?;
    }
    Ok(min_period)
}

impl AudioPlatform for WasapiPlatform {
    fn output_devices(&self) -> Result<Vec<OutputDevice>, RelayError> {
        let _com = ComGuard::init().map_err(|e| RelayError::Enumeration(e.to_string()))?;
        DeviceEnumerator::new()?.list_render_devices()
    }

    fn preferred_sample_rate(&self) -> Option<u32> {
        Self::with_client(eRender, mix_rate)
            .map_err(|e| log::debug!("No native output rate: {}", e))
            .ok()
    }

    fn preferred_burst_frames(&self, low_latency: bool) -> Option<u32> {
        Self::with_client(eRender, |client| {
            let rate = mix_rate(client)?;
            if low_latency {
                match engine_min_period(client, rate) {
                    Ok(frames) if frames > 0 => return Ok(frames),
                    Ok(_) => {}
                    Err(e) => log::debug!("Falling back to device period: {}", e),
                }
            }
            let (default_period, _) = device_periods(client)?;
            Ok(period_to_frames(default_period, rate))
        })
        .map_err(|e| log::debug!("No native burst size: {}", e))
        .ok()
    }

    fn min_capture_buffer_bytes(&self, sample_rate: u32) -> Option<u32> {
        Self::with_client(eCapture, |client| {
            let (_, min_period) = device_periods(client)?;
            Ok(period_to_frames(min_period, sample_rate) * BYTES_PER_MONO_FRAME)
        })
        .map_err(|e| log::debug!("No capture buffer minimum: {}", e))
        .ok()
    }

    fn open_capture(&self, config: &StreamConfig) -> Result<Box<dyn CaptureEndpoint>, RelayError> {
        Ok(Box::new(WasapiCapture::open(config)?))
    }

    fn open_render(&self, config: &StreamConfig) -> Result<Box<dyn RenderEndpoint>, RelayError> {
        Ok(Box::new(WasapiRender::open(config)?))
    }
}
