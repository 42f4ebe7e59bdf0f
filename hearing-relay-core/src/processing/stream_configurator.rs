use crate::models::config::{RelayConfiguration, StreamConfig};
use crate::traits::audio_platform::AudioPlatform;

const BYTES_PER_SAMPLE: u32 = 2;
const STEREO_CHANNELS: u32 = 2;

/// Resolves per-session stream sizing from the platform's native values.
///
/// Matching the hardware burst keeps the relay from resampling and keeps
/// the number of buffer hand-offs between capture and render at one per
/// block. All platform-specific tuning lives behind [`AudioPlatform`] and
/// [`RelayConfiguration`]; the relay loop only sees the resulting
/// [`StreamConfig`].
#[derive(Debug, Clone)]
pub struct StreamConfigurator {
    config: RelayConfiguration,
}

impl StreamConfigurator {
    pub fn new(config: RelayConfiguration) -> Self {
        Self { config }
    }

    pub fn resolve(&self, platform: &dyn AudioPlatform) -> StreamConfig {
        let sample_rate = platform
            .preferred_sample_rate()
            .filter(|&rate| rate > 0)
            .unwrap_or(self.config.fallback_sample_rate);
        let burst_frames = platform
            .preferred_burst_frames(self.config.low_latency)
            .filter(|&frames| frames > 0)
            .unwrap_or(self.config.fallback_burst_frames);

        let min_capture = platform.min_capture_buffer_bytes(sample_rate).unwrap_or(0);
        let capture_buffer_bytes =
            min_capture.max(burst_frames.saturating_mul(self.config.capture_buffer_multiplier));
        let render_buffer_bytes = capture_buffer_bytes
            .max(burst_frames.saturating_mul(STEREO_CHANNELS * BYTES_PER_SAMPLE));

        StreamConfig {
            sample_rate,
            burst_frames,
            capture_buffer_bytes,
            render_buffer_bytes,
            read_chunk_frames: burst_frames as usize,
            write_chunk_samples: burst_frames as usize * STEREO_CHANNELS as usize,
            low_latency: self.config.low_latency,
        }
    }
}

impl Default for StreamConfigurator {
    fn default() -> Self {
        Self::new(RelayConfiguration::default())
    }
}
