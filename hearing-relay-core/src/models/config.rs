use serde::{Deserialize, Serialize};

use super::error::RelayError;

/// Tuning knobs for stream sizing.
///
/// The defaults are the values used when the platform cannot report its
/// native output rate or burst size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfiguration {
    /// Sample rate in Hz used when the platform reports none (default: 48000).
    pub fallback_sample_rate: u32,

    /// Burst frame count used when the platform reports none (default: 256).
    pub fallback_burst_frames: u32,

    /// Capture buffer floor in bursts; the buffer is at least
    /// `capture_buffer_multiplier × burst` bytes (default: 2).
    pub capture_buffer_multiplier: u32,

    /// Request the platform's low-latency/performance mode (default: true).
    pub low_latency: bool,
}

impl RelayConfiguration {
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.fallback_sample_rate == 0 {
            return Err(RelayError::Configuration("fallback sample rate must be positive".into()));
        }
        if self.fallback_burst_frames == 0 {
            return Err(RelayError::Configuration("fallback burst size must be positive".into()));
        }
        if self.capture_buffer_multiplier == 0 {
            return Err(RelayError::Configuration(
                "capture buffer multiplier must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, RelayError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RelayError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for RelayConfiguration {
    fn default() -> Self {
        Self {
            fallback_sample_rate: 48000,
            fallback_burst_frames: 256,
            capture_buffer_multiplier: 2,
            low_latency: true,
        }
    }
}

/// Resolved stream parameters for one relay session.
///
/// Computed fresh by `StreamConfigurator` on every start and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamConfig {
    pub sample_rate: u32,

    /// Hardware-preferred frames per I/O transaction.
    pub burst_frames: u32,

    /// Capture endpoint buffer, bytes of 16-bit mono.
    pub capture_buffer_bytes: u32,

    /// Render endpoint buffer, bytes of 16-bit stereo.
    pub render_buffer_bytes: u32,

    /// Mono frames requested per blocking read.
    pub read_chunk_frames: usize,

    /// Interleaved stereo samples written per processed block.
    pub write_chunk_samples: usize,

    pub low_latency: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RelayConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fallback_sample_rate, 48000);
        assert_eq!(config.fallback_burst_frames, 256);
    }

    #[test]
    fn rejects_zero_burst() {
        let config = RelayConfiguration {
            fallback_burst_frames: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RelayError::Configuration(_))));
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config = RelayConfiguration::from_json(r#"{ "low_latency": false }"#).unwrap();
        assert!(!config.low_latency);
        assert_eq!(config.fallback_sample_rate, 48000);
    }

    #[test]
    fn json_is_validated() {
        let result = RelayConfiguration::from_json(r#"{ "fallback_sample_rate": 0 }"#);
        assert!(matches!(result, Err(RelayError::Configuration(_))));
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        let result = RelayConfiguration::from_json("{ not json");
        assert!(matches!(result, Err(RelayError::Configuration(_))));
    }
}
