use thiserror::Error;

/// Errors raised by the relay engine and its platform backends.
///
/// Session failures are never returned to the caller of `start()`; they are
/// carried in [`EngineState::Error`](super::state::EngineState) and reported
/// through the error observer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// No headphone-class output is attached; relaying would feed back
    /// through an open-air speaker.
    #[error("Please connect wired, USB or Bluetooth headphones before starting.")]
    DeviceNotSafe,

    #[error("stream setup failed: {0}")]
    StreamSetup(String),

    #[error("stream failed: {0}")]
    RuntimeStream(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("device enumeration failed: {0}")]
    Enumeration(String),

    #[error("failed to spawn thread: {0}")]
    ThreadSpawn(String),
}

impl RelayError {
    /// Human-readable text handed to the error observer.
    pub fn user_message(&self) -> String {
        match self {
            Self::DeviceNotSafe => self.to_string(),
            other => format!("Engine Error: {}", other),
        }
    }
}
