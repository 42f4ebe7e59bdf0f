/// Relay engine state machine.
///
/// State transitions:
/// ```text
/// idle → starting → running → stopping → idle
///   ↓        ↓         ↓
/// error ←────┴─────────┘
/// ```
///
/// `Error` is reached from `Idle` when the device gate rejects a start, and
/// from `Starting`/`Running` when a session faults. It is left by `stop()`
/// (back to `Idle`) or by a fresh `start()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Idle,
    Starting,
    Running,
    Stopping,
    Error(String),
}

impl EngineState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Whether a session thread may still own endpoints in this state.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Starting | Self::Running | Self::Stopping)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}
