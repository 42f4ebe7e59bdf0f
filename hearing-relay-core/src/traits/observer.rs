use std::sync::Arc;

/// Callback receiving the loudness level (0–100) of each processed block.
///
/// Runs on the engine's notification thread, never on the relay thread.
pub type AmplitudeObserver = Arc<dyn Fn(u8) + Send + Sync + 'static>;

/// Callback receiving a human-readable message when a session fails.
pub type ErrorObserver = Arc<dyn Fn(&str) + Send + Sync + 'static>;
