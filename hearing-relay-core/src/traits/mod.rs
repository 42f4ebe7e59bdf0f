pub mod audio_platform;
pub mod endpoint;
pub mod observer;
