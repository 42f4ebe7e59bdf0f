pub mod amplitude_meter;
pub mod panning;
pub mod stream_configurator;
