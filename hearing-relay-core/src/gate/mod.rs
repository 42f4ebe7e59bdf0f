pub mod device_gate;
