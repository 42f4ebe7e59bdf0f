use crate::models::audio_models::OutputDevice;
use crate::traits::audio_platform::AudioPlatform;

/// Refuses to open the relay unless a head-worn output is attached.
///
/// Relaying a microphone to an open-air speaker feeds the speaker back into
/// the microphone. The gate is a pure query: devices come and go, so it is
/// evaluated on every start and every standalone check, never cached.
pub struct DeviceGate;

impl DeviceGate {
    pub fn is_output_safe(platform: &dyn AudioPlatform) -> bool {
        match platform.output_devices() {
            Ok(devices) => Self::any_safe(&devices),
            Err(e) => {
                log::warn!("Output device query failed, treating output as unsafe: {}", e);
                false
            }
        }
    }

    pub fn any_safe(devices: &[OutputDevice]) -> bool {
        devices.iter().any(|device| device.kind.is_head_worn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audio_models::OutputDeviceKind;
    use crate::session::test_support::MockPlatform;

    fn device(kind: OutputDeviceKind) -> OutputDevice {
        OutputDevice {
            id: format!("{:?}", kind),
            name: format!("{:?}", kind),
            kind,
            is_default: false,
        }
    }

    #[test]
    fn no_devices_is_unsafe() {
        let platform = MockPlatform::new();
        platform.set_devices(vec![]);
        assert!(!DeviceGate::is_output_safe(&platform));
    }

    #[test]
    fn speaker_only_is_unsafe() {
        let platform = MockPlatform::new();
        platform.set_devices(vec![
            device(OutputDeviceKind::BuiltInSpeaker),
            device(OutputDeviceKind::BuiltInEarpiece),
        ]);
        assert!(!DeviceGate::is_output_safe(&platform));
    }

    #[test]
    fn each_allowed_kind_is_safe() {
        for kind in [
            OutputDeviceKind::WiredHeadset,
            OutputDeviceKind::WiredHeadphones,
            OutputDeviceKind::BluetoothA2dp,
            OutputDeviceKind::UsbHeadset,
        ] {
            let platform = MockPlatform::new();
            platform.set_devices(vec![device(OutputDeviceKind::BuiltInSpeaker), device(kind)]);
            assert!(DeviceGate::is_output_safe(&platform), "{:?} should be safe", kind);
        }
    }

    #[test]
    fn other_external_kinds_are_unsafe() {
        for kind in [
            OutputDeviceKind::BluetoothSco,
            OutputDeviceKind::UsbDevice,
            OutputDeviceKind::Hdmi,
            OutputDeviceKind::Unknown,
        ] {
            assert!(!DeviceGate::any_safe(&[device(kind)]), "{:?} should be unsafe", kind);
        }
    }

    #[test]
    fn enumeration_failure_is_unsafe() {
        let platform = MockPlatform::new();
        platform.fail_enumeration(true);
        assert!(!DeviceGate::is_output_safe(&platform));
    }

    #[test]
    fn re_evaluated_on_every_call() {
        let platform = MockPlatform::new();
        platform.set_devices(vec![]);
        assert!(!DeviceGate::is_output_safe(&platform));

        platform.set_devices(vec![device(OutputDeviceKind::WiredHeadphones)]);
        assert!(DeviceGate::is_output_safe(&platform));
    }
}
