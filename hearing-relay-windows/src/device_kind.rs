//! Classification of render endpoints into relay output kinds.
//!
//! Kept free of Windows types so the mapping is testable everywhere.

use hearing_relay_core::OutputDeviceKind;

/// `EndpointFormFactor` values from `mmdeviceapi.h`.
pub mod form_factor {
    pub const SPEAKERS: u32 = 1;
    pub const LINE_LEVEL: u32 = 2;
    pub const HEADPHONES: u32 = 3;
    pub const HEADSET: u32 = 5;
    pub const HANDSET: u32 = 6;
    pub const SPDIF: u32 = 8;
    pub const DIGITAL_AUDIO_DISPLAY_DEVICE: u32 = 9;
}

/// Bus an endpoint hangs off, from `PKEY_Device_EnumeratorName`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bus {
    Bluetooth,
    Usb,
    Other,
}

impl Bus {
    pub fn from_enumerator_name(name: &str) -> Self {
        let name = name.to_ascii_uppercase();
        if name.starts_with("BTHENUM") || name.starts_with("BTHLEENUM") || name.starts_with("BTHHFENUM") {
            Self::Bluetooth
        } else if name.starts_with("USB") {
            Self::Usb
        } else {
            Self::Other
        }
    }
}

/// Map an endpoint's form factor and bus to an [`OutputDeviceKind`].
///
/// Bluetooth devices expose a stereo "headphones" endpoint for A2DP and a
/// separate "headset" endpoint for the hands-free profile.
pub fn classify(form_factor: u32, bus: Bus) -> OutputDeviceKind {
    use form_factor::*;

    match (bus, form_factor) {
        (Bus::Bluetooth, HEADPHONES) => OutputDeviceKind::BluetoothA2dp,
        (Bus::Bluetooth, HEADSET) => OutputDeviceKind::BluetoothSco,
        (Bus::Bluetooth, _) => OutputDeviceKind::Unknown,
        (Bus::Usb, HEADPHONES | HEADSET) => OutputDeviceKind::UsbHeadset,
        (Bus::Usb, _) => OutputDeviceKind::UsbDevice,
        (Bus::Other, HEADSET) => OutputDeviceKind::WiredHeadset,
        (Bus::Other, HEADPHONES) => OutputDeviceKind::WiredHeadphones,
        (Bus::Other, SPEAKERS | LINE_LEVEL) => OutputDeviceKind::BuiltInSpeaker,
        (Bus::Other, HANDSET) => OutputDeviceKind::BuiltInEarpiece,
        (Bus::Other, SPDIF | DIGITAL_AUDIO_DISPLAY_DEVICE) => OutputDeviceKind::Hdmi,
        (Bus::Other, _) => OutputDeviceKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::form_factor::*;
    use super::*;

    #[test]
    fn bus_from_enumerator_name() {
        assert_eq!(Bus::from_enumerator_name("BTHENUM"), Bus::Bluetooth);
        assert_eq!(Bus::from_enumerator_name("BTHLEENUM"), Bus::Bluetooth);
        assert_eq!(Bus::from_enumerator_name("usb"), Bus::Usb);
        assert_eq!(Bus::from_enumerator_name("HDAUDIO"), Bus::Other);
    }

    #[test]
    fn bluetooth_stereo_is_a2dp() {
        assert_eq!(classify(HEADPHONES, Bus::Bluetooth), OutputDeviceKind::BluetoothA2dp);
        assert_eq!(classify(HEADSET, Bus::Bluetooth), OutputDeviceKind::BluetoothSco);
    }

    #[test]
    fn usb_headgear_is_usb_headset() {
        assert_eq!(classify(HEADSET, Bus::Usb), OutputDeviceKind::UsbHeadset);
        assert_eq!(classify(HEADPHONES, Bus::Usb), OutputDeviceKind::UsbHeadset);
        assert_eq!(classify(SPEAKERS, Bus::Usb), OutputDeviceKind::UsbDevice);
    }

    #[test]
    fn jack_endpoints() {
        assert_eq!(classify(HEADPHONES, Bus::Other), OutputDeviceKind::WiredHeadphones);
        assert_eq!(classify(HEADSET, Bus::Other), OutputDeviceKind::WiredHeadset);
        assert_eq!(classify(SPEAKERS, Bus::Other), OutputDeviceKind::BuiltInSpeaker);
        assert_eq!(classify(DIGITAL_AUDIO_DISPLAY_DEVICE, Bus::Other), OutputDeviceKind::Hdmi);
    }

    #[test]
    fn only_head_worn_kinds_pass_the_gate() {
        assert!(classify(HEADPHONES, Bus::Bluetooth).is_head_worn());
        assert!(!classify(HEADSET, Bus::Bluetooth).is_head_worn());
        assert!(!classify(SPEAKERS, Bus::Other).is_head_worn());
        assert!(!classify(10, Bus::Other).is_head_worn());
    }
}
