use serde::{Deserialize, Serialize};

/// Kind of an attached output device, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputDeviceKind {
    BuiltInSpeaker,
    BuiltInEarpiece,
    WiredHeadset,
    WiredHeadphones,
    BluetoothA2dp,
    BluetoothSco,
    UsbHeadset,
    UsbDevice,
    Hdmi,
    Unknown,
}

impl OutputDeviceKind {
    /// Whether playback on this kind stays in the listener's ears.
    ///
    /// Hands-free Bluetooth (SCO) and generic USB audio are excluded: both are
    /// commonly car kits, speakerphones or docks.
    pub fn is_head_worn(&self) -> bool {
        matches!(
            self,
            Self::WiredHeadset | Self::WiredHeadphones | Self::BluetoothA2dp | Self::UsbHeadset
        )
    }
}

/// An output device currently attached to the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputDevice {
    pub id: String,
    pub name: String,
    pub kind: OutputDeviceKind,
    pub is_default: bool,
}

/// Counters for the most recent relay session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayDiagnostics {
    pub blocks_processed: u64,
    pub empty_reads: u64,
    pub frames_rendered: u64,
}
