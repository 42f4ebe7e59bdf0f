//! Windows render-device enumeration via the MMDevice API.
//!
//! Wraps `IMMDeviceEnumerator` to list active render endpoints with friendly
//! names and a relay output kind derived from the endpoint form factor and
//! the bus it is attached to.

use windows::core::PROPVARIANT;
use windows::Win32::Devices::FunctionDiscovery::*;
use windows::Win32::Foundation::PROPERTYKEY;
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::*;
use windows::Win32::UI::Shell::PropertiesSystem::IPropertyStore;

use hearing_relay_core::{OutputDevice, RelayError};

use crate::device_kind::{classify, Bus};

/// Audio device enumerator using the Windows MMDevice API.
pub struct DeviceEnumerator {
    enumerator: IMMDeviceEnumerator,
}

impl DeviceEnumerator {
    /// Create a new device enumerator.
    ///
    /// Requires COM to be initialized on the calling thread.
    pub fn new() -> Result<Self, RelayError> {
        unsafe {
            let enumerator: IMMDeviceEnumerator = CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                .map_err(|e| RelayError::Enumeration(format!("failed to create enumerator: {}", e)))?;
            Ok(Self { enumerator })
        }
    }

    /// Default endpoint for `data_flow` in the console role.
    pub fn default_device(&self, data_flow: EDataFlow) -> Result<IMMDevice, RelayError> {
        unsafe {
            self.enumerator
                .GetDefaultAudioEndpoint(data_flow, eConsole)
                .map_err(|e| RelayError::StreamSetup(format!("no default endpoint: {}", e)))
        }
    }

    /// List active render (output) devices.
    pub fn list_render_devices(&self) -> Result<Vec<OutputDevice>, RelayError> {
        unsafe {
            let collection = self
                .enumerator
                .EnumAudioEndpoints(eRender, DEVICE_STATE_ACTIVE)
                .map_err(|e| RelayError::Enumeration(format!("EnumAudioEndpoints failed: {}", e)))?;

            let count = collection
                .GetCount()
                .map_err(|e| RelayError::Enumeration(format!("GetCount failed: {}", e)))?;

            let default_id = self
                .enumerator
                .GetDefaultAudioEndpoint(eRender, eConsole)
                .ok()
                .and_then(|d| d.GetId().ok())
                .and_then(|id| id.to_string().ok());

            let mut devices = Vec::new();

            for i in 0..count {
                let Ok(device) = collection.Item(i) else {
                    continue;
                };
                let Some(id) = device.GetId().ok().and_then(|id| id.to_string().ok()) else {
                    continue;
                };

                let store = device.OpenPropertyStore(STGM_READ).ok();
                let name = store
                    .as_ref()
                    .and_then(|s| read_string(s, &PKEY_Device_FriendlyName))
                    .unwrap_or_else(|| format!("Device {}", i));
                let form_factor = store
                    .as_ref()
                    .and_then(|s| read_u32(s, &PKEY_AudioEndpoint_FormFactor))
                    .unwrap_or(0);
                let bus = store
                    .as_ref()
                    .and_then(|s| read_string(s, &PKEY_Device_EnumeratorName))
                    .map(|n| Bus::from_enumerator_name(&n))
                    .unwrap_or(Bus::Other);

                let kind = classify(form_factor, bus);
                log::debug!("Render endpoint {:?}: form factor {}, {:?} → {:?}", name, form_factor, bus, kind);

                devices.push(OutputDevice {
                    is_default: default_id.as_deref() == Some(id.as_str()),
                    id,
                    name,
                    kind,
                });
            }

            Ok(devices)
        }
    }
}

fn read_value(store: &IPropertyStore, key: &PROPERTYKEY) -> Option<PROPVARIANT> {
    unsafe { store.GetValue(key).ok() }
}

fn read_string(store: &IPropertyStore, key: &PROPERTYKEY) -> Option<String> {
    let value = read_value(store, key)?;
    let text = value.to_string();
    (!text.is_empty()).then_some(text)
}

fn read_u32(store: &IPropertyStore, key: &PROPERTYKEY) -> Option<u32> {
    let value = read_value(store, key)?;
    u32::try_from(&value).ok()
}
