use windows::Win32::Foundation::RPC_E_CHANGED_MODE;
use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_MULTITHREADED};

use hearing_relay_core::RelayError;

/// RAII guard pairing `CoInitializeEx` with `CoUninitialize` on this thread.
pub(crate) struct ComGuard {
    owned: bool,
}

impl ComGuard {
    pub fn init() -> Result<Self, RelayError> {
        let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        if hr == RPC_E_CHANGED_MODE {
            // Host thread is already an STA; COM is usable, but not ours to tear down.
            return Ok(Self { owned: false });
        }
        hr.ok()
            .map_err(|e| RelayError::StreamSetup(format!("CoInitializeEx failed: {}", e)))?;
        Ok(Self { owned: true })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.owned {
            unsafe {
                CoUninitialize();
            }
        }
    }
}
