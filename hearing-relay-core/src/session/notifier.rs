use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};

use crate::models::error::RelayError;
use crate::traits::observer::{AmplitudeObserver, ErrorObserver};

#[derive(Default)]
struct Pending {
    level: Option<u8>,
    error: Option<String>,
    shutdown: bool,
}

#[derive(Default)]
struct Shared {
    pending: Mutex<Pending>,
    wake: Condvar,
    amplitude: Mutex<Option<AmplitudeObserver>>,
    error: Mutex<Option<ErrorObserver>>,
}

/// Delivers amplitude levels and error messages to the registered observers
/// on a dedicated thread.
///
/// Publishing only overwrites a single pending slot and signals, so a slow
/// observer can never stall the relay loop. A level that has not been
/// delivered yet is replaced by the next one.
pub struct Notifier {
    shared: Arc<Shared>,
    handle: Option<thread::JoinHandle<()>>,
}

/// Cheap publishing handle given to relay threads.
#[derive(Clone)]
pub struct Publisher {
    shared: Arc<Shared>,
}

impl Notifier {
    pub fn spawn() -> Result<Self, RelayError> {
        let shared = Arc::new(Shared::default());
        let worker = Arc::clone(&shared);

        let handle = thread::Builder::new()
            .name("hearing-relay-notify".into())
            .spawn(move || deliver_loop(&worker))
            .map_err(|e| RelayError::ThreadSpawn(format!("notifier: {}", e)))?;

        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    pub fn publisher(&self) -> Publisher {
        Publisher {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Register the amplitude observer, replacing any previous one.
    pub fn set_amplitude_observer(&self, observer: AmplitudeObserver) {
        *self.shared.amplitude.lock() = Some(observer);
    }

    pub fn clear_amplitude_observer(&self) {
        *self.shared.amplitude.lock() = None;
    }

    /// Register the error observer, replacing any previous one.
    pub fn set_error_observer(&self, observer: ErrorObserver) {
        *self.shared.error.lock() = Some(observer);
    }

    pub fn clear_error_observer(&self) {
        *self.shared.error.lock() = None;
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.shared.pending.lock().shutdown = true;
        self.shared.wake.notify_one();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Notifier thread panicked");
            }
        }
    }
}

impl Publisher {
    pub fn publish_level(&self, level: u8) {
        self.shared.pending.lock().level = Some(level);
        self.shared.wake.notify_one();
    }

    pub fn publish_error(&self, message: String) {
        self.shared.pending.lock().error = Some(message);
        self.shared.wake.notify_one();
    }
}

fn deliver_loop(shared: &Shared) {
    loop {
        let (level, error, shutdown) = {
            let mut pending = shared.pending.lock();
            while pending.level.is_none() && pending.error.is_none() && !pending.shutdown {
                shared.wake.wait(&mut pending);
            }
            (pending.level.take(), pending.error.take(), pending.shutdown)
        };

        // Observers are cloned out so they run without any lock held and may
        // re-register themselves.
        if let Some(message) = error {
            let observer = shared.error.lock().clone();
            if let Some(observer) = observer {
                observer(&message);
            }
        }
        if let Some(level) = level {
            let observer = shared.amplitude.lock().clone();
            if let Some(observer) = observer {
                observer(level);
            }
        }

        if shutdown {
            break;
        }
    }
}
