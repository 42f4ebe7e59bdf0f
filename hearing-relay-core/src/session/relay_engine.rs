use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::gate::device_gate::DeviceGate;
use crate::models::audio_models::{OutputDevice, RelayDiagnostics};
use crate::models::config::{RelayConfiguration, StreamConfig};
use crate::models::error::RelayError;
use crate::models::state::EngineState;
use crate::processing::amplitude_meter;
use crate::processing::panning::Panner;
use crate::processing::stream_configurator::StreamConfigurator;
use crate::session::balance::BalanceState;
use crate::session::notifier::{Notifier, Publisher};
use crate::traits::audio_platform::AudioPlatform;
use crate::traits::endpoint::{CaptureEndpoint, RenderEndpoint};
use crate::traits::observer::{AmplitudeObserver, ErrorObserver};

/// Set while any engine in the process has a session live.
static ACTIVE_SESSION: AtomicBool = AtomicBool::new(false);

/// Ownership of an active-session slot. Released on drop, which happens when
/// the relay thread finishes or when the thread never got spawned.
struct ActiveClaim {
    slot: &'static AtomicBool,
}

impl ActiveClaim {
    fn acquire(slot: &'static AtomicBool) -> Option<Self> {
        slot.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { slot })
    }
}

impl Drop for ActiveClaim {
    fn drop(&mut self) {
        self.slot.store(false, Ordering::Release);
    }
}

/// Internal mutable session state, protected by `parking_lot::Mutex`.
#[derive(Default)]
struct SessionState {
    state: EngineState,
    stream_config: Option<StreamConfig>,
    session_id: Option<Uuid>,
}

/// Per-session counters, bumped by the relay thread without locking.
#[derive(Default)]
struct DiagnosticCounters {
    blocks_processed: AtomicU64,
    empty_reads: AtomicU64,
    frames_rendered: AtomicU64,
}

impl DiagnosticCounters {
    fn snapshot(&self) -> RelayDiagnostics {
        RelayDiagnostics {
            blocks_processed: self.blocks_processed.load(Ordering::Relaxed),
            empty_reads: self.empty_reads.load(Ordering::Relaxed),
            frames_rendered: self.frames_rendered.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.blocks_processed.store(0, Ordering::Relaxed);
        self.empty_reads.store(0, Ordering::Relaxed);
        self.frames_rendered.store(0, Ordering::Relaxed);
    }
}

/// Control-side handle on the live session thread.
struct Lifecycle {
    cancel: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

/// Live microphone → headset relay.
///
/// Generic over the platform audio system via the `AudioPlatform` trait.
/// Each session runs on its own thread:
/// ```text
/// [Capture] → mono block ─┬→ [Panner (balance)] → stereo block → [Render]
///                         └→ [Amplitude meter] → level → [Notifier] → observer
/// ```
///
/// All methods take `&self`; the engine is meant to be held in an `Arc` and
/// shared between the host's control surfaces. Only one session may be live
/// per process: start() is a no-op while this or any other engine is
/// relaying.
pub struct RelayEngine<P: AudioPlatform + 'static> {
    platform: Arc<P>,
    configurator: StreamConfigurator,
    session_state: Arc<Mutex<SessionState>>,
    diagnostics: Arc<DiagnosticCounters>,
    active_slot: &'static AtomicBool,
    balance: Arc<BalanceState>,
    lifecycle: Mutex<Lifecycle>,
    notifier: Notifier,
}

impl<P: AudioPlatform + 'static> RelayEngine<P> {
    pub fn new(platform: P) -> Result<Self, RelayError> {
        Self::with_configuration(platform, RelayConfiguration::default())
    }

    pub fn with_configuration(platform: P, config: RelayConfiguration) -> Result<Self, RelayError> {
        Self::with_active_slot(platform, config, &ACTIVE_SESSION)
    }

    fn with_active_slot(
        platform: P,
        config: RelayConfiguration,
        active_slot: &'static AtomicBool,
    ) -> Result<Self, RelayError> {
        config.validate()?;
        Ok(Self {
            platform: Arc::new(platform),
            configurator: StreamConfigurator::new(config),
            session_state: Arc::new(Mutex::new(SessionState::default())),
            diagnostics: Arc::new(DiagnosticCounters::default()),
            active_slot,
            balance: Arc::new(BalanceState::default()),
            lifecycle: Mutex::new(Lifecycle {
                cancel: Arc::new(AtomicBool::new(false)),
                handle: None,
            }),
            notifier: Notifier::spawn()?,
        })
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn state(&self) -> EngineState {
        self.session_state.lock().state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.session_state.lock().state.is_running()
    }

    /// Whether a head-worn output is attached right now.
    pub fn is_output_safe(&self) -> bool {
        DeviceGate::is_output_safe(&*self.platform)
    }

    pub fn available_output_devices(&self) -> Result<Vec<OutputDevice>, RelayError> {
        self.platform.output_devices()
    }

    pub fn balance(&self) -> f32 {
        self.balance.load()
    }

    /// Set the stereo balance, -1.0 (left) to 1.0 (right).
    ///
    /// Takes effect at the next processed block. Persists across sessions.
    pub fn set_balance(&self, balance: f32) {
        self.balance.store(balance);
    }

    pub fn set_amplitude_observer<F>(&self, observer: F)
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        let observer: AmplitudeObserver = Arc::new(observer);
        self.notifier.set_amplitude_observer(observer);
    }

    pub fn clear_amplitude_observer(&self) {
        self.notifier.clear_amplitude_observer();
    }

    pub fn set_error_observer<F>(&self, observer: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let observer: ErrorObserver = Arc::new(observer);
        self.notifier.set_error_observer(observer);
    }

    pub fn clear_error_observer(&self) {
        self.notifier.clear_error_observer();
    }

    /// Stream parameters of the most recent session, if one got that far.
    pub fn last_stream_config(&self) -> Option<StreamConfig> {
        self.session_state.lock().stream_config
    }

    pub fn diagnostics(&self) -> RelayDiagnostics {
        self.diagnostics.snapshot()
    }

    /// Start relaying. Transitions: idle/error → starting → running.
    ///
    /// Returns immediately; endpoint setup happens on the relay thread and
    /// failures are reported through the error observer. A no-op while a
    /// session is live on this or any other engine.
    pub fn start(&self) {
        let mut lifecycle = self.lifecycle.lock();

        if self.session_state.lock().state.is_live() {
            log::debug!("Relay already active, ignoring start");
            return;
        }

        // A faulted session has already torn down; reap its thread before
        // opening anything new.
        if let Some(handle) = lifecycle.handle.take() {
            if handle.join().is_err() {
                log::error!("Previous relay thread panicked");
            }
        }

        if !DeviceGate::is_output_safe(&*self.platform) {
            let error = RelayError::DeviceNotSafe;
            log::warn!("Relay refused: {}", error);
            self.fail(&error);
            return;
        }

        let Some(claim) = ActiveClaim::acquire(self.active_slot) else {
            log::warn!("Another relay session is live, ignoring start");
            return;
        };

        let session_id = Uuid::new_v4();
        let cancel = Arc::new(AtomicBool::new(false));
        {
            let mut s = self.session_state.lock();
            s.state = EngineState::Starting;
            s.stream_config = None;
            s.session_id = Some(session_id);
        }
        self.diagnostics.reset();

        let session = RelaySession {
            id: session_id,
            platform: Arc::clone(&self.platform),
            configurator: self.configurator.clone(),
            balance: Arc::clone(&self.balance),
            session_state: Arc::clone(&self.session_state),
            diagnostics: Arc::clone(&self.diagnostics),
            publisher: self.notifier.publisher(),
            cancel: Arc::clone(&cancel),
            _claim: claim,
        };

        match thread::Builder::new()
            .name("hearing-relay".into())
            .spawn(move || session.run())
        {
            Ok(handle) => {
                lifecycle.cancel = cancel;
                lifecycle.handle = Some(handle);
            }
            // A failed spawn drops the closure, and the claim with it.
            Err(e) => self.fail(&RelayError::ThreadSpawn(format!("relay: {}", e))),
        }
    }

    /// Stop relaying and release every native handle.
    /// Transitions: starting/running/error → stopping → idle.
    ///
    /// Blocks until the relay thread has torn down, which takes at most one
    /// blocking read plus one blocking write.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock();

        let current = self.state();
        if current.is_idle() {
            return;
        }

        match lifecycle.handle.take() {
            Some(handle) => {
                if current.is_live() {
                    self.session_state.lock().state = EngineState::Stopping;
                }
                lifecycle.cancel.store(true, Ordering::Release);
                if handle.join().is_err() {
                    log::error!("Relay thread panicked");
                }
            }
            None => {
                // Rejected before any endpoint was opened; only the meter
                // needs resetting.
                self.notifier.publisher().publish_level(0);
            }
        }

        self.session_state.lock().state = EngineState::Idle;
        log::info!("Relay stopped");
    }

    fn fail(&self, error: &RelayError) {
        let message = error.user_message();
        self.session_state.lock().state = EngineState::Error(message.clone());
        self.notifier.publisher().publish_error(message);
    }
}

impl<P: AudioPlatform + 'static> Drop for RelayEngine<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Everything the relay thread needs, moved onto it at start. The active
/// claim is held until the thread exits.
struct RelaySession<P: AudioPlatform + 'static> {
    id: Uuid,
    platform: Arc<P>,
    configurator: StreamConfigurator,
    balance: Arc<BalanceState>,
    session_state: Arc<Mutex<SessionState>>,
    diagnostics: Arc<DiagnosticCounters>,
    publisher: Publisher,
    cancel: Arc<AtomicBool>,
    _claim: ActiveClaim,
}

impl<P: AudioPlatform + 'static> RelaySession<P> {
    fn run(self) {
        let mut endpoints = SessionEndpoints {
            session: &self,
            capture: None,
            render: None,
            fault: None,
        };
        if let Err(e) = self.relay(&mut endpoints) {
            endpoints.fault = Some(e);
        }
        // `endpoints` drops here and tears the session down, also when
        // `relay` unwinds.
    }

    fn relay(&self, endpoints: &mut SessionEndpoints<'_, P>) -> Result<(), RelayError> {
        let config = self.configurator.resolve(&*self.platform);
        log::debug!("Relay {} stream config: {:?}", self.id, config);
        self.session_state.lock().stream_config = Some(config);

        endpoints.capture = Some(self.platform.open_capture(&config)?);
        endpoints.render = Some(self.platform.open_render(&config)?);

        let SessionEndpoints {
            capture: Some(capture),
            render: Some(render),
            ..
        } = endpoints
        else {
            return Err(RelayError::StreamSetup("endpoints missing after open".into()));
        };

        capture.start()?;
        render.start()?;

        {
            let mut s = self.session_state.lock();
            if s.state == EngineState::Starting {
                s.state = EngineState::Running;
            }
        }
        log::info!(
            "Relay {} running at {} Hz, {} frames per block",
            self.id,
            config.sample_rate,
            config.burst_frames
        );

        let mut mono = vec![0i16; config.read_chunk_frames];
        let mut stereo = vec![0i16; config.write_chunk_samples];

        while !self.cancel.load(Ordering::Acquire) {
            let frames = capture.read(&mut mono)?.min(mono.len());
            if frames == 0 {
                self.diagnostics.empty_reads.fetch_add(1, Ordering::Relaxed);
                continue;
            }
            let block = &mono[..frames];

            let panner = Panner::new(self.balance.load());
            let written = panner.process_into(block, &mut stereo);
            render.write(&stereo[..written])?;

            self.publisher.publish_level(amplitude_meter::level(block));

            self.diagnostics.blocks_processed.fetch_add(1, Ordering::Relaxed);
            self.diagnostics
                .frames_rendered
                .fetch_add(frames as u64, Ordering::Relaxed);
        }

        Ok(())
    }

    fn teardown(
        &self,
        capture: Option<Box<dyn CaptureEndpoint>>,
        render: Option<Box<dyn RenderEndpoint>>,
        fault: Option<RelayError>,
    ) {
        if let Some(mut capture) = capture {
            if let Err(e) = capture.stop() {
                log::warn!("Relay {}: capture stop failed: {}", self.id, e);
            }
        }
        if let Some(mut render) = render {
            if let Err(e) = render.stop() {
                log::warn!("Relay {}: render stop failed: {}", self.id, e);
            }
            if let Err(e) = render.flush() {
                log::warn!("Relay {}: render flush failed: {}", self.id, e);
            }
        }

        self.publisher.publish_level(0);

        let stop_requested = self.cancel.load(Ordering::Acquire);
        let mut s = self.session_state.lock();
        match fault {
            Some(error) => {
                log::error!("Relay {} failed: {}", self.id, error);
                let message = error.user_message();
                s.state = if stop_requested {
                    EngineState::Idle
                } else {
                    EngineState::Error(message.clone())
                };
                drop(s);
                self.publisher.publish_error(message);
            }
            None => {
                s.state = EngineState::Idle;
            }
        }
    }
}

/// Endpoints of one session. Dropping it runs the session teardown exactly
/// once, whichever way the relay thread leaves `relay`.
struct SessionEndpoints<'a, P: AudioPlatform + 'static> {
    session: &'a RelaySession<P>,
    capture: Option<Box<dyn CaptureEndpoint>>,
    render: Option<Box<dyn RenderEndpoint>>,
    fault: Option<RelayError>,
}

impl<P: AudioPlatform + 'static> Drop for SessionEndpoints<'_, P> {
    fn drop(&mut self) {
        let fault = if thread::panicking() {
            Some(RelayError::RuntimeStream("relay thread panicked".into()))
        } else {
            self.fault.take()
        };
        self.session
            .teardown(self.capture.take(), self.render.take(), fault);
    }
}
