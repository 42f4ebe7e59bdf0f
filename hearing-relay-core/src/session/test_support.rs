//! Scriptable in-memory platform for engine tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::audio_models::{OutputDevice, OutputDeviceKind};
use crate::models::config::StreamConfig;
use crate::models::error::RelayError;
use crate::traits::audio_platform::AudioPlatform;
use crate::traits::endpoint::{CaptureEndpoint, RenderEndpoint};

/// Poll `condition` for up to two seconds.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

pub fn headphones() -> OutputDevice {
    OutputDevice {
        id: "wired-0".into(),
        name: "Wired Headphones".into(),
        kind: OutputDeviceKind::WiredHeadphones,
        is_default: true,
    }
}

pub fn speaker() -> OutputDevice {
    OutputDevice {
        id: "speaker-0".into(),
        name: "Speaker".into(),
        kind: OutputDeviceKind::BuiltInSpeaker,
        is_default: true,
    }
}

#[derive(Debug, Default)]
pub struct Counters {
    pub capture_opened: AtomicUsize,
    pub capture_started: AtomicUsize,
    pub capture_stopped: AtomicUsize,
    pub capture_released: AtomicUsize,
    pub render_opened: AtomicUsize,
    pub render_started: AtomicUsize,
    pub render_stopped: AtomicUsize,
    pub render_flushed: AtomicUsize,
    pub render_released: AtomicUsize,
    pub blocks_written: AtomicUsize,
    pub last_block: Mutex<Vec<i16>>,
    /// Low-latency flag of the most recent burst query.
    pub burst_query: Mutex<Option<bool>>,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
struct Script {
    devices: Vec<OutputDevice>,
    fail_enumeration: bool,
    sample_rate: Option<u32>,
    burst_frames: Option<u32>,
    min_capture_bytes: Option<u32>,
    fail_capture_open: bool,
    fail_render_open: bool,
    fail_render_start: bool,
    empty_reads: usize,
    fail_read_after: Option<usize>,
    fail_write_after: Option<usize>,
    panic_on_read: bool,
    samples: Vec<i16>,
}

pub struct MockPlatform {
    script: Mutex<Script>,
    pub counters: Arc<Counters>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                devices: vec![headphones()],
                fail_enumeration: false,
                sample_rate: Some(48000),
                burst_frames: Some(4),
                min_capture_bytes: Some(0),
                fail_capture_open: false,
                fail_render_open: false,
                fail_render_start: false,
                empty_reads: 0,
                fail_read_after: None,
                fail_write_after: None,
                panic_on_read: false,
                samples: vec![100, -200, 50, -5000],
            }),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn set_devices(&self, devices: Vec<OutputDevice>) {
        self.script.lock().devices = devices;
    }

    pub fn fail_enumeration(&self, fail: bool) {
        self.script.lock().fail_enumeration = fail;
    }

    pub fn set_native(&self, rate: Option<u32>, burst: Option<u32>, min_capture_bytes: Option<u32>) {
        let mut script = self.script.lock();
        script.sample_rate = rate;
        script.burst_frames = burst;
        script.min_capture_bytes = min_capture_bytes;
    }

    pub fn fail_capture_open(&self, fail: bool) {
        self.script.lock().fail_capture_open = fail;
    }

    pub fn fail_render_open(&self, fail: bool) {
        self.script.lock().fail_render_open = fail;
    }

    pub fn fail_render_start(&self, fail: bool) {
        self.script.lock().fail_render_start = fail;
    }

    /// The first `count` reads of each session return no data.
    pub fn set_empty_reads(&self, count: usize) {
        self.script.lock().empty_reads = count;
    }

    /// Reads after the first `count` of each session fail.
    pub fn fail_read_after(&self, count: Option<usize>) {
        self.script.lock().fail_read_after = count;
    }

    /// Writes after the first `count` of each session fail.
    pub fn fail_write_after(&self, count: Option<usize>) {
        self.script.lock().fail_write_after = count;
    }

    pub fn panic_on_read(&self, panic: bool) {
        self.script.lock().panic_on_read = panic;
    }

    /// Captured block, repeated to fill each read.
    pub fn set_samples(&self, samples: Vec<i16>) {
        self.script.lock().samples = samples;
    }
}

impl AudioPlatform for MockPlatform {
    fn output_devices(&self) -> Result<Vec<OutputDevice>, RelayError> {
        let script = self.script.lock();
        if script.fail_enumeration {
            return Err(RelayError::Enumeration("mock enumeration failure".into()));
        }
        Ok(script.devices.clone())
    }

    fn preferred_sample_rate(&self) -> Option<u32> {
        self.script.lock().sample_rate
    }

    fn preferred_burst_frames(&self, low_latency: bool) -> Option<u32> {
        *self.counters.burst_query.lock() = Some(low_latency);
        self.script.lock().burst_frames
    }

    fn min_capture_buffer_bytes(&self, _sample_rate: u32) -> Option<u32> {
        self.script.lock().min_capture_bytes
    }

    fn open_capture(&self, _config: &StreamConfig) -> Result<Box<dyn CaptureEndpoint>, RelayError> {
        let script = self.script.lock().clone();
        if script.fail_capture_open {
            return Err(RelayError::StreamSetup("mock capture open failure".into()));
        }
        self.counters.capture_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockCapture {
            script,
            reads: 0,
            counters: Arc::clone(&self.counters),
        }))
    }

    fn open_render(&self, _config: &StreamConfig) -> Result<Box<dyn RenderEndpoint>, RelayError> {
        let script = self.script.lock().clone();
        if script.fail_render_open {
            return Err(RelayError::StreamSetup("mock render open failure".into()));
        }
        self.counters.render_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockRender {
            fail_start: script.fail_render_start,
            fail_write_after: script.fail_write_after,
            writes: 0,
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct MockCapture {
    script: Script,
    reads: usize,
    counters: Arc<Counters>,
}

impl CaptureEndpoint for MockCapture {
    fn start(&mut self) -> Result<(), RelayError> {
        self.counters.capture_started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn read(&mut self, buffer: &mut [i16]) -> Result<usize, RelayError> {
        thread::sleep(Duration::from_millis(1));
        self.reads += 1;

        if self.script.panic_on_read {
            panic!("mock capture panicked");
        }
        if let Some(limit) = self.script.fail_read_after {
            if self.reads > limit {
                return Err(RelayError::RuntimeStream("mock read failure".into()));
            }
        }
        if self.reads <= self.script.empty_reads || self.script.samples.is_empty() {
            return Ok(0);
        }

        for (slot, &sample) in buffer.iter_mut().zip(self.script.samples.iter().cycle()) {
            *slot = sample;
        }
        Ok(buffer.len())
    }

    fn stop(&mut self) -> Result<(), RelayError> {
        self.counters.capture_stopped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MockCapture {
    fn drop(&mut self) {
        self.counters.capture_released.fetch_add(1, Ordering::SeqCst);
    }
}

struct MockRender {
    fail_start: bool,
    fail_write_after: Option<usize>,
    writes: usize,
    counters: Arc<Counters>,
}

impl RenderEndpoint for MockRender {
    fn start(&mut self) -> Result<(), RelayError> {
        if self.fail_start {
            return Err(RelayError::StreamSetup("mock render start failure".into()));
        }
        self.counters.render_started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn write(&mut self, samples: &[i16]) -> Result<(), RelayError> {
        self.writes += 1;
        if let Some(limit) = self.fail_write_after {
            if self.writes > limit {
                return Err(RelayError::RuntimeStream("mock write failure".into()));
            }
        }
        *self.counters.last_block.lock() = samples.to_vec();
        self.counters.blocks_written.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RelayError> {
        self.counters.render_stopped.fetch_add(1, Ordering::SeqCst);
        // Stop failures must not prevent flush or release.
        Err(RelayError::RuntimeStream("mock render stop failure".into()))
    }

    fn flush(&mut self) -> Result<(), RelayError> {
        self.counters.render_flushed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MockRender {
    fn drop(&mut self) {
        self.counters.render_released.fetch_add(1, Ordering::SeqCst);
    }
}
