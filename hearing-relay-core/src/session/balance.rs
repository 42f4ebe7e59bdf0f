use std::sync::atomic::{AtomicU32, Ordering};

/// Stereo balance shared between the control thread and the relay thread.
///
/// Stored as `f32` bits in an atomic so the relay loop never takes a lock.
/// The loop reads it once per block; a write becomes audible at the next
/// block boundary.
#[derive(Debug)]
pub struct BalanceState(AtomicU32);

impl BalanceState {
    pub fn new(balance: f32) -> Self {
        Self(AtomicU32::new(balance.to_bits()))
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    /// Values outside [-1, 1] are stored as given.
    pub fn store(&self, balance: f32) {
        self.0.store(balance.to_bits(), Ordering::Release);
    }
}

impl Default for BalanceState {
    fn default() -> Self {
        Self::new(0.0)
    }
}
