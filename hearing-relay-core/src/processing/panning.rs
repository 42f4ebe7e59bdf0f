/// Linear stereo panner for a mono source.
///
/// Balance runs from `-1.0` (full left) through `0.0` (center) to `1.0`
/// (full right). Panning only ever attenuates: the channel on the side the
/// balance points to stays at unity gain and the other fades linearly.
/// This is not an equal-power law, so center is louder than either extreme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panner {
    pub left_gain: f32,
    pub right_gain: f32,
}

impl Panner {
    pub fn new(balance: f32) -> Self {
        let left_gain = if balance > 0.0 { 1.0 - balance } else { 1.0 };
        let right_gain = if balance < 0.0 { 1.0 + balance } else { 1.0 };
        Self { left_gain, right_gain }
    }

    /// Interleave `mono` into `stereo` as `[L0, R0, L1, R1, ...]`.
    ///
    /// Writes `2 × mono.len()` samples and returns that count. Samples are
    /// rounded half away from zero. For balance in [-1, 1] the gains are
    /// in [0, 1] and cannot overflow; outside that range the cast saturates.
    ///
    /// # Panics
    /// If `stereo` is shorter than `2 × mono.len()`.
    pub fn process_into(&self, mono: &[i16], stereo: &mut [i16]) -> usize {
        let needed = mono.len() * 2;
        for (frame, &sample) in stereo[..needed].chunks_exact_mut(2).zip(mono) {
            let s = sample as f32;
            frame[0] = (s * self.left_gain).round() as i16;
            frame[1] = (s * self.right_gain).round() as i16;
        }
        needed
    }

    pub fn process(&self, mono: &[i16]) -> Vec<i16> {
        let mut stereo = vec![0i16; mono.len() * 2];
        self.process_into(mono, &mut stereo);
        stereo
    }
}

/// Pan a whole block at one balance value.
pub fn pan(mono: &[i16], balance: f32) -> Vec<i16> {
    Panner::new(balance).process(mono)
}
