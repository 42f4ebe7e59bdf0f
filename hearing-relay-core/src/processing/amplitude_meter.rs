/// Highest level the meter reports.
pub const MAX_LEVEL: u8 = 100;

/// Coarse loudness of a mono block for visualization.
///
/// `min(100, peak / 100)` where `peak` is the largest absolute sample. Linear
/// and unsmoothed, so anything above a peak of 10 000 reads as full scale.
pub fn level(mono: &[i16]) -> u8 {
    let peak = mono
        .iter()
        .map(|&s| (s as i32).unsigned_abs())
        .max()
        .unwrap_or(0);
    (peak / 100).min(MAX_LEVEL as u32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_is_zero() {
        assert_eq!(level(&[0; 256]), 0);
    }

    #[test]
    fn empty_block_is_zero() {
        assert_eq!(level(&[]), 0);
    }

    #[test]
    fn quiet_peak_floors_to_zero() {
        assert_eq!(level(&[10, -50, 20]), 0);
    }

    #[test]
    fn full_scale_is_clamped() {
        assert_eq!(level(&[10000]), 100);
        assert_eq!(level(&[i16::MAX]), 100);
        assert_eq!(level(&[i16::MIN]), 100);
    }

    #[test]
    fn negative_peak_counts() {
        assert_eq!(level(&[100, -4321, 2000]), 43);
    }
}
