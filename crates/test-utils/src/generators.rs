//! Deterministic sample generators.

/// Raw 8-bit gate samples for one radial.
///
/// Each sample is `(azimuth_number * 7 + gate * 5) % 250 + 2`, which keeps
/// every value inside `2..=251` (never the reserved 0 below-threshold or
/// 1 range-folded codes) and makes any misplaced radial or gate visible.
pub fn raw_samples(azimuth_number: u16, gates: usize) -> Vec<u8> {
    (0..gates)
        .map(|gate| ((usize::from(azimuth_number) * 7 + gate * 5) % 250 + 2) as u8)
        .collect()
}

/// Physical value a decoder should produce for a gate generated by
/// [`raw_samples`] with the given scale/offset.
pub fn expected_value(azimuth_number: u16, gate: usize, scale: f32, offset: f32) -> f32 {
    let raw = ((usize::from(azimuth_number) * 7 + gate * 5) % 250 + 2) as f32;
    (raw - offset) / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_avoid_reserved_values() {
        for az in 1..=720u16 {
            for sample in raw_samples(az, 64) {
                assert!(sample >= 2);
            }
        }
    }

    #[test]
    fn expected_value_matches_samples() {
        let raw = raw_samples(5, 8);
        let value = expected_value(5, 3, 2.0, 66.0);
        assert_eq!(value, (f32::from(raw[3]) - 66.0) / 2.0);
    }
}
