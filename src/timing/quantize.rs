//! Duration quantizer

/// Round a performed duration to its canonical length
///
/// `ceil(d^(1/r))^r`, rounded half-to-even. With `roughness = 1.0` this is `ceil(d)`;
/// larger roughness values collapse nearby durations into coarser buckets.
pub fn quantize(duration_ms: f64, roughness: f64) -> u32 {
    if duration_ms.is_nan() || duration_ms <= 0.0 {
        return 0;
    }
    let rough_pow = duration_ms.powf(1.0 / roughness);
    let rough_round = rough_pow.ceil();
    let result = rough_round.powf(roughness).round_ties_even();
    if result >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        result as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roughness_one_is_ceil() {
        assert_eq!(quantize(500.0, 1.0), 500);
        assert_eq!(quantize(499.2, 1.0), 500);
        assert_eq!(quantize(500.0001, 1.0), 501);
        assert_eq!(quantize(0.3, 1.0), 1);
    }

    #[test]
    fn test_degenerate_input() {
        assert_eq!(quantize(0.0, 1.0), 0);
        assert_eq!(quantize(-5.0, 1.0), 0);
        assert_eq!(quantize(f64::NAN, 1.0), 0);
    }

    #[test]
    fn test_idempotent() {
        for raw in [0.0, 0.5, 1.0, 12.25, 333.3333, 500.0, 750.5, 12345.678] {
            let once = quantize(raw, 1.0);
            assert_eq!(quantize(f64::from(once), 1.0), once);
        }
    }

    #[test]
    fn test_coarser_roughness_merges_durations() {
        // square-root buckets: 480 and 484 share 22^2, 500 moves up to 23^2
        assert_eq!(quantize(480.0, 2.0), 484);
        assert_eq!(quantize(484.0, 2.0), 484);
        assert_eq!(quantize(500.0, 2.0), 529);
    }
}
