use rand::Rng;

/// Fill `values` with samples drawn uniformly from [0, 1).
pub fn uniform_fill<R: Rng + ?Sized>(values: &mut [f32], rng: &mut R) {
    for v in values.iter_mut() {
        *v = rng.random::<f32>();
    }
}

/// Distance between two floats in units in the last place.
///
/// Uses the ordered-integer mapping of IEEE-754 bit patterns, so +0.0 and -0.0
/// are zero ULPs apart. Returns `u32::MAX` if either value is NaN, unless both
/// are NaN.
pub fn ulp_distance(a: f32, b: f32) -> u32 {
    if a.is_nan() || b.is_nan() {
        return if a.is_nan() && b.is_nan() { 0 } else { u32::MAX };
    }

    let ordered = |x: f32| -> i64 {
        let bits = x.to_bits() as i32;
        if bits < 0 {
            i32::MIN as i64 - bits as i64
        } else {
            bits as i64
        }
    };

    let diff = (ordered(a) - ordered(b)).unsigned_abs();
    diff.min(u32::MAX as u64) as u32
}

/// First index where `actual` differs from `expected` by more than `max_ulps`.
pub fn first_mismatch(expected: &[f32], actual: &[f32], max_ulps: u32) -> Option<usize> {
    if expected.len() != actual.len() {
        return Some(expected.len().min(actual.len()));
    }

    expected
        .iter()
        .zip(actual)
        .position(|(&e, &a)| ulp_distance(e, a) > max_ulps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn ulp_distance_of_neighbours_is_one() {
        let x = 1.0f32;
        let next = f32::from_bits(x.to_bits() + 1);
        assert_eq!(ulp_distance(x, next), 1);
        assert_eq!(ulp_distance(next, x), 1);
    }

    #[test]
    fn signed_zeros_are_equal() {
        assert_eq!(ulp_distance(0.0, -0.0), 0);
    }

    #[test]
    fn nan_handling() {
        assert_eq!(ulp_distance(f32::NAN, f32::NAN), 0);
        assert_eq!(ulp_distance(f32::NAN, 1.0), u32::MAX);
    }

    #[test]
    fn uniform_fill_stays_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut values = vec![-1.0f32; 4096];
        uniform_fill(&mut values, &mut rng);
        assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn first_mismatch_reports_index() {
        let expected = [1.0f32, 2.0, 3.0];
        let actual = [1.0f32, 2.5, 3.0];
        assert_eq!(first_mismatch(&expected, &actual, 1), Some(1));
        assert_eq!(first_mismatch(&expected, &expected, 0), None);
    }
}
