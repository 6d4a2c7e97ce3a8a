/// Probability above which the positive class is predicted.
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Maps a sigmoid output to a class label: 1 iff `probability > 0.5`.
///
/// The comparison is strict, so exactly 0.5 (and NaN) yields 0.
pub fn classify(probability: f32) -> u8 {
    if probability > DECISION_THRESHOLD {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_exclusive() {
        assert_eq!(classify(0.5), 0);
    }

    #[test]
    fn values_either_side_of_boundary() {
        for &eps in &[f32::EPSILON, 1e-4, 0.1, 0.5] {
            assert_eq!(classify(0.5 + eps), 1, "eps={eps}");
            assert_eq!(classify(0.5 - eps), 0, "eps={eps}");
        }
    }

    #[test]
    fn extremes_and_nan() {
        assert_eq!(classify(0.0), 0);
        assert_eq!(classify(1.0), 1);
        assert_eq!(classify(f32::NAN), 0);
    }
}
