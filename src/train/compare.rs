//! Stock output comparators for [`crate::train::test`].

/// Rounds every output to the nearest integer and requires it to equal the
/// expected value. Suits networks trained on 0/1 targets.
pub fn rounded_match(actual: &[f64], expected: &[f64]) -> bool {
    actual.len() == expected.len()
        && actual.iter().zip(expected).all(|(a, e)| a.round() == *e)
}

/// True when the largest output sits at the same index as the largest
/// expected value (one-hot classification).
pub fn argmax_match(actual: &[f64], expected: &[f64]) -> bool {
    actual.len() == expected.len() && argmax(actual) == argmax(expected)
}

/// Builds a comparator accepting outputs within `tolerance` of the expected
/// values, element by element.
pub fn within_tolerance(tolerance: f64) -> impl Fn(&[f64], &[f64]) -> bool {
    move |actual, expected| {
        actual.len() == expected.len()
            && actual.iter().zip(expected).all(|(a, e)| (a - e).abs() <= tolerance)
    }
}

/// Index of the maximum element in a slice.
fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding() {
        assert!(rounded_match(&[0.51, 0.2], &[1.0, 0.0]));
        assert!(!rounded_match(&[0.49], &[1.0]));
        assert!(!rounded_match(&[1.0], &[1.0, 0.0]));
    }

    #[test]
    fn argmax_picks_the_largest() {
        assert!(argmax_match(&[0.1, 0.7, 0.2], &[0.0, 1.0, 0.0]));
        assert!(!argmax_match(&[0.8, 0.1, 0.1], &[0.0, 0.0, 1.0]));
    }

    #[test]
    fn tolerance_is_inclusive() {
        let close = within_tolerance(0.25);
        assert!(close(&[1.25, -0.5][..], &[1.0, -0.5][..]));
        assert!(!close(&[1.3][..], &[1.0][..]));
    }
}
