#[inline]
/// `Σ (actual[i] - expected[i])^2`
///
/// Unmatched tail components of the longer vector are ignored,
/// callers are expected to shape-check the vectors beforehand.
pub fn distance_squared(actual: &[f64], expected: &[f64]) -> f64 {
    actual.iter()
        .zip(expected)
        .map(|(actual, expected)| (actual - expected).powi(2))
        .sum()
}

#[inline]
/// `actual - expected`
///
/// Gradient seed of an output neuron for the squared error loss.
pub fn error_derivative(actual: f64, expected: f64) -> f64 {
    actual - expected
}

#[test]
/// Test squared distance over a known pair of vectors.
fn test_distance_squared() {
    assert_eq!(distance_squared(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    assert_eq!(distance_squared(&[1.0, 3.0], &[0.0, 1.0]), 5.0);

    assert_eq!(error_derivative(0.75, 1.0), -0.25);
}
