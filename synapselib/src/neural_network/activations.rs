#[inline]
/// `1 / (1 + e^(-x))`
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[inline]
/// Derivative of the sigmoid expressed through its own output value.
///
/// The backward pass keeps activations memoized, so the derivative
/// is cheaper to compute from the activation than from the argument.
pub fn sigmoid_derivative(activation: f64) -> f64 {
    activation * (1.0 - activation)
}

#[test]
/// Test sigmoid bounds and symmetry around 0.5.
fn test_sigmoid() {
    assert_eq!(sigmoid(0.0), 0.5);

    assert!(sigmoid(10.0) > 0.99);
    assert!(sigmoid(-10.0) < 0.01);

    assert!((sigmoid(1.3) + sigmoid(-1.3) - 1.0).abs() < 1e-12);

    assert!((sigmoid_derivative(0.5) - 0.25).abs() < 1e-12);
}
