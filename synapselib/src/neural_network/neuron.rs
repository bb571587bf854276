use super::prelude::*;

#[derive(Default, Debug, Clone, Copy, PartialEq)]
/// Entry point of a network.
///
/// Holds a single externally assigned value instead of weights.
/// The value is cleared on every reset and must be assigned again
/// before the next forward sweep.
pub struct InputNeuron {
    value: Option<f64>
}

impl InputNeuron {
    #[inline]
    /// Create new input neuron with no assigned value.
    pub fn new() -> Self {
        Self {
            value: None
        }
    }

    #[inline]
    /// Assign the value returned by this neuron during the current sweep.
    pub fn set_value(&mut self, value: f64) {
        self.value = Some(value);
    }

    #[inline]
    /// Value assigned since the last reset, if any.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    #[inline]
    /// Clear the assigned value.
    pub fn reset(&mut self) {
        self.value = None;
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Weighted neuron used in hidden and output layers.
///
/// Holds one live weight per predecessor-layer neuron plus a live bias,
/// a staged copy of both, and two memoization slots which are only valid
/// within a single forward or backward sweep. The live values are read
/// by both sweeps; gradient descent writes only the staged copy, which
/// replaces the live values at `commit`. This keeps an entire epoch of
/// backward sweeps running against one frozen weight snapshot.
pub struct WeightedNeuron {
    weights: Vec<f64>,
    bias: f64,

    staged_weights: Vec<f64>,
    staged_bias: f64,

    activation: Option<f64>,
    gradient: Option<f64>
}

impl WeightedNeuron {
    /// Create new neuron with the given amount of inputs and
    /// weights and bias uniformly drawn from `[-1, 1]`.
    pub fn random(input_size: usize, rng: &mut fastrand::Rng) -> Self {
        let weights = (0..input_size)
            .map(|_| rng.f64() * 2.0 - 1.0)
            .collect::<Vec<_>>();

        let bias = rng.f64() * 2.0 - 1.0;

        Self::from_parts(weights, bias)
    }

    /// Create new neuron from explicit weights and bias.
    ///
    /// The staged copy starts equal to the live values.
    pub fn from_parts(weights: Vec<f64>, bias: f64) -> Self {
        Self {
            staged_weights: weights.clone(),
            staged_bias: bias,

            weights,
            bias,

            activation: None,
            gradient: None
        }
    }

    #[inline]
    /// Live weights of the neuron's inputs.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    /// Live bias of the neuron.
    pub fn bias(&self) -> f64 {
        self.bias
    }

    #[inline]
    /// Live weight connecting the predecessor-layer neuron at the given
    /// position to this neuron.
    pub fn weight(&self, input: usize) -> f64 {
        self.weights[input]
    }

    #[inline]
    /// Staged weights awaiting the next commit.
    pub fn staged_weights(&self) -> &[f64] {
        &self.staged_weights
    }

    #[inline]
    /// Staged bias awaiting the next commit.
    pub fn staged_bias(&self) -> f64 {
        self.staged_bias
    }

    #[inline]
    /// Activation memoized during the current forward sweep, if any.
    pub fn activation(&self) -> Option<f64> {
        self.activation
    }

    #[inline]
    /// Gradient memoized during the current backward sweep, if any.
    pub fn gradient(&self) -> Option<f64> {
        self.gradient
    }

    /// Calculate activated output of the neuron for the given
    /// predecessor-layer activations and memoize it.
    ///
    /// Repeated calls within one sweep return the memoized value without
    /// recomputing, so shared successors cost one evaluation per sweep.
    pub fn fire(&mut self, inputs: &[f64]) -> f64 {
        if let Some(activation) = self.activation {
            return activation;
        }

        let weighted_sum = self.weights.iter()
            .zip(inputs)
            .map(|(weight, input)| weight * input)
            .sum::<f64>();

        let activation = sigmoid(weighted_sum + self.bias);

        self.activation = Some(activation);

        activation
    }

    /// Calculate the error gradient of the neuron, memoize it and stage
    /// the gradient descent update of its own weights and bias.
    ///
    /// `error` is the derivative of the total error with respect to this
    /// neuron's activation: for an output neuron the seed `actual - desired`,
    /// for a hidden neuron the sum of consumer gradients weighted by the
    /// consumers' connection weights. The memoized value folds the squash
    /// derivative in, and the staged update uses the exact gradient
    /// computed here, so repeated calls within one sweep can neither
    /// recompute nor double-stage.
    pub fn back_propagate(&mut self, error: f64, inputs: &[f64], step_size: f64) -> f64 {
        if let Some(gradient) = self.gradient {
            return gradient;
        }

        let activation = self.fire(inputs);
        let gradient = error * sigmoid_derivative(activation);

        for (staged, input) in self.staged_weights.iter_mut().zip(inputs) {
            *staged -= step_size * gradient * input;
        }

        self.staged_bias -= step_size * gradient;

        self.gradient = Some(gradient);

        gradient
    }

    /// Replace the live weights and bias with the staged ones.
    pub fn commit(&mut self) {
        self.weights.copy_from_slice(&self.staged_weights);
        self.bias = self.staged_bias;
    }

    /// Replace the staged weights and bias with the live ones,
    /// dropping any staged but uncommitted updates.
    pub fn discard(&mut self) {
        self.staged_weights.copy_from_slice(&self.weights);
        self.staged_bias = self.bias;
    }

    #[inline]
    /// Clear both memoization slots and prepare the neuron for
    /// the next forward and backward sweeps.
    pub fn reset(&mut self) {
        self.activation = None;
        self.gradient = None;
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A node of the computation graph.
///
/// Closed set of neuron kinds: input neurons return an externally
/// assigned value, hidden and output neurons squash a weighted sum of
/// the previous layer. Output neurons differ from hidden ones only in
/// how their backward sweep is seeded, which the network drives.
pub enum Neuron {
    Input(InputNeuron),
    Hidden(WeightedNeuron),
    Output(WeightedNeuron)
}

impl Neuron {
    #[inline]
    /// Activation of the neuron within the current forward sweep:
    /// the assigned value for an input neuron, the memoized activation
    /// for a weighted one.
    pub fn activation(&self) -> Option<f64> {
        match self {
            Self::Input(neuron) => neuron.value(),
            Self::Hidden(neuron) | Self::Output(neuron) => neuron.activation()
        }
    }

    #[inline]
    /// Gradient memoized within the current backward sweep.
    /// Input neurons never carry one.
    pub fn gradient(&self) -> Option<f64> {
        match self {
            Self::Input(_) => None,
            Self::Hidden(neuron) | Self::Output(neuron) => neuron.gradient()
        }
    }

    #[inline]
    /// Weighted form of the neuron, if it is not an input.
    pub fn as_weighted(&self) -> Option<&WeightedNeuron> {
        match self {
            Self::Input(_) => None,
            Self::Hidden(neuron) | Self::Output(neuron) => Some(neuron)
        }
    }

    #[inline]
    /// Mutable weighted form of the neuron, if it is not an input.
    pub fn as_weighted_mut(&mut self) -> Option<&mut WeightedNeuron> {
        match self {
            Self::Input(_) => None,
            Self::Hidden(neuron) | Self::Output(neuron) => Some(neuron)
        }
    }

    /// Prepare the neuron for the next sweeps.
    pub fn reset(&mut self) {
        match self {
            Self::Input(neuron) => neuron.reset(),
            Self::Hidden(neuron) | Self::Output(neuron) => neuron.reset()
        }
    }
}

#[test]
/// Test input neuron value assignment and reset.
fn test_input_neuron() {
    let mut neuron = InputNeuron::new();

    assert_eq!(neuron.value(), None);

    neuron.set_value(0.7);

    assert_eq!(neuron.value(), Some(0.7));

    neuron.reset();

    assert_eq!(neuron.value(), None);
}

#[test]
/// Test that a fired neuron returns its memoized activation
/// until it is reset.
fn test_neuron_fire_memoization() {
    let mut neuron = WeightedNeuron::from_parts(vec![0.5], 0.25);

    let first = neuron.fire(&[1.0]);

    assert!((first - sigmoid(0.75)).abs() < 1e-12);

    // Different inputs must not trigger a recomputation within one sweep.
    assert_eq!(neuron.fire(&[100.0]), first);

    neuron.reset();

    let second = neuron.fire(&[0.0]);

    assert!((second - sigmoid(0.25)).abs() < 1e-12);
    assert_ne!(first, second);
}

#[test]
/// Test gradient math and weight staging of a single neuron
/// against hand-computed values.
fn test_neuron_back_propagation_staging() {
    let mut neuron = WeightedNeuron::from_parts(vec![0.5], 0.0);

    let inputs = [1.0];

    let activation = neuron.fire(&inputs);
    let error = error_derivative(activation, 0.0);

    let gradient = neuron.back_propagate(error, &inputs, 0.1);

    assert!((gradient - error * activation * (1.0 - activation)).abs() < 1e-12);

    // Staged values moved, live values stayed frozen.
    assert!((neuron.staged_weights()[0] - (0.5 - 0.1 * gradient)).abs() < 1e-12);
    assert!((neuron.staged_bias() - (-0.1 * gradient)).abs() < 1e-12);

    assert_eq!(neuron.weights(), &[0.5]);
    assert_eq!(neuron.bias(), 0.0);

    // A second call within the same sweep returns the memoized gradient
    // and must not stage the update twice.
    let staged = neuron.staged_weights()[0];

    assert_eq!(neuron.back_propagate(123.0, &inputs, 0.1), gradient);
    assert_eq!(neuron.staged_weights()[0], staged);

    neuron.commit();

    assert_eq!(neuron.weights()[0], staged);
    assert_eq!(neuron.bias(), neuron.staged_bias());
}

#[test]
/// Test that staged updates accumulate across sweeps and that
/// discard rolls them back to the live values.
fn test_neuron_staging_accumulation() {
    let mut neuron = WeightedNeuron::from_parts(vec![0.5], 0.1);

    neuron.fire(&[1.0]);
    neuron.back_propagate(0.3, &[1.0], 0.1);

    let after_first = neuron.staged_weights()[0];

    neuron.reset();

    neuron.fire(&[0.5]);
    neuron.back_propagate(-0.2, &[0.5], 0.1);

    // Second sweep kept decrementing the same staged buffer.
    assert_ne!(neuron.staged_weights()[0], after_first);
    assert_eq!(neuron.weights(), &[0.5]);

    neuron.discard();

    assert_eq!(neuron.staged_weights(), &[0.5]);
    assert_eq!(neuron.staged_bias(), 0.1);
}
