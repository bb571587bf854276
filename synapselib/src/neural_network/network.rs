use super::prelude::*;

#[derive(Debug, Clone, PartialEq)]
/// Feed-forward network of neurons grouped into ordered layers.
///
/// Layer 0 holds input neurons, the last layer holds output neurons,
/// everything in between is hidden. Adjacent layers are fully connected:
/// every weighted neuron reads the whole previous layer, so the graph's
/// cross-links are implicit in the layer indices and a neuron is
/// addressed by its (layer, position) pair. The network is built once
/// and afterwards only reset between sweeps and weight-updated by a
/// trainer, never rebuilt.
///
/// ```
/// use synapselib::prelude::*;
///
/// let mut rng = fastrand::Rng::with_seed(42);
/// let mut network = Network::random(&[2, 3, 1], &mut rng).unwrap();
///
/// network.reset();
///
/// let outputs = network.compute(&[0.5, -0.5]).unwrap();
///
/// assert_eq!(outputs.len(), 1);
/// assert!(outputs[0] > 0.0 && outputs[0] < 1.0);
/// ```
pub struct Network {
    layers: Vec<Vec<Neuron>>
}

impl Network {
    /// Create new network from a layer-size sequence, with weights and
    /// biases uniformly drawn from `[-1, 1]`.
    ///
    /// The sequence needs at least an input and an output layer and
    /// every layer needs at least one neuron.
    pub fn random(layer_sizes: &[usize], rng: &mut fastrand::Rng) -> Result<Self, NetworkError> {
        if layer_sizes.len() < 2 {
            return Err(NetworkError::MissingLayers);
        }

        let weighted_layers = layer_sizes.windows(2)
            .map(|sizes| {
                (0..sizes[1])
                    .map(|_| WeightedNeuron::random(sizes[0], rng))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        Self::from_layers(layer_sizes[0], weighted_layers)
    }

    /// Create new network from explicit weighted layers: every hidden
    /// layer followed by the output layer, input layer given by its size.
    ///
    /// Every neuron must carry exactly one weight per neuron of the
    /// previous layer.
    pub fn from_layers(
        input_size: usize,
        weighted_layers: Vec<Vec<WeightedNeuron>>
    ) -> Result<Self, NetworkError> {
        if weighted_layers.is_empty() {
            return Err(NetworkError::MissingLayers);
        }

        if input_size == 0 {
            return Err(NetworkError::EmptyLayer { layer: 0 });
        }

        let last = weighted_layers.len() - 1;

        let mut layers = Vec::with_capacity(weighted_layers.len() + 1);

        layers.push(vec![Neuron::Input(InputNeuron::new()); input_size]);

        for (index, weighted_layer) in weighted_layers.into_iter().enumerate() {
            if weighted_layer.is_empty() {
                return Err(NetworkError::EmptyLayer { layer: index + 1 });
            }

            let expected = layers[index].len();

            for neuron in &weighted_layer {
                if neuron.weights().len() != expected {
                    return Err(NetworkError::ShapeMismatch {
                        expected,
                        got: neuron.weights().len()
                    });
                }
            }

            let layer = weighted_layer.into_iter()
                .map(|neuron| {
                    if index == last {
                        Neuron::Output(neuron)
                    } else {
                        Neuron::Hidden(neuron)
                    }
                })
                .collect();

            layers.push(layer);
        }

        Ok(Self {
            layers
        })
    }

    #[inline]
    /// Sizes of the network's layers, input layer first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        self.layers.iter()
            .map(|layer| layer.len())
            .collect()
    }

    #[inline]
    /// Amount of input neurons.
    pub fn input_size(&self) -> usize {
        self.layers[0].len()
    }

    #[inline]
    /// Amount of output neurons.
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].len()
    }

    #[inline]
    /// Neurons of the given layer.
    pub fn neurons(&self, layer: usize) -> &[Neuron] {
        &self.layers[layer]
    }

    /// Clear every neuron's memoization state and input values,
    /// preparing the network for the next forward and backward sweeps.
    ///
    /// Weights, both live and staged, are untouched.
    pub fn reset(&mut self) {
        for layer in &mut self.layers {
            for neuron in layer {
                neuron.reset();
            }
        }
    }

    /// Assign the given values to the input layer and calculate the
    /// activations of the output layer.
    ///
    /// Activations computed since the last reset are memoized, so within
    /// one sweep every neuron evaluates once no matter how many neurons
    /// consume it, and a repeated call returns the same outputs without
    /// recomputing anything.
    pub fn compute(&mut self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if inputs.len() != self.input_size() {
            return Err(NetworkError::ShapeMismatch {
                expected: self.input_size(),
                got: inputs.len()
            });
        }

        for (neuron, value) in self.layers[0].iter_mut().zip(inputs) {
            if let Neuron::Input(input) = neuron {
                input.set_value(*value);
            }
        }

        let last = self.layers.len() - 1;

        self.layer_activations(last)
    }

    /// Back propagate the error gradients for the given desired output
    /// values, staging every neuron's weight update along the way.
    ///
    /// Forward and backward sweeps both read the live weights, which stay
    /// frozen until `commit_weights`; only the staged copies move here.
    pub fn back_propagate(&mut self, desired: &[f64], step_size: f64) -> Result<(), NetworkError> {
        let last = self.layers.len() - 1;

        if desired.len() != self.layers[last].len() {
            return Err(NetworkError::ShapeMismatch {
                expected: self.layers[last].len(),
                got: desired.len()
            });
        }

        // Seed the output layer. Its error derivative comes from the
        // desired values rather than from downstream consumers.
        let inputs = self.layer_activations(last - 1)?;

        for (index, desired) in desired.iter().enumerate() {
            let Some(neuron) = self.layers[last][index].as_weighted_mut() else {
                unreachable!("the output layer holds weighted neurons only");
            };

            let activation = neuron.fire(&inputs);
            let error = error_derivative(activation, *desired);

            neuron.back_propagate(error, &inputs, step_size);
        }

        // Hidden sweep. Memoization makes the order irrelevant, but
        // walking the layers backwards keeps the recursion one step deep.
        for layer in (1..last).rev() {
            for index in 0..self.layers[layer].len() {
                self.back_propagate_neuron(layer, index, step_size)?;
            }
        }

        Ok(())
    }

    /// Replace every neuron's live weights with its staged ones.
    ///
    /// Called once per epoch by the trainer, after all samples of the
    /// epoch were back propagated against the old live weights.
    pub fn commit_weights(&mut self) {
        for layer in &mut self.layers {
            for neuron in layer {
                if let Some(neuron) = neuron.as_weighted_mut() {
                    neuron.commit();
                }
            }
        }
    }

    /// Replace every neuron's staged weights with its live ones,
    /// dropping staged but uncommitted updates.
    pub fn discard_staged(&mut self) {
        for layer in &mut self.layers {
            for neuron in layer {
                if let Some(neuron) = neuron.as_weighted_mut() {
                    neuron.discard();
                }
            }
        }
    }

    /// Activation of the neuron at the given position, memoized within
    /// the current sweep.
    fn fire(&mut self, layer: usize, index: usize) -> Result<f64, NetworkError> {
        match &self.layers[layer][index] {
            Neuron::Input(neuron) => {
                return neuron.value().ok_or(NetworkError::UnsetInput { index });
            }

            Neuron::Hidden(neuron) | Neuron::Output(neuron) => {
                if let Some(activation) = neuron.activation() {
                    return Ok(activation);
                }
            }
        }

        let inputs = self.layer_activations(layer - 1)?;

        match &mut self.layers[layer][index] {
            Neuron::Hidden(neuron) | Neuron::Output(neuron) => Ok(neuron.fire(&inputs)),

            Neuron::Input(_) => unreachable!("input neurons fire from their assigned value")
        }
    }

    /// Activations of a whole layer in neuron order.
    fn layer_activations(&mut self, layer: usize) -> Result<Vec<f64>, NetworkError> {
        (0..self.layers[layer].len())
            .map(|index| self.fire(layer, index))
            .collect()
    }

    /// Gradient of a hidden neuron, memoized within the current sweep,
    /// accumulated from every consumer in the next layer against the
    /// frozen live weights.
    fn back_propagate_neuron(
        &mut self,
        layer: usize,
        index: usize,
        step_size: f64
    ) -> Result<f64, NetworkError> {
        if let Some(gradient) = self.layers[layer][index].gradient() {
            return Ok(gradient);
        }

        let mut error = 0.0;

        for consumer in 0..self.layers[layer + 1].len() {
            let gradient = self.back_propagate_neuron(layer + 1, consumer, step_size)?;

            // The weight the consumer assigned to this neuron sits at this
            // neuron's own position within its layer.
            let weight = self.layers[layer + 1][consumer].as_weighted()
                .map(|neuron| neuron.weight(index))
                .expect("layers past the input one hold weighted neurons only");

            error += gradient * weight;
        }

        let inputs = self.layer_activations(layer - 1)?;

        match &mut self.layers[layer][index] {
            Neuron::Hidden(neuron) => Ok(neuron.back_propagate(error, &inputs, step_size)),

            // Output neurons are seeded before the hidden sweep starts and
            // input neurons are never propagated.
            _ => unreachable!("only hidden neurons are propagated without a seed")
        }
    }
}

#[cfg(test)]
/// 1-1-2 network with fixed weights: one input, one shared hidden
/// neuron, two output neurons reading it.
fn diamond_network() -> Network {
    Network::from_layers(1, vec![
        vec![WeightedNeuron::from_parts(vec![0.8], -0.2)],
        vec![
            WeightedNeuron::from_parts(vec![0.6], 0.1),
            WeightedNeuron::from_parts(vec![-0.4], 0.3)
        ]
    ]).unwrap()
}

#[test]
/// Test layer-size construction and its contract violations.
fn test_network_construction() {
    let mut rng = fastrand::Rng::with_seed(1);

    let network = Network::random(&[2, 3, 1], &mut rng).unwrap();

    assert_eq!(network.layer_sizes(), [2, 3, 1]);
    assert_eq!(network.input_size(), 2);
    assert_eq!(network.output_size(), 1);

    assert_eq!(
        Network::random(&[2], &mut rng),
        Err(NetworkError::MissingLayers)
    );

    assert_eq!(
        Network::random(&[2, 0, 1], &mut rng),
        Err(NetworkError::EmptyLayer { layer: 1 })
    );

    assert_eq!(
        Network::from_layers(2, vec![vec![WeightedNeuron::from_parts(vec![0.5], 0.0)]]),
        Err(NetworkError::ShapeMismatch { expected: 2, got: 1 })
    );
}

#[test]
/// Test that computed outputs are a pure function of the inputs
/// while the weights are fixed.
fn test_network_determinism() {
    let mut network = diamond_network();

    network.reset();
    let first = network.compute(&[0.37]).unwrap();

    network.reset();
    let second = network.compute(&[0.37]).unwrap();

    assert_eq!(first, second);
}

#[test]
/// Test forward values of the diamond network against hand-folded
/// formulas, and that memoized activations survive until a reset.
fn test_network_forward_memoization() {
    let mut network = diamond_network();

    network.reset();

    let outputs = network.compute(&[0.5]).unwrap();

    let hidden = sigmoid(0.8 * 0.5 - 0.2);

    assert!((outputs[0] - sigmoid(0.6 * hidden + 0.1)).abs() < 1e-12);
    assert!((outputs[1] - sigmoid(-0.4 * hidden + 0.3)).abs() < 1e-12);

    // Without a reset the sweep's memoized values win over new inputs.
    assert_eq!(network.compute(&[-3.0]).unwrap(), outputs);

    network.reset();

    assert_ne!(network.compute(&[-3.0]).unwrap(), outputs);
}

#[test]
/// Test gradients and staged updates of the diamond network against
/// hand-folded formulas, including the shared-ancestor accumulation.
fn test_network_backward_gradients() {
    let mut network = diamond_network();

    network.reset();
    network.compute(&[0.5]).unwrap();
    network.back_propagate(&[1.0, 0.0], 0.1).unwrap();

    let hidden = sigmoid(0.8 * 0.5 - 0.2);
    let out_1 = sigmoid(0.6 * hidden + 0.1);
    let out_2 = sigmoid(-0.4 * hidden + 0.3);

    let gradient_1 = (out_1 - 1.0) * out_1 * (1.0 - out_1);
    let gradient_2 = (out_2 - 0.0) * out_2 * (1.0 - out_2);

    // The shared hidden neuron accumulates both consumers' gradients
    // through the weights those consumers assigned to it.
    let gradient_hidden = (gradient_1 * 0.6 + gradient_2 * -0.4) * hidden * (1.0 - hidden);

    let neurons = network.neurons(1);
    let hidden_neuron = neurons[0].as_weighted().unwrap();

    assert!((hidden_neuron.gradient().unwrap() - gradient_hidden).abs() < 1e-12);
    assert!((hidden_neuron.staged_weights()[0] - (0.8 - 0.1 * gradient_hidden * 0.5)).abs() < 1e-12);
    assert!((hidden_neuron.staged_bias() - (-0.2 - 0.1 * gradient_hidden)).abs() < 1e-12);

    let output_neuron = network.neurons(2)[0].as_weighted().unwrap();

    assert!((output_neuron.gradient().unwrap() - gradient_1).abs() < 1e-12);
    assert!((output_neuron.staged_weights()[0] - (0.6 - 0.1 * gradient_1 * hidden)).abs() < 1e-12);
}

#[test]
/// Test that backward sweeps leave the live weights frozen until
/// the staged updates are committed.
fn test_network_frozen_weights_until_commit() {
    let mut network = diamond_network();

    let snapshot = network.clone();

    for sample in [[0.1], [0.9]] {
        network.reset();
        network.compute(&sample).unwrap();
        network.back_propagate(&[0.0, 1.0], 0.1).unwrap();
    }

    // Two staged sweeps later every live weight still matches the snapshot.
    for layer in 1..3 {
        for (neuron, original) in network.neurons(layer).iter().zip(snapshot.neurons(layer)) {
            let neuron = neuron.as_weighted().unwrap();
            let original = original.as_weighted().unwrap();

            assert_eq!(neuron.weights(), original.weights());
            assert_eq!(neuron.bias(), original.bias());

            assert_ne!(neuron.staged_weights(), original.staged_weights());
        }
    }

    network.commit_weights();

    let committed = network.neurons(1)[0].as_weighted().unwrap();
    let original = snapshot.neurons(1)[0].as_weighted().unwrap();

    assert_ne!(committed.weights(), original.weights());
    assert_eq!(committed.weights(), committed.staged_weights());
}

#[test]
/// Test input and desired vector shape validation.
fn test_network_shape_mismatch() {
    let mut rng = fastrand::Rng::with_seed(2);
    let mut network = Network::random(&[2, 2, 1], &mut rng).unwrap();

    network.reset();

    assert_eq!(
        network.compute(&[0.0, 0.0, 0.0]),
        Err(NetworkError::ShapeMismatch { expected: 2, got: 3 })
    );

    network.compute(&[0.0, 0.0]).unwrap();

    assert_eq!(
        network.back_propagate(&[1.0, 1.0], 0.1),
        Err(NetworkError::ShapeMismatch { expected: 1, got: 2 })
    );
}

#[test]
/// Test that firing an input neuron with no assigned value surfaces
/// the precondition violation.
fn test_network_unset_input() {
    let mut network = diamond_network();

    network.reset();

    assert_eq!(
        network.back_propagate(&[0.5, 0.5], 0.1),
        Err(NetworkError::UnsetInput { index: 0 })
    );
}

#[test]
/// Test that resetting twice behaves exactly like resetting once.
fn test_network_idempotent_reset() {
    let mut network = diamond_network();

    network.reset();
    let once = network.compute(&[0.25]).unwrap();

    network.reset();
    network.reset();
    let twice = network.compute(&[0.25]).unwrap();

    assert_eq!(once, twice);
}
