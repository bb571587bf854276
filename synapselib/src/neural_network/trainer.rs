use super::prelude::*;

#[derive(Debug, Clone, PartialEq)]
/// Pair of an input vector and the output vector the network should
/// learn to produce for it.
pub struct TrainingSample {
    pub inputs: Vec<f64>,
    pub desired: Vec<f64>
}

impl TrainingSample {
    #[inline]
    /// Create new training sample.
    pub fn new(inputs: Vec<f64>, desired: Vec<f64>) -> Self {
        Self {
            inputs,
            desired
        }
    }
}

impl From<(Vec<f64>, Vec<f64>)> for TrainingSample {
    #[inline]
    fn from((inputs, desired): (Vec<f64>, Vec<f64>)) -> Self {
        Self::new(inputs, desired)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Terminal state of a training run.
///
/// Hitting the epoch cap is a reported outcome rather than an error:
/// the network keeps whatever progress the committed epochs made.
pub enum TrainOutcome {
    /// Epoch error fell to the target threshold.
    Converged,

    /// The epoch cap was reached before the error target.
    MaxEpochsReached
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Result of a training run.
pub struct TrainReport {
    /// Squared error summed over all samples of the last measured epoch.
    pub error: f64,

    /// Amount of epochs the run went through.
    pub epochs: u32,

    /// Why the run stopped.
    pub outcome: TrainOutcome
}

impl TrainReport {
    #[inline]
    /// Whether the run stopped by reaching the error target.
    pub fn converged(&self) -> bool {
        self.outcome == TrainOutcome::Converged
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Gradient descent driver for a network.
///
/// Runs epochs of reset → forward → backward over the whole sample set,
/// committing the staged weights once per epoch so every sweep of an
/// epoch works against the same frozen weight snapshot, and optionally
/// adapts the step size between epochs: growing it while the error
/// keeps falling and cutting it roughly in half on a regression, which
/// counters both stagnation and overshoot without a line search.
///
/// ```
/// use synapselib::prelude::*;
///
/// let mut rng = fastrand::Rng::with_seed(42);
/// let mut network = Network::random(&[1, 1], &mut rng).unwrap();
///
/// let samples = [
///     TrainingSample::new(vec![1.0], vec![0.0])
/// ];
///
/// let report = Trainer::default()
///     .with_error_threshold(0.01)
///     .train(&mut network, &samples)
///     .unwrap();
///
/// assert!(report.converged());
/// ```
pub struct Trainer {
    step_size: f64,
    error_threshold: f64,
    max_epochs: u32,
    adaptive_step: bool,
    step_growth: f64,
    step_decay: f64
}

impl Default for Trainer {
    fn default() -> Self {
        Self {
            step_size: 0.1,
            error_threshold: 0.1,
            max_epochs: 10_000,
            adaptive_step: true,
            step_growth: 1.05,
            step_decay: 0.5
        }
    }
}

impl Trainer {
    #[inline]
    /// Change the initial gradient descent step size.
    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;

        self
    }

    #[inline]
    /// Change the mean squared error under which an epoch counts
    /// as converged.
    pub fn with_error_threshold(mut self, error_threshold: f64) -> Self {
        self.error_threshold = error_threshold;

        self
    }

    #[inline]
    /// Change the maximal amount of epochs to run.
    pub fn with_max_epochs(mut self, max_epochs: u32) -> Self {
        self.max_epochs = max_epochs;

        self
    }

    #[inline]
    /// Toggle step size adaptation between epochs.
    ///
    /// With adaptation disabled the initial step size is used for
    /// every epoch.
    pub fn with_adaptive_step(mut self, adaptive_step: bool) -> Self {
        self.adaptive_step = adaptive_step;

        self
    }

    #[inline]
    /// Change the factor the step size grows by after an improving epoch.
    pub fn with_step_growth(mut self, step_growth: f64) -> Self {
        self.step_growth = step_growth;

        self
    }

    #[inline]
    /// Change the factor the step size shrinks by after a worsening epoch.
    pub fn with_step_decay(mut self, step_decay: f64) -> Self {
        self.step_decay = step_decay;

        self
    }

    /// Train the network on the given samples until the epoch error
    /// falls to `error_threshold × samples amount` or the epoch cap
    /// is reached.
    ///
    /// Either stop is a normal outcome carried by the returned report.
    /// Errors surface only for contract violations: an empty sample set
    /// or sample vectors which do not match the network's layer sizes.
    pub fn train(
        &self,
        network: &mut Network,
        samples: &[TrainingSample]
    ) -> Result<TrainReport, NetworkError> {
        if samples.is_empty() {
            return Err(NetworkError::EmptyTrainingSet);
        }

        for sample in samples {
            if sample.inputs.len() != network.input_size() {
                return Err(NetworkError::ShapeMismatch {
                    expected: network.input_size(),
                    got: sample.inputs.len()
                });
            }

            if sample.desired.len() != network.output_size() {
                return Err(NetworkError::ShapeMismatch {
                    expected: network.output_size(),
                    got: sample.desired.len()
                });
            }
        }

        // A previous run that stopped on convergence never committed its
        // final epoch, so re-arm the staged buffers from the live weights.
        network.discard_staged();

        let mut step_size = self.step_size;
        let mut previous_error = f64::INFINITY;
        let mut error = f64::INFINITY;

        for epoch in 1..=self.max_epochs {
            error = 0.0;

            for sample in samples {
                network.reset();

                let outputs = network.compute(&sample.inputs)?;

                error += distance_squared(&outputs, &sample.desired);

                network.back_propagate(&sample.desired, step_size)?;
            }

            if error <= self.error_threshold * samples.len() as f64 {
                return Ok(TrainReport {
                    error,
                    epochs: epoch,
                    outcome: TrainOutcome::Converged
                });
            }

            network.commit_weights();

            if self.adaptive_step {
                if error < previous_error {
                    step_size *= self.step_growth;
                } else {
                    step_size *= self.step_decay;
                }
            }

            previous_error = error;
        }

        Ok(TrainReport {
            error,
            epochs: self.max_epochs,
            outcome: TrainOutcome::MaxEpochsReached
        })
    }
}

#[cfg(test)]
/// The four-sample exclusive-or table.
fn xor_samples() -> Vec<TrainingSample> {
    vec![
        TrainingSample::new(vec![0.0, 0.0], vec![0.0]),
        TrainingSample::new(vec![0.0, 1.0], vec![1.0]),
        TrainingSample::new(vec![1.0, 0.0], vec![1.0]),
        TrainingSample::new(vec![1.0, 1.0], vec![0.0])
    ]
}

#[test]
/// Test that training with no samples is rejected.
fn test_empty_training_set() {
    let mut rng = fastrand::Rng::with_seed(3);
    let mut network = Network::random(&[2, 1], &mut rng).unwrap();

    assert_eq!(
        Trainer::default().train(&mut network, &[]),
        Err(NetworkError::EmptyTrainingSet)
    );
}

#[test]
/// Test that sample vectors are validated against the layer sizes
/// before the first epoch runs.
fn test_sample_shape_validation() {
    let mut rng = fastrand::Rng::with_seed(4);
    let mut network = Network::random(&[2, 1], &mut rng).unwrap();

    let samples = [
        TrainingSample::new(vec![0.0, 1.0, 2.0], vec![0.0])
    ];

    assert_eq!(
        Trainer::default().train(&mut network, &samples),
        Err(NetworkError::ShapeMismatch { expected: 2, got: 3 })
    );

    let samples = [
        TrainingSample::new(vec![0.0, 1.0], vec![0.0, 1.0])
    ];

    assert_eq!(
        Trainer::default().train(&mut network, &samples),
        Err(NetworkError::ShapeMismatch { expected: 1, got: 2 })
    );
}

#[test]
/// Test convergence on a single-neuron network where gradient descent
/// has a monotone path to the target.
fn test_single_neuron_convergence() {
    let mut rng = fastrand::Rng::with_seed(5);
    let mut network = Network::random(&[1, 1], &mut rng).unwrap();

    let samples = [
        TrainingSample::new(vec![1.0], vec![0.0])
    ];

    let report = Trainer::default()
        .with_error_threshold(0.01)
        .train(&mut network, &samples)
        .unwrap();

    assert!(report.converged());
    assert!(report.error <= 0.01);
    assert!(report.epochs >= 1);

    network.reset();

    let outputs = network.compute(&[1.0]).unwrap();

    assert!(outputs[0] < 0.15);
}

#[test]
/// Test that hitting the epoch cap reports a terminal outcome
/// instead of raising an error.
fn test_max_epochs_reached() {
    let mut rng = fastrand::Rng::with_seed(6);
    let mut network = Network::random(&[2, 2, 1], &mut rng).unwrap();

    let report = Trainer::default()
        .with_error_threshold(0.01)
        .with_max_epochs(5)
        .train(&mut network, &xor_samples())
        .unwrap();

    assert_eq!(report.outcome, TrainOutcome::MaxEpochsReached);
    assert_eq!(report.epochs, 5);
    assert!(report.error > 0.04);
}

#[test]
/// Train 2-2-1 networks on the exclusive-or table from several fixed
/// seeds. Adaptive batch descent can stall in a local minimum for an
/// unlucky initialization, so a majority of the seeds converging is
/// the asserted property.
fn test_xor_convergence() {
    let samples = xor_samples();

    let mut converged = 0;

    for seed in 0..5 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut network = Network::random(&[2, 2, 1], &mut rng).unwrap();

        let report = Trainer::default()
            .with_error_threshold(0.01)
            .with_max_epochs(50_000)
            .train(&mut network, &samples)
            .unwrap();

        if !report.converged() {
            continue;
        }

        converged += 1;

        // A converged network must actually separate the table.
        for sample in &samples {
            network.reset();

            let outputs = network.compute(&sample.inputs).unwrap();

            assert_eq!(outputs[0].round(), sample.desired[0]);
        }
    }

    assert!(converged >= 3, "only {converged} of 5 seeds converged");
}
