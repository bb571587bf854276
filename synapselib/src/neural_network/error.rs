#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
/// Contract violations surfaced by the network and the trainer.
///
/// Non-convergence of a training run is not listed here on purpose:
/// it is a reported outcome, not an error.
pub enum NetworkError {
    #[error("vector of length {got} does not match layer of size {expected}")]
    ShapeMismatch {
        expected: usize,
        got: usize
    },

    #[error("input neuron {index} fired with no assigned value")]
    UnsetInput {
        index: usize
    },

    #[error("training requires at least one sample")]
    EmptyTrainingSet,

    #[error("network needs an input and an output layer")]
    MissingLayers,

    #[error("layer {layer} must contain at least one neuron")]
    EmptyLayer {
        layer: usize
    }
}
