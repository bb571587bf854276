pub mod activations;
pub mod losses;
pub mod error;
pub mod neuron;
pub mod network;
pub mod trainer;

pub mod prelude {
    pub use super::activations::*;
    pub use super::losses::*;
    pub use super::error::*;
    pub use super::neuron::*;
    pub use super::network::*;
    pub use super::trainer::*;
}
