pub mod neural_network;
pub mod database;

pub mod prelude {
    pub use super::neural_network::prelude::*;
    pub use super::database::prelude::*;
}
