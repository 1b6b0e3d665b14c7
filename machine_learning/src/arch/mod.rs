pub mod activations;
mod builder;
pub mod layers;
pub mod loss;
mod model;
mod sequential;

pub use builder::SequentialBuilder;
pub use model::{Forward, Model};
pub use sequential::Sequential;
