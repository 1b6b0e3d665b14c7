mod builder;
mod model_trainer;
mod state;
mod trainer;

pub use builder::TrainerBuilder;
pub use model_trainer::ModelTrainer;
pub use state::{Phase, TrainingState};
pub use trainer::Trainer;
