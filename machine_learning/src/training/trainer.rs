use crate::{
    Result,
    params::ParamSet,
    report::{EpochStats, Evaluation, ReportSink},
    training::Phase,
};

/// A type-erased training run, as built by `TrainerBuilder`.
pub trait Trainer {
    /// Runs every configured epoch, sending periodic loss reports to `sink`.
    fn train(&mut self, sink: &mut dyn ReportSink) -> Result<Vec<EpochStats>>;

    /// Measures the model over the whole dataset without tracking gradients.
    fn evaluate(&self) -> Result<Evaluation>;

    /// Returns the model's current parameters.
    fn params(&self) -> &ParamSet;

    fn phase(&self) -> Phase;
}
