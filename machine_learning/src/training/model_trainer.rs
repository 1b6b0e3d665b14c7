use std::{num::NonZeroUsize, time::Instant};

use log::{debug, warn};
use rand::Rng;

use super::{Phase, Trainer, TrainingState};
use crate::{
    MlErr, Result,
    arch::{Model, loss::LossFn},
    dataset::{Batch, Dataset, Targets},
    metrics,
    optimization::Optimizer,
    params::{GradSet, ParamSet},
    report::{EpochStats, Evaluation, LossReport, ReportSink},
};

/// A model `Trainer`. Contains the relevant components needed for training a model,
/// including the model itself.
pub struct ModelTrainer<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    model: M,
    optimizer: O,
    dataset: Dataset,
    loss_fn: L,
    grads: GradSet,

    epochs: usize,
    batch_size: NonZeroUsize,
    report_every: NonZeroUsize,
    shuffle: bool,
    rng: R,

    state: TrainingState,
}

impl<M, O, L, R> ModelTrainer<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    /// Returns a new `ModelTrainer`.
    ///
    /// The trainer reports every step and shuffles the dataset every epoch, see
    /// `with_report_every` and `with_shuffle`.
    ///
    /// # Arguments
    /// * `model` - The model that will be trained.
    /// * `optimizer` - The update rule applied after every step.
    /// * `dataset` - The dataset the model will be trained with.
    /// * `epochs` - The amount of passes over the dataset per `train` call.
    /// * `batch_size` - The amount of samples per step.
    /// * `loss_fn` - The loss function used to measure the difference between a model's output and the expected one.
    /// * `rng` - A random number generator.
    pub fn new(
        model: M,
        optimizer: O,
        dataset: Dataset,
        epochs: usize,
        batch_size: NonZeroUsize,
        loss_fn: L,
        rng: R,
    ) -> Self {
        Self {
            grads: GradSet::for_params(model.params()),
            model,
            optimizer,
            dataset,
            loss_fn,
            epochs,
            batch_size,
            report_every: NonZeroUsize::MIN,
            shuffle: true,
            rng,
            state: TrainingState::new(),
        }
    }

    /// Sets the amount of steps between loss reports.
    pub fn with_report_every(mut self, report_every: NonZeroUsize) -> Self {
        self.report_every = report_every;
        self
    }

    /// Sets whether the dataset is shuffled at the start of every epoch.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn state(&self) -> &TrainingState {
        &self.state
    }

    /// Returns the gradient computed by the last step.
    pub fn grads(&self) -> &GradSet {
        &self.grads
    }

    /// Performs a single training step over `batch`.
    ///
    /// The step clears the gradient, runs the forward pass, computes the loss, runs the
    /// backward pass and finally updates the parameters, in that order. If anything before the
    /// update fails, the parameters are left untouched.
    ///
    /// A non-finite loss ends the run: it's added to the pending loss report, which is flushed
    /// into `sink`, and the trainer moves to `Done` without updating the parameters.
    ///
    /// # Returns
    /// The loss of the batch before the update.
    pub fn step(&mut self, batch: &Batch, sink: &mut dyn ReportSink) -> Result<f64> {
        if self.state.is_done() {
            return Err(MlErr::TrainerDone);
        }

        self.grads.zero();

        let (mut graph, y_pred) = self.model.forward(batch.x(), true)?.into_parts();
        let loss_node = self.loss_fn.loss(&mut graph, y_pred, batch.y())?;
        let loss = graph.scalar(loss_node)?;

        if !loss.is_finite() {
            let step = self.state.step() + 1;
            warn!(step = step, loss = loss; "non-finite loss, stopping");

            self.state.record_failed(loss);
            self.flush(sink, step);
            self.state.finish();
            return Err(MlErr::NonFiniteLoss { step, loss });
        }

        graph.backward(loss_node, &mut self.grads)?;
        self.optimizer.step(self.model.params_mut(), &self.grads)?;

        self.state.record(loss);
        let step = self.state.step();

        debug!(step = step, loss = loss, grad_norm = self.grads.norm(); "step finished");

        if step % self.report_every.get() == 0 {
            self.flush(sink, step);
        }

        Ok(loss)
    }

    /// Performs `epochs` epochs of training its model, using its optimizer, dataset, loss
    /// function and batch size.
    ///
    /// Zero epochs finish the run right away without touching the parameters. Any error
    /// ends the run.
    ///
    /// # Arguments
    /// * `sink` - Where the periodic loss reports are sent.
    ///
    /// # Returns
    /// The statistics of every epoch, or `TrainerDone` if the run already finished.
    pub fn train(&mut self, sink: &mut dyn ReportSink) -> Result<Vec<EpochStats>> {
        if self.state.is_done() {
            return Err(MlErr::TrainerDone);
        }

        let result = self.run_epochs(sink);

        self.flush(sink, self.state.step());
        self.state.finish();
        result
    }

    fn run_epochs(&mut self, sink: &mut dyn ReportSink) -> Result<Vec<EpochStats>> {
        let mut stats = Vec::with_capacity(self.epochs);

        for epoch in 0..self.epochs {
            self.state.start_epoch(epoch);
            let start = Instant::now();

            if self.shuffle {
                self.dataset.shuffle(&mut self.rng);
            }

            let batches: Vec<Batch> = self.dataset.batches(self.batch_size).collect();
            let mut total = 0.;

            for batch in &batches {
                total += self.step(batch, sink)?;
            }

            let epoch_stats = EpochStats {
                epoch,
                steps: batches.len(),
                avg_loss: total / batches.len().max(1) as f64,
                elapsed_ms: start.elapsed().as_millis() as u64,
            };

            debug!(
                epoch = epoch,
                steps = epoch_stats.steps,
                avg_loss = epoch_stats.avg_loss,
                elapsed_ms = epoch_stats.elapsed_ms;
                "epoch finished"
            );

            stats.push(epoch_stats);
        }

        Ok(stats)
    }

    /// Measures the model over the whole dataset without tracking gradients.
    pub fn evaluate(&self) -> Result<Evaluation> {
        let batch = self.dataset.full();

        let (mut graph, y_pred) = self.model.forward(batch.x(), false)?.into_parts();
        let loss_node = self.loss_fn.loss(&mut graph, y_pred, batch.y())?;
        let loss = graph.scalar(loss_node)?;

        let accuracy = match batch.y() {
            Targets::Classes(classes) => Some(metrics::accuracy(graph.value(y_pred)?, classes)?),
            Targets::Values(_) => None,
        };

        Ok(Evaluation { loss, accuracy })
    }

    /// Sends the pending loss report, if any, labelled with the 1-based `step` it ends at.
    fn flush(&mut self, sink: &mut dyn ReportSink, step: usize) {
        let Some((steps, avg_loss)) = self.state.take_running() else {
            return;
        };

        sink.report(LossReport {
            epoch: self.state.epoch(),
            step,
            steps,
            avg_loss,
        });
    }
}

impl<M, O, L, R> Trainer for ModelTrainer<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    fn train(&mut self, sink: &mut dyn ReportSink) -> Result<Vec<EpochStats>> {
        self.train(sink)
    }

    fn evaluate(&self) -> Result<Evaluation> {
        self.evaluate()
    }

    fn params(&self) -> &ParamSet {
        self.model.params()
    }

    fn phase(&self) -> Phase {
        self.state.phase()
    }
}
