use log::debug;
use rand::{SeedableRng, rngs::StdRng};

use super::{ModelTrainer, Trainer};
use crate::{
    Result,
    arch::{
        Model, Sequential, SequentialBuilder,
        loss::{CrossEntropy, LossFn, Mse},
    },
    config::{Config, DatasetConfig, LayerConfig, LossFnConfig, ModelConfig, OptimizerConfig},
    dataset::Dataset,
    optimization::{Adam, GradientDescent, GradientDescentWithMomentum, Optimizer},
};

/// Builds `Trainer`s given a configuration.
#[derive(Debug, Default)]
pub struct TrainerBuilder;

impl TrainerBuilder {
    /// Creates a new `TrainerBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `Trainer` following a configuration.
    ///
    /// # Arguments
    /// * `config` - The configuration for the trainer, it's validated before anything is built.
    ///
    /// # Returns
    /// The trainer, or an error if the configuration is invalid.
    pub fn build(&self, config: &Config) -> Result<Box<dyn Trainer>> {
        config.validate()?;

        let mut rng = self.generate_rng(config.training.seed);
        let model = self.resolve_model(&config.model, &mut rng)?;

        debug!(
            params = model.params().len(),
            scalars = model.params().num_scalars();
            "model built"
        );

        self.resolve_optimizer(config, model, rng)
    }

    fn resolve_model(&self, config: &ModelConfig, rng: &mut StdRng) -> Result<Sequential> {
        match config {
            ModelConfig::Sequential { layers } => {
                let builder = layers.iter().fold(SequentialBuilder::new(), |builder, layer| {
                    let LayerConfig::Dense { dim, init, act_fn } = *layer;
                    builder.dense(dim, act_fn.map(Into::into), init.into())
                });

                builder.build(rng)
            }
        }
    }

    fn resolve_optimizer<M>(
        &self,
        config: &Config,
        model: M,
        rng: StdRng,
    ) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
    {
        match config.optimizer {
            OptimizerConfig::GradientDescent { learning_rate } => {
                let optimizer = GradientDescent::new(learning_rate);
                self.resolve_loss(config, model, optimizer, rng)
            }
            OptimizerConfig::GradientDescentWithMomentum {
                learning_rate,
                momentum,
            } => {
                let optimizer = GradientDescentWithMomentum::new(learning_rate, momentum);
                self.resolve_loss(config, model, optimizer, rng)
            }
            OptimizerConfig::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => {
                let optimizer = Adam::new(learning_rate, beta1, beta2, epsilon);
                self.resolve_loss(config, model, optimizer, rng)
            }
        }
    }

    fn resolve_loss<M, O>(
        &self,
        config: &Config,
        model: M,
        optimizer: O,
        rng: StdRng,
    ) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
        O: Optimizer + 'static,
    {
        match config.loss {
            LossFnConfig::Mse => self.terminate_build(config, model, optimizer, Mse::new(), rng),
            LossFnConfig::CrossEntropy => {
                self.terminate_build(config, model, optimizer, CrossEntropy::new(), rng)
            }
        }
    }

    fn terminate_build<M, O, L>(
        &self,
        config: &Config,
        model: M,
        optimizer: O,
        loss_fn: L,
        rng: StdRng,
    ) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
        O: Optimizer + 'static,
        L: LossFn + 'static,
    {
        let dataset = self.resolve_dataset(&config.dataset)?;
        let training = config.training;

        let trainer = ModelTrainer::new(
            model,
            optimizer,
            dataset,
            training.epochs,
            training.batch_size,
            loss_fn,
            rng,
        )
        .with_report_every(training.report_every)
        .with_shuffle(training.shuffle);

        Ok(Box::new(trainer))
    }

    fn resolve_dataset(&self, config: &DatasetConfig) -> Result<Dataset> {
        match config {
            DatasetConfig::Inline {
                data,
                x_size,
                y_size,
            } => Dataset::from_rows(data.clone(), *x_size, *y_size),
            DatasetConfig::Labeled { data, x_size } => Dataset::labeled(data.clone(), *x_size),
        }
    }

    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{report::LossReport, training::Phase};

    const CONFIG: &str = r#"{
        "model": { "sequential": { "layers": [
            { "dense": { "dim": [2, 3], "init": "kaiming", "act_fn": "relu" } },
            { "dense": { "dim": [3, 1] } }
        ] } },
        "optimizer": { "adam": { "learning_rate": 0.01, "beta1": 0.9, "beta2": 0.999, "epsilon": 1e-8 } },
        "loss": "mse",
        "dataset": { "inline": { "data": [0, 0, 0, 0, 1, 1, 1, 0, 1, 1, 1, 0], "x_size": 2, "y_size": 1 } },
        "training": { "epochs": 2, "batch_size": 2, "report_every": 2, "seed": 1 }
    }"#;

    #[test]
    fn builds_a_runnable_trainer() {
        let config = Config::from_json(CONFIG).unwrap();
        let mut trainer = TrainerBuilder::new().build(&config).unwrap();

        assert_eq!(trainer.phase(), Phase::Idle);
        assert_eq!(trainer.params().len(), 4);

        let mut reports: Vec<LossReport> = Vec::new();
        let stats = trainer.train(&mut reports).unwrap();

        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.steps == 2));
        assert_eq!(reports.len(), 2);
        assert_eq!(trainer.phase(), Phase::Done);
        assert!(trainer.evaluate().unwrap().accuracy.is_none());
    }

    #[test]
    fn same_seed_same_initial_params() {
        let config = Config::from_json(CONFIG).unwrap();
        let a = TrainerBuilder::new().build(&config).unwrap();
        let b = TrainerBuilder::new().build(&config).unwrap();

        assert_eq!(a.params().to_vec(), b.params().to_vec());
    }
}
