mod model;
mod training;

use serde::{Deserialize, Serialize};

use crate::{MlErr, Result};

pub use model::{ActFnConfig, LayerConfig, ModelConfig, ParamGenConfig};
pub use training::{DatasetConfig, LossFnConfig, OptimizerConfig, TrainingConfig};

/// Everything needed to build and run a training job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub optimizer: OptimizerConfig,
    pub loss: LossFnConfig,
    pub dataset: DatasetConfig,
    pub training: TrainingConfig,
}

impl Config {
    /// Parses and validates a configuration.
    ///
    /// # Arguments
    /// * `json` - The configuration, as a JSON document.
    ///
    /// # Returns
    /// The configuration, or an error if it doesn't parse or describes an impossible job.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the parts of the configuration agree with each other.
    pub fn validate(&self) -> Result<()> {
        let output_dim = self.validate_model()?;
        self.validate_optimizer()?;
        self.validate_dataset(output_dim)
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Returns the output dimension of the model.
    fn validate_model(&self) -> Result<usize> {
        let ModelConfig::Sequential { layers } = &self.model;

        let Some(LayerConfig::Dense { dim: (n, _), .. }) = layers.first() else {
            return Err(invalid("model must have at least one layer"));
        };

        if *n != self.dataset.x_size() {
            return Err(invalid(format!(
                "model input size ({n}) does not match the dataset's x_size ({})",
                self.dataset.x_size()
            )));
        }

        // Adjacent layers must have compatible dimensions: prev.m == next.n
        let mut prev_m = *n;
        for (i, layer) in layers.iter().enumerate() {
            let LayerConfig::Dense { dim: (n, m), .. } = *layer;

            if n != prev_m {
                return Err(invalid(format!(
                    "layer {i}: input size ({n}) does not match previous layer output size ({prev_m})"
                )));
            }

            if m == 0 {
                return Err(invalid(format!("layer {i}: output size must be greater than 0")));
            }

            prev_m = m;
        }

        Ok(prev_m)
    }

    fn validate_optimizer(&self) -> Result<()> {
        let lr = self.optimizer.learning_rate();
        if !lr.is_finite() || lr <= 0. {
            return Err(invalid(format!("learning_rate ({lr}) must be a positive number")));
        }

        Ok(())
    }

    fn validate_dataset(&self, output_dim: usize) -> Result<()> {
        let dataset = &self.dataset;
        let row_size = dataset.row_size();
        let data = dataset.data();

        if dataset.x_size() == 0 {
            return Err(invalid("x_size must be greater than 0"));
        }

        if data.len() % row_size != 0 {
            return Err(invalid(format!(
                "dataset length ({}) is not divisible by its row size ({row_size})",
                data.len()
            )));
        }

        let samples = data.len() / row_size;
        if samples == 0 {
            return Err(invalid("dataset must have at least one sample"));
        }

        let batch_size = self.training.batch_size.get();
        if batch_size > samples {
            return Err(invalid(format!(
                "batch_size ({batch_size}) exceeds dataset size ({samples} samples)"
            )));
        }

        match (self.loss, dataset) {
            (LossFnConfig::Mse, DatasetConfig::Inline { y_size, .. }) => {
                if *y_size != output_dim {
                    return Err(invalid(format!(
                        "model output size ({output_dim}) does not match the dataset's y_size ({y_size})"
                    )));
                }
            }
            (LossFnConfig::CrossEntropy, DatasetConfig::Labeled { x_size, .. }) => {
                let mut labels = data.chunks_exact(row_size).map(|row| row[*x_size]);
                if let Some(label) =
                    labels.find(|&l| l < 0. || l.fract() != 0. || l >= output_dim as f64)
                {
                    return Err(invalid(format!(
                        "label {label} is not a class index below the model output size ({output_dim})"
                    )));
                }
            }
            (LossFnConfig::Mse, DatasetConfig::Labeled { .. }) => {
                return Err(invalid("mse needs an inline dataset with real valued targets"));
            }
            (LossFnConfig::CrossEntropy, DatasetConfig::Inline { .. }) => {
                return Err(invalid("cross_entropy needs a labeled dataset"));
            }
        }

        Ok(())
    }
}

fn invalid<S: Into<String>>(msg: S) -> MlErr {
    MlErr::InvalidConfig(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINEAR: &str = r#"{
        "model": { "sequential": { "layers": [
            { "dense": { "dim": [1, 1], "init": { "const": { "value": 0.0 } } } }
        ] } },
        "optimizer": { "gradient_descent": { "learning_rate": 0.1 } },
        "loss": "mse",
        "dataset": { "inline": { "data": [0.0, 1.0, 1.0, 3.0], "x_size": 1, "y_size": 1 } },
        "training": { "epochs": 3, "batch_size": 2, "seed": 7 }
    }"#;

    fn linear() -> Config {
        serde_json::from_str(LINEAR).unwrap()
    }

    #[test]
    fn parses_with_defaults() {
        let config = Config::from_json(LINEAR).unwrap();

        assert_eq!(config.loss, LossFnConfig::Mse);
        assert_eq!(config.training.epochs, 3);
        assert_eq!(config.training.report_every.get(), 1);
        assert!(config.training.shuffle);
        assert_eq!(config.training.seed, Some(7));

        let ModelConfig::Sequential { layers } = &config.model;
        assert_eq!(
            layers[0],
            LayerConfig::Dense {
                dim: (1, 1),
                init: ParamGenConfig::Const { value: 0. },
                act_fn: None,
            }
        );
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(Config::from_json("{"), Err(MlErr::Json(_))));
    }

    #[test]
    fn layers_must_chain() {
        let mut config = linear();
        config.model = ModelConfig::Sequential {
            layers: vec![
                LayerConfig::Dense {
                    dim: (1, 4),
                    init: ParamGenConfig::default(),
                    act_fn: Some(ActFnConfig::Relu),
                },
                LayerConfig::Dense {
                    dim: (3, 1),
                    init: ParamGenConfig::default(),
                    act_fn: None,
                },
            ],
        };

        assert!(matches!(config.validate(), Err(MlErr::InvalidConfig(_))));
    }

    #[test]
    fn rejects_empty_models() {
        let mut config = linear();
        config.model = ModelConfig::Sequential { layers: vec![] };
        assert!(matches!(config.validate(), Err(MlErr::InvalidConfig(_))));
    }

    #[test]
    fn batch_size_cannot_exceed_the_dataset() {
        let mut config = linear();
        config.training.batch_size = std::num::NonZeroUsize::new(3).unwrap();
        assert!(matches!(config.validate(), Err(MlErr::InvalidConfig(_))));
    }

    #[test]
    fn ragged_datasets_are_rejected() {
        let mut config = linear();
        config.dataset = DatasetConfig::Inline {
            data: vec![0., 1., 2.],
            x_size: 1,
            y_size: 1,
        };
        assert!(matches!(config.validate(), Err(MlErr::InvalidConfig(_))));
    }

    #[test]
    fn loss_and_dataset_kinds_must_agree() {
        let mut config = linear();
        config.loss = LossFnConfig::CrossEntropy;
        assert!(matches!(config.validate(), Err(MlErr::InvalidConfig(_))));

        config.dataset = DatasetConfig::Labeled {
            data: vec![0., 0., 1., 0.],
            x_size: 1,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn learning_rate_must_be_positive() {
        let mut config = linear();
        config.optimizer = OptimizerConfig::GradientDescent { learning_rate: 0. };
        assert!(matches!(config.validate(), Err(MlErr::InvalidConfig(_))));
    }
}
