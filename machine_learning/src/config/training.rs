use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerConfig {
    Adam {
        learning_rate: f64,
        beta1: f64,
        beta2: f64,
        epsilon: f64,
    },
    GradientDescent {
        learning_rate: f64,
    },
    GradientDescentWithMomentum {
        learning_rate: f64,
        momentum: f64,
    },
}

impl OptimizerConfig {
    pub fn learning_rate(&self) -> f64 {
        match *self {
            OptimizerConfig::Adam { learning_rate, .. }
            | OptimizerConfig::GradientDescent { learning_rate }
            | OptimizerConfig::GradientDescentWithMomentum { learning_rate, .. } => learning_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFnConfig {
    Mse,
    CrossEntropy,
}

/// An in-memory dataset, flattened row by row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetConfig {
    /// Rows of `x_size` inputs followed by `y_size` real valued targets.
    Inline {
        data: Vec<f64>,
        x_size: usize,
        y_size: usize,
    },
    /// Rows of `x_size` inputs followed by a class index.
    Labeled { data: Vec<f64>, x_size: usize },
}

impl DatasetConfig {
    pub fn x_size(&self) -> usize {
        match *self {
            DatasetConfig::Inline { x_size, .. } | DatasetConfig::Labeled { x_size, .. } => x_size,
        }
    }

    /// The amount of values in every row.
    pub fn row_size(&self) -> usize {
        match *self {
            DatasetConfig::Inline { x_size, y_size, .. } => x_size + y_size,
            DatasetConfig::Labeled { x_size, .. } => x_size + 1,
        }
    }

    pub fn data(&self) -> &[f64] {
        match self {
            DatasetConfig::Inline { data, .. } | DatasetConfig::Labeled { data, .. } => data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: NonZeroUsize,
    #[serde(default = "default_report_every")]
    pub report_every: NonZeroUsize,
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_report_every() -> NonZeroUsize {
    NonZeroUsize::MIN
}

fn default_shuffle() -> bool {
    true
}
