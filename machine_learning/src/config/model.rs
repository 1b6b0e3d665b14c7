use serde::{Deserialize, Serialize};

use crate::{arch::activations::ActFn, initialization::ParamGen};

/// The configuration of an `ActFn`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnConfig {
    Sigmoid { amp: f64 },
    Tanh,
    Relu,
}

impl From<ActFnConfig> for ActFn {
    fn from(config: ActFnConfig) -> Self {
        match config {
            ActFnConfig::Sigmoid { amp } => ActFn::sigmoid(amp),
            ActFnConfig::Tanh => ActFn::tanh(),
            ActFnConfig::Relu => ActFn::relu(),
        }
    }
}

/// The configuration of a weight initializer, fans are taken from the layer's dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamGenConfig {
    Const {
        value: f64,
    },
    Uniform {
        low: f64,
        high: f64,
    },
    Normal {
        mean: f64,
        std_dev: f64,
    },
    #[default]
    XavierUniform,
    LecunUniform,
    Kaiming,
    Xavier,
}

impl From<ParamGenConfig> for ParamGen {
    fn from(config: ParamGenConfig) -> Self {
        match config {
            ParamGenConfig::Const { value } => ParamGen::Const { value },
            ParamGenConfig::Uniform { low, high } => ParamGen::Uniform { low, high },
            ParamGenConfig::Normal { mean, std_dev } => ParamGen::Normal { mean, std_dev },
            ParamGenConfig::XavierUniform => ParamGen::XavierUniform,
            ParamGenConfig::LecunUniform => ParamGen::LecunUniform,
            ParamGenConfig::Kaiming => ParamGen::Kaiming,
            ParamGenConfig::Xavier => ParamGen::Xavier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerConfig {
    Dense {
        dim: (usize, usize),
        #[serde(default)]
        init: ParamGenConfig,
        #[serde(default)]
        act_fn: Option<ActFnConfig>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelConfig {
    Sequential { layers: Vec<LayerConfig> },
}
