use super::Dense;
use crate::{
    Result,
    arch::activations::ActFn,
    graph::{Graph, NodeId},
    params::ParamSet,
};

/// A layer of a `Sequential` model.
#[derive(Debug, Clone)]
pub enum Layer {
    Dense(Dense),
    /// An element-wise activation, keeps the dimension of its input.
    Activation(ActFn),
}

impl Layer {
    pub fn dense(dense: Dense) -> Self {
        Self::Dense(dense)
    }

    pub fn activation(act_fn: ActFn) -> Self {
        Self::Activation(act_fn)
    }

    /// Returns the amount of scalar parameters of the layer.
    pub fn size(&self) -> usize {
        match self {
            Layer::Dense(l) => l.size(),
            Layer::Activation(_) => 0,
        }
    }

    /// Returns the output dimension of the layer given its input dimension.
    pub fn output_dim(&self, input_dim: usize) -> usize {
        match self {
            Layer::Dense(l) => l.dim().1,
            Layer::Activation(_) => input_dim,
        }
    }

    pub fn forward(&self, graph: &mut Graph, params: &ParamSet, x: NodeId) -> Result<NodeId> {
        match self {
            Layer::Dense(l) => l.forward(graph, params, x),
            Layer::Activation(act_fn) => graph.activation(x, *act_fn),
        }
    }
}
