use ndarray::Array2;

use crate::{arch::activations::ActFn, params::ParamId};

/// Identifies a node inside a `Graph`'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The operation that produced a node and the operands it consumed.
///
/// Operands always have lower indices than the node itself.
#[derive(Debug, Clone)]
pub(crate) enum Op {
    /// A constant, inputs and targets, or any node of an untracked graph.
    Input,
    Param(ParamId),
    MatMul(NodeId, NodeId),
    /// Adds a `1 x n` row to every row of an `m x n` node.
    AddBias(NodeId, NodeId),
    Add(NodeId, NodeId),
    Sub(NodeId, NodeId),
    Mul(NodeId, NodeId),
    Scale(NodeId, f64),
    Activation(NodeId, ActFn),
    Sum(NodeId),
    Mse(NodeId, NodeId),
    /// Keeps the softmax of the logits around for the backward rule.
    SoftmaxCrossEntropy {
        logits: NodeId,
        classes: Vec<usize>,
        probs: Array2<f64>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub op: Op,
    pub value: Array2<f64>,
}
