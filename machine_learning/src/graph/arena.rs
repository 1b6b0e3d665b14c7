use ndarray::{Array2, ArrayView2, Axis};

use super::node::{Node, NodeId, Op};
use crate::{
    MlErr, Result,
    arch::activations::ActFn,
    params::{ParamId, ParamSet},
};

/// A computational graph recorded while evaluating a model.
///
/// Nodes live in an arena and are referred to by `NodeId`. Since a node can only be built
/// out of nodes that already exist, the arena order is a topological order of the graph and
/// the backward pass simply walks it in reverse.
///
/// The graph remembers the generation of the `ParamSet` it read its parameters from, the
/// gradient it produces is only valid for that generation.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(super) nodes: Vec<Node>,
    pub(super) track_gradients: bool,
    pub(super) generation: u64,
}

impl Graph {
    /// Creates a new empty `Graph`.
    ///
    /// # Arguments
    /// * `params` - The parameters the graph is going to read from.
    /// * `track_gradients` - Whether to record the operations needed for a backward pass.
    ///   Inference passes `false` and only pays for the node values.
    pub fn new(params: &ParamSet, track_gradients: bool) -> Self {
        Self {
            nodes: Vec::new(),
            track_gradients,
            generation: params.generation(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_tracking(&self) -> bool {
        self.track_gradients
    }

    /// The generation of the parameters this graph was built from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the value of a node.
    pub fn value(&self, id: NodeId) -> Result<ArrayView2<'_, f64>> {
        self.node(id).map(|node| node.value.view())
    }

    /// Returns the value of a `1 x 1` node, like a loss.
    pub fn scalar(&self, id: NodeId) -> Result<f64> {
        let value = &self.node(id)?.value;
        if value.len() != 1 {
            return Err(MlErr::ShapeMismatch {
                what: "scalar node",
                got: value.len(),
                expected: 1,
            });
        }

        Ok(value[[0, 0]])
    }

    /// Records a constant.
    pub fn input(&mut self, x: Array2<f64>) -> NodeId {
        self.push(Op::Input, x)
    }

    /// Records a parameter read.
    ///
    /// # Returns
    /// An error if the parameter doesn't exist or `params` is not the generation the graph
    /// was created for.
    pub fn param(&mut self, params: &ParamSet, id: ParamId) -> Result<NodeId> {
        if params.generation() != self.generation {
            return Err(MlErr::StaleGradient {
                expected: self.generation,
                got: Some(params.generation()),
            });
        }

        let value = params.get(id)?.to_owned();
        Ok(self.push(Op::Param(id), value))
    }

    /// Records the matrix product `a · b`.
    pub fn matmul(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        let a_val = &self.node(a)?.value;
        let b_val = &self.node(b)?.value;

        if a_val.ncols() != b_val.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "matmul operands",
                got: b_val.nrows(),
                expected: a_val.ncols(),
            });
        }

        let value = a_val.dot(b_val);
        Ok(self.push(Op::MatMul(a, b), value))
    }

    /// Records `x + b`, where `b` is a single row broadcast over every row of `x`.
    pub fn add_bias(&mut self, x: NodeId, b: NodeId) -> Result<NodeId> {
        let x_val = &self.node(x)?.value;
        let b_val = &self.node(b)?.value;

        if b_val.nrows() != 1 {
            return Err(MlErr::ShapeMismatch {
                what: "bias rows",
                got: b_val.nrows(),
                expected: 1,
            });
        }

        if b_val.ncols() != x_val.ncols() {
            return Err(MlErr::ShapeMismatch {
                what: "bias columns",
                got: b_val.ncols(),
                expected: x_val.ncols(),
            });
        }

        let value = x_val + &b_val.row(0);
        Ok(self.push(Op::AddBias(x, b), value))
    }

    pub fn add(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        let value = {
            let (a_val, b_val) = self.same_shape("add operands", a, b)?;
            a_val + b_val
        };
        Ok(self.push(Op::Add(a, b), value))
    }

    pub fn sub(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        let value = {
            let (a_val, b_val) = self.same_shape("sub operands", a, b)?;
            a_val - b_val
        };
        Ok(self.push(Op::Sub(a, b), value))
    }

    /// Records the element-wise product of `a` and `b`.
    pub fn mul(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        let value = {
            let (a_val, b_val) = self.same_shape("mul operands", a, b)?;
            a_val * b_val
        };
        Ok(self.push(Op::Mul(a, b), value))
    }

    pub fn scale(&mut self, a: NodeId, k: f64) -> Result<NodeId> {
        let value = &self.node(a)?.value * k;
        Ok(self.push(Op::Scale(a, k), value))
    }

    /// Applies `act_fn` to every element of `a`.
    pub fn activation(&mut self, a: NodeId, act_fn: ActFn) -> Result<NodeId> {
        let value = self.node(a)?.value.mapv(|z| act_fn.f(z));
        Ok(self.push(Op::Activation(a, act_fn), value))
    }

    /// Sums every element of `a` into a `1 x 1` node.
    pub fn sum(&mut self, a: NodeId) -> Result<NodeId> {
        let value = Array2::from_elem((1, 1), self.node(a)?.value.sum());
        Ok(self.push(Op::Sum(a), value))
    }

    /// Records the mean squared error between a prediction and a target of the same shape.
    pub fn mse(&mut self, y_pred: NodeId, y: NodeId) -> Result<NodeId> {
        let loss = {
            let (pred, target) = self.same_shape("mse operands", y_pred, y)?;
            (pred - target)
                .mapv(|x| x.powi(2))
                .mean()
                .unwrap_or_default()
        };

        Ok(self.push(Op::Mse(y_pred, y), Array2::from_elem((1, 1), loss)))
    }

    /// Records the softmax cross-entropy of `logits` against one class index per row,
    /// averaged over the rows.
    ///
    /// # Returns
    /// An error if there isn't exactly one class per row or a class is out of range.
    pub fn softmax_cross_entropy(&mut self, logits: NodeId, classes: &[usize]) -> Result<NodeId> {
        let z = &self.node(logits)?.value;

        if classes.len() != z.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "class targets",
                got: classes.len(),
                expected: z.nrows(),
            });
        }

        if let Some(&class) = classes.iter().find(|&&c| c >= z.ncols()) {
            return Err(MlErr::InvalidClass {
                class,
                classes: z.ncols(),
            });
        }

        let mut probs = z.to_owned();
        let mut total = 0.;

        for (mut row, &class) in probs.rows_mut().into_iter().zip(classes) {
            let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
            let shifted = row[class] - max;
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            total += sum.ln() - shifted;
            row /= sum;
        }

        let loss = if classes.is_empty() {
            0.
        } else {
            total / classes.len() as f64
        };

        let op = Op::SoftmaxCrossEntropy {
            logits,
            classes: classes.to_vec(),
            probs,
        };

        Ok(self.push(op, Array2::from_elem((1, 1), loss)))
    }

    pub(super) fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(MlErr::UnknownNode {
            id: id.0,
            len: self.nodes.len(),
        })
    }

    fn same_shape(
        &self,
        what: &'static str,
        a: NodeId,
        b: NodeId,
    ) -> Result<(&Array2<f64>, &Array2<f64>)> {
        let a_val = &self.node(a)?.value;
        let b_val = &self.node(b)?.value;

        if a_val.nrows() != b_val.nrows() {
            return Err(MlErr::ShapeMismatch {
                what,
                got: b_val.nrows(),
                expected: a_val.nrows(),
            });
        }

        if a_val.ncols() != b_val.ncols() {
            return Err(MlErr::ShapeMismatch {
                what,
                got: b_val.ncols(),
                expected: a_val.ncols(),
            });
        }

        Ok((a_val, b_val))
    }

    fn push(&mut self, op: Op, value: Array2<f64>) -> NodeId {
        let op = if self.track_gradients { op } else { Op::Input };
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { op, value });
        id
    }
}

/// Row-wise index of the largest value.
pub(crate) fn argmax_rows(x: ArrayView2<f64>) -> Vec<usize> {
    x.axis_iter(Axis(0))
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |(best, max), (i, &v)| {
                    if v > max { (i, v) } else { (best, max) }
                })
                .0
        })
        .collect()
}
