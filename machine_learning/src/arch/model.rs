use ndarray::{Array2, ArrayView2};

use crate::{
    Result,
    graph::{Graph, NodeId},
    params::ParamSet,
};

/// The result of evaluating a model: the recorded graph and its output node.
#[derive(Debug)]
pub struct Forward {
    graph: Graph,
    output: NodeId,
}

impl Forward {
    pub fn new(graph: Graph, output: NodeId) -> Self {
        Self { graph, output }
    }

    /// The node holding the model's prediction.
    pub fn output(&self) -> NodeId {
        self.output
    }

    /// The value of the model's prediction.
    pub fn prediction(&self) -> Result<ArrayView2<'_, f64>> {
        self.graph.value(self.output)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Gives mutable access to the graph, used to record the loss on top of the prediction.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn into_parts(self) -> (Graph, NodeId) {
        (self.graph, self.output)
    }
}

/// A parameterized function from a batch of input rows to a batch of output rows.
///
/// The model owns its parameters, nothing else keeps a mutable reference to them.
pub trait Model {
    /// Returns the amount of columns every input row must have.
    fn input_dim(&self) -> usize;

    /// Returns the amount of columns of every output row.
    fn output_dim(&self) -> usize;

    fn params(&self) -> &ParamSet;

    /// Gives mutable access to the parameters, to be used by the update rule.
    fn params_mut(&mut self) -> &mut ParamSet;

    /// Evaluates the model over a batch.
    ///
    /// # Arguments
    /// * `x` - The input batch, of shape `(batch, input_dim)`.
    /// * `track_gradients` - Whether to record what the backward pass needs. Inference
    ///   should pass `false`.
    ///
    /// # Returns
    /// The recorded forward pass, or a `ShapeMismatch` error if `x` doesn't have
    /// `input_dim` columns.
    fn forward(&self, x: ArrayView2<f64>, track_gradients: bool) -> Result<Forward>;

    /// Evaluates the model without recording anything for a backward pass.
    fn predict(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        let forward = self.forward(x, false)?;
        Ok(forward.prediction()?.to_owned())
    }
}
