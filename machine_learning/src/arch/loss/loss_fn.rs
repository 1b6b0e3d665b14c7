use crate::{
    Result,
    dataset::Targets,
    graph::{Graph, NodeId},
};

/// Measures how far a model's prediction is from the expected targets.
pub trait LossFn {
    /// A short name, used for logging and errors.
    fn name(&self) -> &'static str;

    /// Records the loss of `y_pred` against `y` on the graph.
    ///
    /// # Arguments
    /// * `graph` - The graph holding the prediction.
    /// * `y_pred` - The prediction node, of shape `(batch, output_dim)`.
    /// * `y` - The expected targets for the batch.
    ///
    /// # Returns
    /// A `1 x 1` node holding the loss, or an error if the targets are of the wrong kind or
    /// shape.
    fn loss(&self, graph: &mut Graph, y_pred: NodeId, y: &Targets) -> Result<NodeId>;
}
