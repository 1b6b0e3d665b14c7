use rand::Rng;

use crate::{
    Result,
    arch::activations::ActFn,
    graph::{Graph, NodeId},
    initialization::ParamGen,
    params::{ParamId, ParamSet, check_shape},
};

/// A fully connected layer: `act_fn(x · W + b)`.
///
/// The layer doesn't hold its weights, only the ids of its parameters inside the model's
/// `ParamSet`. `W` has shape `(n_in, n_out)` and `b` has shape `(1, n_out)`.
#[derive(Debug, Clone)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    weights: ParamId,
    biases: ParamId,
}

impl Dense {
    /// Creates a new `Dense` layer from parameters that were already registered.
    ///
    /// # Arguments
    /// * `dim` - The input and output dimensions of the layer.
    /// * `act_fn` - An optional activation applied to the output.
    /// * `weights` - The id of the `(n_in, n_out)` weight matrix.
    /// * `biases` - The id of the `(1, n_out)` bias row.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>, weights: ParamId, biases: ParamId) -> Self {
        Self {
            dim,
            act_fn,
            weights,
            biases,
        }
    }

    /// Registers the layer's parameters into `params` and creates the layer.
    ///
    /// The weights are drawn from `init`, the biases start at zero.
    ///
    /// # Arguments
    /// * `params` - The parameter set of the model.
    /// * `name` - The prefix used to name the parameters.
    /// * `dim` - The input and output dimensions of the layer.
    /// * `act_fn` - An optional activation applied to the output.
    /// * `init` - The weight initialization strategy.
    /// * `rng` - A random number generator.
    ///
    /// # Returns
    /// The new layer, or an error if the initializer is invalid.
    pub fn register<R: Rng + ?Sized>(
        params: &mut ParamSet,
        name: &str,
        dim: (usize, usize),
        act_fn: Option<ActFn>,
        init: ParamGen,
        rng: &mut R,
    ) -> Result<Self> {
        let w = init.generate(dim, rng)?;
        let b = ParamGen::Const { value: 0. }.generate((1, dim.1), rng)?;

        let weights = params.add(format!("{name}.weights"), w);
        let biases = params.add(format!("{name}.biases"), b);

        Ok(Self::new(dim, act_fn, weights, biases))
    }

    /// Returns the amount of scalar parameters this layer has.
    pub fn size(&self) -> usize {
        (self.dim.0 + 1) * self.dim.1
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    pub fn act_fn(&self) -> Option<ActFn> {
        self.act_fn
    }

    pub fn weights(&self) -> ParamId {
        self.weights
    }

    pub fn biases(&self) -> ParamId {
        self.biases
    }

    /// Checks that the layer's parameters exist in `params` with the expected shapes.
    pub fn validate(&self, params: &ParamSet) -> Result<()> {
        check_shape("dense weights", self.dim, params.get(self.weights)?.dim())?;
        check_shape("dense biases", (1, self.dim.1), params.get(self.biases)?.dim())
    }

    /// Records the layer's forward pass on the graph.
    ///
    /// # Arguments
    /// * `graph` - The graph being built.
    /// * `params` - The model's parameters.
    /// * `x` - The input node, of shape `(batch, n_in)`.
    ///
    /// # Returns
    /// The output node, of shape `(batch, n_out)`.
    pub fn forward(&self, graph: &mut Graph, params: &ParamSet, x: NodeId) -> Result<NodeId> {
        let w = graph.param(params, self.weights)?;
        let b = graph.param(params, self.biases)?;

        let z = graph.matmul(x, w)?;
        let z = graph.add_bias(z, b)?;

        match self.act_fn {
            Some(act_fn) => graph.activation(z, act_fn),
            None => Ok(z),
        }
    }
}
