use rand::Rng;

use super::{
    Sequential,
    activations::ActFn,
    layers::{Dense, Layer},
};
use crate::{MlErr, Result, initialization::ParamGen, params::ParamSet};

#[derive(Debug, Clone, Copy)]
enum LayerSpec {
    Dense {
        dim: (usize, usize),
        act_fn: Option<ActFn>,
        init: ParamGen,
    },
    Activation(ActFn),
}

/// Builds a `Sequential` model, registering every layer's parameters into a fresh `ParamSet`.
///
/// Parameters are named `dense_{i}.weights` and `dense_{i}.biases`, where `i` is the position
/// of the layer in the model.
#[derive(Debug, Clone, Default)]
pub struct SequentialBuilder {
    layers: Vec<LayerSpec>,
}

impl SequentialBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a dense layer.
    ///
    /// # Arguments
    /// * `dim` - The input and output dimensions of the layer.
    /// * `act_fn` - An optional activation applied to the layer's output.
    /// * `init` - How to generate the initial weights.
    pub fn dense(mut self, dim: (usize, usize), act_fn: Option<ActFn>, init: ParamGen) -> Self {
        self.layers.push(LayerSpec::Dense { dim, act_fn, init });
        self
    }

    /// Appends a standalone activation layer.
    pub fn activation(mut self, act_fn: ActFn) -> Self {
        self.layers.push(LayerSpec::Activation(act_fn));
        self
    }

    /// Generates the parameters and builds the model.
    ///
    /// # Returns
    /// The model, or an error if there are no layers, the dimensions of adjacent layers don't
    /// chain or an initializer is invalid.
    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Sequential> {
        if self.layers.is_empty() {
            return Err(MlErr::InvalidConfig("a model needs at least one layer".into()));
        }

        let mut params = ParamSet::new();
        let mut layers = Vec::with_capacity(self.layers.len());

        for (i, spec) in self.layers.into_iter().enumerate() {
            let layer = match spec {
                LayerSpec::Dense { dim, act_fn, init } => {
                    let name = format!("dense_{i}");
                    Layer::dense(Dense::register(&mut params, &name, dim, act_fn, init, rng)?)
                }
                LayerSpec::Activation(act_fn) => Layer::activation(act_fn),
            };

            layers.push(layer);
        }

        Sequential::new(layers, params)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::arch::Model;

    #[test]
    fn builds_named_parameters() {
        let mut rng = StdRng::seed_from_u64(3);
        let model = SequentialBuilder::new()
            .dense((2, 4), Some(ActFn::tanh()), ParamGen::XavierUniform)
            .dense((4, 1), None, ParamGen::Const { value: 0.1 })
            .build(&mut rng)
            .unwrap();

        let params = model.params();
        assert_eq!(params.len(), 4);
        assert_eq!(model.size(), params.num_scalars());
        assert_eq!((model.input_dim(), model.output_dim()), (2, 1));

        let biases = params.find("dense_0.biases").unwrap();
        assert!(params.get(biases).unwrap().iter().all(|&b| b == 0.));
        let weights = params.find("dense_1.weights").unwrap();
        assert_eq!(params.get(weights).unwrap().dim(), (4, 1));
    }

    #[test]
    fn rejects_layers_that_dont_chain() {
        let mut rng = StdRng::seed_from_u64(3);
        let result = SequentialBuilder::new()
            .dense((2, 4), None, ParamGen::Kaiming)
            .dense((3, 1), None, ParamGen::Kaiming)
            .build(&mut rng);

        assert!(matches!(result, Err(MlErr::ShapeMismatch { .. })));
    }

    #[test]
    fn rejects_empty_models() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            SequentialBuilder::new().build(&mut rng),
            Err(MlErr::InvalidConfig(_))
        ));
    }
}
