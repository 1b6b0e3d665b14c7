use ndarray::ArrayView2;

use super::{Forward, Model, layers::Layer};
use crate::{MlErr, Result, graph::Graph, params::ParamSet};

/// A sequential model: the output of each layer is the input of the next one.
#[derive(Debug, Clone)]
pub struct Sequential {
    layers: Vec<Layer>,
    params: ParamSet,
    input_dim: usize,
    output_dim: usize,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of, the first one must be dense.
    /// * `params` - The parameters the layers refer to.
    ///
    /// # Returns
    /// A new `Sequential` instance, or an error if the layers don't chain or their parameters
    /// are missing from `params`.
    pub fn new<I>(layers: I, params: ParamSet) -> Result<Self>
    where
        I: IntoIterator<Item = Layer>,
    {
        let layers: Vec<Layer> = layers.into_iter().collect();

        let input_dim = match layers.first() {
            Some(Layer::Dense(dense)) => dense.dim().0,
            Some(_) => {
                return Err(MlErr::InvalidConfig(
                    "the first layer of a sequential model must be dense".into(),
                ));
            }
            None => {
                return Err(MlErr::InvalidConfig(
                    "a sequential model needs at least one layer".into(),
                ));
            }
        };

        let mut dim = input_dim;
        for layer in &layers {
            if let Layer::Dense(dense) = layer {
                if dense.dim().0 != dim {
                    return Err(MlErr::ShapeMismatch {
                        what: "dense layer input",
                        got: dense.dim().0,
                        expected: dim,
                    });
                }
                dense.validate(&params)?;
            }
            dim = layer.output_dim(dim);
        }

        Ok(Self {
            layers,
            params,
            input_dim,
            output_dim: dim,
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns the amount of scalar parameters in the model.
    pub fn size(&self) -> usize {
        self.layers.iter().map(Layer::size).sum()
    }
}

impl Model for Sequential {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn output_dim(&self) -> usize {
        self.output_dim
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn forward(&self, x: ArrayView2<f64>, track_gradients: bool) -> Result<Forward> {
        if x.ncols() != self.input_dim {
            return Err(MlErr::ShapeMismatch {
                what: "input columns",
                got: x.ncols(),
                expected: self.input_dim,
            });
        }

        let mut graph = Graph::new(&self.params, track_gradients);
        let mut out = graph.input(x.to_owned());

        for layer in &self.layers {
            out = layer.forward(&mut graph, &self.params, out)?;
        }

        Ok(Forward::new(graph, out))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::{arch::activations::ActFn, arch::layers::Dense};

    fn linear(w: f64, b: f64) -> Sequential {
        let mut params = ParamSet::new();
        let weights = params.add("w", array![[w]]);
        let biases = params.add("b", array![[b]]);
        let dense = Dense::new((1, 1), None, weights, biases);
        Sequential::new([Layer::dense(dense)], params).unwrap()
    }

    #[test]
    fn forward_computes_affine_function() {
        let model = linear(2., 1.);
        let y = model.predict(array![[1.0], [3.0]].view()).unwrap();
        assert_eq!(y, array![[3.0], [7.0]]);
    }

    #[test]
    fn forward_rejects_wrong_input_width() {
        let model = linear(2., 1.);
        let err = model.forward(array![[1.0, 2.0]].view(), true).unwrap_err();
        assert!(matches!(
            err,
            MlErr::ShapeMismatch {
                what: "input columns",
                got: 2,
                expected: 1
            }
        ));
    }

    #[test]
    fn layers_must_chain() {
        let mut params = ParamSet::new();
        let w0 = params.add("w0", ndarray::Array2::zeros((2, 3)));
        let b0 = params.add("b0", ndarray::Array2::zeros((1, 3)));
        let w1 = params.add("w1", ndarray::Array2::zeros((2, 1)));
        let b1 = params.add("b1", ndarray::Array2::zeros((1, 1)));

        let layers = [
            Layer::dense(Dense::new((2, 3), None, w0, b0)),
            Layer::activation(ActFn::relu()),
            Layer::dense(Dense::new((2, 1), None, w1, b1)),
        ];

        assert!(matches!(
            Sequential::new(layers, params),
            Err(MlErr::ShapeMismatch {
                what: "dense layer input",
                got: 2,
                expected: 3
            })
        ));
    }

    #[test]
    fn first_layer_must_be_dense() {
        let layers = [Layer::activation(ActFn::tanh())];
        assert!(matches!(
            Sequential::new(layers, ParamSet::new()),
            Err(MlErr::InvalidConfig(_))
        ));
    }
}
