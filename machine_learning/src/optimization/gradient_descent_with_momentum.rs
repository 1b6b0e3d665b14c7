use ndarray::Array2;

use super::{Optimizer, optimizer::ensure_state};
use crate::{
    Result,
    params::{GradSet, ParamSet},
};

/// Gradient descent with momentum, `v = μv + g` followed by `p -= lr * v`.
#[derive(Debug, Clone)]
pub struct GradientDescentWithMomentum {
    learning_rate: f64,
    momentum: f64,
    velocity: Vec<Array2<f64>>,
}

impl GradientDescentWithMomentum {
    /// Creates a new `GradientDescentWithMomentum` optimizer.
    ///
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `momentum` - Hyperparameter to the optimization algorithm.
    ///
    /// # Returns
    /// A new `GradientDescentWithMomentum` instance, its velocity is sized on the first step.
    pub fn new(learning_rate: f64, momentum: f64) -> Self {
        Self {
            learning_rate,
            momentum,
            velocity: Vec::new(),
        }
    }
}

impl Optimizer for GradientDescentWithMomentum {
    fn step(&mut self, params: &mut ParamSet, grads: &GradSet) -> Result<()> {
        ensure_state(&mut self.velocity, params);

        let lr = self.learning_rate;
        let mu = self.momentum;
        let velocity = &mut self.velocity;

        params.update_with(grads, |i, mut p, g| {
            let v = &mut velocity[i];
            v.zip_mut_with(&g, |v, &g| *v = mu * *v + g);
            p.zip_mut_with(&*v, |p, &v| *p -= lr * v);
        })
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::graph::Graph;

    #[test]
    fn velocity_builds_up() {
        let mut params = ParamSet::new();
        let w = params.add("w", array![[0.0]]);
        let mut optimizer = GradientDescentWithMomentum::new(1.0, 0.5);

        // the gradient of sum(w) is always 1
        for _ in 0..2 {
            let mut graph = Graph::new(&params, true);
            let p = graph.param(&params, w).unwrap();
            let loss = graph.sum(p).unwrap();
            let mut grads = GradSet::for_params(&params);
            graph.backward(loss, &mut grads).unwrap();
            optimizer.step(&mut params, &grads).unwrap();
        }

        // v1 = 1, v2 = 1.5
        assert_eq!(params.get(w).unwrap(), array![[-2.5]]);
    }
}
