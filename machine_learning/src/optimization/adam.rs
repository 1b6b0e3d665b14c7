use ndarray::{Array2, Zip};

use super::{Optimizer, optimizer::ensure_state};
use crate::{
    Result,
    params::{GradSet, ParamSet},
};

#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    beta1_t: f64,
    beta2_t: f64,
    v: Vec<Array2<f64>>,
    s: Vec<Array2<f64>>,
    epsilon: f64,
}

impl Adam {
    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the optimization algorithm.
    ///
    /// # Returns
    /// A new `Adam` instance, its moments are sized on the first step.
    pub fn new(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            beta1_t: 1.,
            beta2_t: 1.,
            v: Vec::new(),
            s: Vec::new(),
            epsilon,
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut ParamSet, grads: &GradSet) -> Result<()> {
        ensure_state(&mut self.v, params);
        ensure_state(&mut self.s, params);

        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            ..
        } = *self;

        let beta1_t = self.beta1_t * b1;
        let beta2_t = self.beta2_t * b2;

        let bc1 = 1. - beta1_t;
        let bc2 = 1. - beta2_t;
        let step_size = lr * (bc2.sqrt() / bc1);

        let (vs, ss) = (&mut self.v, &mut self.s);

        params.update_with(grads, |i, mut p, g| {
            Zip::from(&mut p)
                .and(&g)
                .and(&mut vs[i])
                .and(&mut ss[i])
                .for_each(|p, &g, v, s| {
                    *v = b1 * *v + (1. - b1) * g;
                    *s = b2 * *s + (1. - b2) * g.powi(2);
                    *p -= step_size * *v / (s.sqrt() + eps);
                });
        })?;

        self.beta1_t = beta1_t;
        self.beta2_t = beta2_t;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::graph::Graph;

    #[test]
    fn first_step_moves_by_the_learning_rate() {
        let mut params = ParamSet::new();
        let w = params.add("w", array![[1.0, 1.0]]);

        let mut graph = Graph::new(&params, true);
        let a = graph.input(array![[3.0, -0.5]]);
        let p = graph.param(&params, w).unwrap();
        let prod = graph.mul(a, p).unwrap();
        let loss = graph.sum(prod).unwrap();
        let mut grads = GradSet::for_params(&params);
        graph.backward(loss, &mut grads).unwrap();

        Adam::new(0.1, 0.9, 0.999, 1e-8)
            .step(&mut params, &grads)
            .unwrap();

        // the bias corrected first step is lr * sign(g)
        let w = params.get(w).unwrap();
        assert!((w[[0, 0]] - 0.9).abs() < 1e-4);
        assert!((w[[0, 1]] - 1.1).abs() < 1e-4);
    }
}
