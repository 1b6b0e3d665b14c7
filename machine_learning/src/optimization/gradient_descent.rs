use super::Optimizer;
use crate::{
    Result,
    params::{GradSet, ParamSet},
};

/// Gradient descent optimization algorithm.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `step`.
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

impl Optimizer for GradientDescent {
    /// Updates the parameters according to the algorithm's learning rule, that is, making a step in
    /// the opposite direction of the gradient, with a length of `learning_rate`.
    ///
    /// # Arguments
    /// * `params` - The parameters that are going to be modified.
    /// * `grads` - The gradient used for taking the step.
    fn step(&mut self, params: &mut ParamSet, grads: &GradSet) -> Result<()> {
        let lr = self.learning_rate;

        params.update_with(grads, |_, mut p, g| {
            p.zip_mut_with(&g, |w, &g| *w -= lr * g);
        })
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::{MlErr, graph::Graph};

    fn grads_of_sum(params: &ParamSet) -> GradSet {
        let mut graph = Graph::new(params, true);
        let mut total = None;
        for (id, _, _) in params.iter() {
            let p = graph.param(params, id).unwrap();
            let s = graph.sum(p).unwrap();
            total = Some(match total {
                Some(t) => graph.add(t, s).unwrap(),
                None => s,
            });
        }

        let mut grads = GradSet::for_params(params);
        graph.backward(total.unwrap(), &mut grads).unwrap();
        grads
    }

    #[test]
    fn steps_against_the_gradient() {
        let mut params = ParamSet::new();
        let w = params.add("w", array![[1.0, -2.0]]);
        let grads = grads_of_sum(&params);

        GradientDescent::new(0.5).step(&mut params, &grads).unwrap();
        assert_eq!(params.get(w).unwrap(), array![[0.5, -2.5]]);
    }

    #[test]
    fn the_same_gradient_cannot_be_applied_twice() {
        let mut params = ParamSet::new();
        let w = params.add("w", array![[1.0]]);
        let grads = grads_of_sum(&params);
        let mut optimizer = GradientDescent::new(0.5);

        optimizer.step(&mut params, &grads).unwrap();
        assert!(matches!(
            optimizer.step(&mut params, &grads),
            Err(MlErr::StaleGradient { .. })
        ));
        assert_eq!(params.get(w).unwrap(), array![[0.5]]);
    }
}
