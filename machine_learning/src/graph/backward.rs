use ndarray::{Array2, Axis};

use super::{
    Graph,
    node::{NodeId, Op},
};
use crate::{
    MlErr, Result,
    params::{GradSet, check_shape},
};

impl Graph {
    /// Computes the gradient of `loss` with respect to every parameter read by the graph.
    ///
    /// The operations are visited in reverse topological order, each one applying its local
    /// derivative rule to the gradient flowing from its consumers. Parameter gradients are
    /// *summed* into `grads`, calling this twice without zeroing `grads` in between doubles
    /// them.
    ///
    /// # Arguments
    /// * `loss` - A `1 x 1` node.
    /// * `grads` - The gradient buffer, it must mirror the graph's parameters.
    ///
    /// # Returns
    /// An error if the graph didn't track gradients, `loss` isn't a scalar or `grads` holds
    /// gradients of another parameter generation.
    pub fn backward(&self, loss: NodeId, grads: &mut GradSet) -> Result<()> {
        if !self.track_gradients {
            return Err(MlErr::GradientsNotTracked);
        }

        check_shape("loss", (1, 1), self.node(loss)?.value.dim())?;
        grads.claim(self.generation)?;

        let mut adjoints: Vec<Option<Array2<f64>>> = vec![None; loss.0 + 1];
        adjoints[loss.0] = Some(Array2::ones((1, 1)));

        for i in (0..=loss.0).rev() {
            let Some(d) = adjoints[i].take() else {
                continue;
            };

            self.propagate(i, d, &mut adjoints, grads)?;
        }

        Ok(())
    }

    /// Applies the local derivative rule of node `i` given its upstream gradient `d`.
    fn propagate(
        &self,
        i: usize,
        d: Array2<f64>,
        adjoints: &mut [Option<Array2<f64>>],
        grads: &mut GradSet,
    ) -> Result<()> {
        let value = |id: NodeId| &self.nodes[id.0].value;

        match &self.nodes[i].op {
            Op::Input => {}
            Op::Param(p) => grads.accumulate(*p, &d)?,
            Op::MatMul(a, b) => {
                let da = d.dot(&value(*b).t());
                let db = value(*a).t().dot(&d);
                accumulate(adjoints, *a, da);
                accumulate(adjoints, *b, db);
            }
            Op::AddBias(x, b) => {
                let db = d.sum_axis(Axis(0)).insert_axis(Axis(0));
                accumulate(adjoints, *b, db);
                accumulate(adjoints, *x, d);
            }
            Op::Add(a, b) => {
                accumulate(adjoints, *a, d.clone());
                accumulate(adjoints, *b, d);
            }
            Op::Sub(a, b) => {
                accumulate(adjoints, *b, d.mapv(|v| -v));
                accumulate(adjoints, *a, d);
            }
            Op::Mul(a, b) => {
                let da = &d * value(*b);
                let db = &d * value(*a);
                accumulate(adjoints, *a, da);
                accumulate(adjoints, *b, db);
            }
            Op::Scale(a, k) => accumulate(adjoints, *a, d * *k),
            Op::Activation(a, act_fn) => {
                let mut da = d;
                da.zip_mut_with(value(*a), |d, &z| *d *= act_fn.df(z));
                accumulate(adjoints, *a, da);
            }
            Op::Sum(a) => {
                let da = Array2::from_elem(value(*a).dim(), d[[0, 0]]);
                accumulate(adjoints, *a, da);
            }
            Op::Mse(y_pred, y) => {
                let diff = value(*y_pred) - value(*y);
                let scale = d[[0, 0]] * 2. / diff.len().max(1) as f64;
                let d_pred = diff * scale;
                accumulate(adjoints, *y, d_pred.mapv(|v| -v));
                accumulate(adjoints, *y_pred, d_pred);
            }
            Op::SoftmaxCrossEntropy {
                logits,
                classes,
                probs,
            } => {
                let mut d_logits = probs.clone();
                for (mut row, &class) in d_logits.rows_mut().into_iter().zip(classes) {
                    row[class] -= 1.;
                }
                d_logits *= d[[0, 0]] / classes.len().max(1) as f64;
                accumulate(adjoints, *logits, d_logits);
            }
        }

        Ok(())
    }
}

fn accumulate(adjoints: &mut [Option<Array2<f64>>], id: NodeId, delta: Array2<f64>) {
    match adjoints[id.0].as_mut() {
        Some(acc) => *acc += &delta,
        None => adjoints[id.0] = Some(delta),
    }
}
