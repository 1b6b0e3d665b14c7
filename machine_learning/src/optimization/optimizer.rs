use ndarray::Array2;

use crate::{
    Result,
    params::{GradSet, ParamSet},
};

/// An update rule: moves the parameters given their gradient.
pub trait Optimizer {
    /// Applies one update to `params`.
    ///
    /// # Arguments
    /// * `params` - The parameters to update, their generation is bumped.
    /// * `grads` - The gradient computed for the current generation of `params`.
    ///
    /// # Returns
    /// An error if `grads` is stale or doesn't mirror `params`, in which case no parameter
    /// is modified.
    fn step(&mut self, params: &mut ParamSet, grads: &GradSet) -> Result<()>;
}

/// Makes sure `state` holds one zeroed tensor per parameter, with the same shape.
///
/// State is kept as is while it still mirrors `params`.
pub(super) fn ensure_state(state: &mut Vec<Array2<f64>>, params: &ParamSet) {
    let mirrors = state.len() == params.len()
        && state.iter().zip(params.shapes()).all(|(s, dim)| s.dim() == dim);

    if !mirrors {
        *state = params.shapes().map(Array2::zeros).collect();
    }
}
