use ndarray::{Array2, ArrayView2};

use super::{ParamId, ParamSet, param_set::check_shape};
use crate::{MlErr, Result};

/// The derivative of the loss with respect to each parameter of a `ParamSet`.
///
/// It mirrors the shapes of the set it was created for. Backward passes *sum* into it, so
/// it has to be zeroed before every step.
#[derive(Debug, Clone, Default)]
pub struct GradSet {
    values: Vec<Array2<f64>>,
    generation: Option<u64>,
}

impl GradSet {
    /// Creates a zeroed gradient mirroring the shapes of `params`.
    pub fn for_params(params: &ParamSet) -> Self {
        Self {
            values: params.shapes().map(Array2::zeros).collect(),
            generation: None,
        }
    }

    /// Clears every gradient and forgets which parameters it was computed for.
    pub fn zero(&mut self) {
        for value in &mut self.values {
            value.fill(0.);
        }
        self.generation = None;
    }

    /// Returns the gradient of the parameter with the given id.
    pub fn get(&self, id: ParamId) -> Result<ArrayView2<'_, f64>> {
        self.values
            .get(id.0)
            .map(|v| v.view())
            .ok_or(MlErr::UnknownParam {
                id: id.0,
                len: self.values.len(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = ArrayView2<'_, f64>> {
        self.values.iter().map(|v| v.view())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The parameter generation these gradients were computed for, `None` if zeroed.
    pub fn generation(&self) -> Option<u64> {
        self.generation
    }

    /// The euclidean norm of the whole gradient.
    pub fn norm(&self) -> f64 {
        self.values
            .iter()
            .flat_map(|v| v.iter())
            .map(|g| g * g)
            .sum::<f64>()
            .sqrt()
    }

    /// Marks the gradient as being accumulated for parameter generation `generation`.
    ///
    /// # Returns
    /// An error if it already holds gradients of another generation.
    pub(crate) fn claim(&mut self, generation: u64) -> Result<()> {
        match self.generation {
            Some(current) if current != generation => Err(MlErr::StaleGradient {
                expected: generation,
                got: Some(current),
            }),
            _ => {
                self.generation = Some(generation);
                Ok(())
            }
        }
    }

    /// Sums `delta` into the gradient of parameter `id`.
    pub(crate) fn accumulate(&mut self, id: ParamId, delta: &Array2<f64>) -> Result<()> {
        let len = self.values.len();
        let grad = self
            .values
            .get_mut(id.0)
            .ok_or(MlErr::UnknownParam { id: id.0, len })?;

        check_shape("gradient", grad.dim(), delta.dim())?;
        *grad += delta;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn mirrors_param_shapes() {
        let mut params = ParamSet::new();
        params.add("w", Array2::ones((3, 2)));
        params.add("b", Array2::ones((1, 2)));

        let grads = GradSet::for_params(&params);
        let shapes: Vec<_> = grads.iter().map(|g| g.dim()).collect();
        assert_eq!(shapes, [(3, 2), (1, 2)]);
        assert_eq!(grads.norm(), 0.);
    }

    #[test]
    fn accumulate_then_zero() {
        let mut params = ParamSet::new();
        let w = params.add("w", array![[0.0, 0.0]]);
        let mut grads = GradSet::for_params(&params);

        grads.claim(params.generation()).unwrap();
        grads.accumulate(w, &array![[1.0, 2.0]]).unwrap();
        grads.accumulate(w, &array![[1.0, 2.0]]).unwrap();
        assert_eq!(grads.get(w).unwrap(), array![[2.0, 4.0]]);

        grads.zero();
        assert_eq!(grads.get(w).unwrap(), array![[0.0, 0.0]]);
        assert_eq!(grads.generation(), None);
    }

    #[test]
    fn claim_refuses_mixing_generations() {
        let mut grads = GradSet::default();
        grads.claim(1).unwrap();
        grads.claim(1).unwrap();
        assert!(matches!(
            grads.claim(2),
            Err(MlErr::StaleGradient {
                expected: 2,
                got: Some(1)
            })
        ));
    }

    #[test]
    fn accumulate_checks_shapes() {
        let mut params = ParamSet::new();
        let w = params.add("w", array![[0.0, 0.0]]);
        let mut grads = GradSet::for_params(&params);

        let err = grads.accumulate(w, &array![[1.0]]).unwrap_err();
        assert!(matches!(err, MlErr::ShapeMismatch { .. }));
    }
}
