use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::{Array2, ArrayView2, ArrayViewMut2};

use super::GradSet;
use crate::{MlErr, Result};

/// Identifies a parameter tensor inside a `ParamSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub(crate) usize);

impl ParamId {
    /// Returns the position of the parameter inside its set.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An ordered collection of named parameter tensors (weights and biases).
///
/// Every mutation stamps the set with a new *generation*, a gradient computed against any
/// other generation can't be applied to it anymore. Stamps are unique across every set in
/// the process, clones included.
#[derive(Debug)]
pub struct ParamSet {
    names: Vec<String>,
    values: Vec<Array2<f64>>,
    generation: u64,
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

impl Default for ParamSet {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            values: Vec::new(),
            generation: next_generation(),
        }
    }
}

impl Clone for ParamSet {
    fn clone(&self) -> Self {
        Self {
            names: self.names.clone(),
            values: self.values.clone(),
            generation: next_generation(),
        }
    }
}

impl ParamSet {
    /// Creates a new empty `ParamSet`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new parameter tensor.
    ///
    /// # Arguments
    /// * `name` - A human readable name, e.g. `dense_0.weights`.
    /// * `value` - The initial value of the parameter.
    ///
    /// # Returns
    /// The id of the new parameter.
    pub fn add<S: Into<String>>(&mut self, name: S, value: Array2<f64>) -> ParamId {
        let id = ParamId(self.values.len());
        self.names.push(name.into());
        self.values.push(value);
        self.generation = next_generation();
        id
    }

    /// Returns the parameter tensor with the given id.
    pub fn get(&self, id: ParamId) -> Result<ArrayView2<'_, f64>> {
        self.values
            .get(id.0)
            .map(|v| v.view())
            .ok_or(MlErr::UnknownParam {
                id: id.0,
                len: self.values.len(),
            })
    }

    /// Returns the name of the parameter with the given id.
    pub fn name(&self, id: ParamId) -> Option<&str> {
        self.names.get(id.0).map(String::as_str)
    }

    /// Looks a parameter up by name.
    pub fn find(&self, name: &str) -> Option<ParamId> {
        self.names.iter().position(|n| n == name).map(ParamId)
    }

    /// Overwrites the value of a parameter.
    ///
    /// # Arguments
    /// * `id` - The parameter to overwrite.
    /// * `value` - The new value, it must have the same shape as the current one.
    ///
    /// # Returns
    /// An error if the id is unknown or the shapes differ.
    pub fn assign(&mut self, id: ParamId, value: Array2<f64>) -> Result<()> {
        let len = self.values.len();
        let current = self
            .values
            .get_mut(id.0)
            .ok_or(MlErr::UnknownParam { id: id.0, len })?;

        check_shape("assigned parameter", current.dim(), value.dim())?;

        *current = value;
        self.generation = next_generation();
        Ok(())
    }

    /// Iterates over `(id, name, value)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ParamId, &str, ArrayView2<'_, f64>)> {
        self.names
            .iter()
            .zip(&self.values)
            .enumerate()
            .map(|(i, (name, value))| (ParamId(i), name.as_str(), value.view()))
    }

    /// Returns the amount of parameter tensors.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the total amount of scalars held across every tensor.
    pub fn num_scalars(&self) -> usize {
        self.values.iter().map(Array2::len).sum()
    }

    /// Returns the shapes of every tensor, in order.
    pub fn shapes(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.values.iter().map(Array2::dim)
    }

    /// Flattens every tensor, in order, into a single buffer.
    pub fn to_vec(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(self.num_scalars());
        for value in &self.values {
            flat.extend(value.iter());
        }
        flat
    }

    /// Returns the current generation of the parameters.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Applies an update rule to every parameter.
    ///
    /// This is the only place where the optimizers mutate the parameters. Before touching
    /// anything it checks that `grads` was computed for this exact generation of the
    /// parameters and that both sets have the same shapes, so a failed check leaves every
    /// parameter untouched.
    ///
    /// # Arguments
    /// * `grads` - The gradient computed during the last backward pass.
    /// * `f` - The per parameter update, receives the index, the parameter and its gradient.
    ///
    /// # Returns
    /// An error if the gradient is stale or its shapes don't mirror the parameters.
    pub fn update_with<F>(&mut self, grads: &GradSet, mut f: F) -> Result<()>
    where
        F: FnMut(usize, ArrayViewMut2<f64>, ArrayView2<f64>),
    {
        if grads.generation() != Some(self.generation) {
            return Err(MlErr::StaleGradient {
                expected: self.generation,
                got: grads.generation(),
            });
        }

        if grads.len() != self.values.len() {
            return Err(MlErr::ShapeMismatch {
                what: "gradient tensors",
                got: grads.len(),
                expected: self.values.len(),
            });
        }

        for (value, grad) in self.values.iter().zip(grads.iter()) {
            check_shape("gradient", value.dim(), grad.dim())?;
        }

        for (i, (value, grad)) in self.values.iter_mut().zip(grads.iter()).enumerate() {
            f(i, value.view_mut(), grad);
        }

        self.generation = next_generation();
        Ok(())
    }
}

/// Compares two 2d shapes, reporting the first differing axis.
pub(crate) fn check_shape(
    what: &'static str,
    expected: (usize, usize),
    got: (usize, usize),
) -> Result<()> {
    if expected.0 != got.0 {
        return Err(MlErr::ShapeMismatch {
            what,
            got: got.0,
            expected: expected.0,
        });
    }

    if expected.1 != got.1 {
        return Err(MlErr::ShapeMismatch {
            what,
            got: got.1,
            expected: expected.1,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn add_and_lookup() {
        let mut params = ParamSet::new();
        let w = params.add("w", array![[1.0, 2.0]]);
        let b = params.add("b", array![[3.0]]);

        assert_eq!(params.len(), 2);
        assert_eq!(params.num_scalars(), 3);
        assert_eq!(params.find("b"), Some(b));
        assert_eq!(params.name(w), Some("w"));
        assert_eq!(params.to_vec(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn assign_rejects_other_shapes() {
        let mut params = ParamSet::new();
        let w = params.add("w", array![[1.0, 2.0]]);
        let generation = params.generation();

        let err = params.assign(w, array![[1.0], [2.0]]).unwrap_err();
        assert!(matches!(err, MlErr::ShapeMismatch { .. }));
        assert_eq!(params.generation(), generation);

        params.assign(w, array![[5.0, 6.0]]).unwrap();
        assert_eq!(params.get(w).unwrap(), array![[5.0, 6.0]]);
        assert!(params.generation() > generation);
    }

    #[test]
    fn unknown_param_is_an_error() {
        let params = ParamSet::new();
        assert!(matches!(
            params.get(ParamId(3)),
            Err(MlErr::UnknownParam { id: 3, len: 0 })
        ));
    }

    #[test]
    fn update_with_requires_fresh_gradients() {
        let mut params = ParamSet::new();
        params.add("w", array![[1.0]]);
        let grads = GradSet::for_params(&params);

        let err = params.update_with(&grads, |_, _, _| {}).unwrap_err();
        assert!(matches!(err, MlErr::StaleGradient { got: None, .. }));
        assert_eq!(params.to_vec(), [1.0]);
    }

    #[test]
    fn gradients_of_another_set_are_stale() {
        let mut a = ParamSet::new();
        a.add("w", array![[2.0]]);
        let mut b = ParamSet::new();
        b.add("w", array![[-100.0]]);
        assert_ne!(a.generation(), b.generation());

        let mut grads_b = GradSet::for_params(&b);
        grads_b.claim(b.generation()).unwrap();
        grads_b.accumulate(ParamId(0), &array![[1.0]]).unwrap();

        let err = a.update_with(&grads_b, |_, mut p, g| p -= &g).unwrap_err();
        assert!(matches!(err, MlErr::StaleGradient { .. }));
        assert_eq!(a.to_vec(), [2.0]);
    }

    #[test]
    fn clones_get_their_own_generation() {
        let mut params = ParamSet::new();
        params.add("w", array![[1.0]]);
        let mut grads = GradSet::for_params(&params);
        grads.claim(params.generation()).unwrap();

        let mut copy = params.clone();
        assert_ne!(copy.generation(), params.generation());
        assert!(matches!(
            copy.update_with(&grads, |_, _, _| {}),
            Err(MlErr::StaleGradient { .. })
        ));
        params.update_with(&grads, |_, _, _| {}).unwrap();
    }
}
