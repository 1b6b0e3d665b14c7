use super::LossFn;
use crate::{
    MlErr, Result,
    dataset::Targets,
    graph::{Graph, NodeId},
};

/// Mean squared error loss function.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mse;

impl Mse {
    /// Returns a new `Mse`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for Mse {
    fn name(&self) -> &'static str {
        "mse"
    }

    fn loss(&self, graph: &mut Graph, y_pred: NodeId, y: &Targets) -> Result<NodeId> {
        let Targets::Values(y) = y else {
            return Err(MlErr::TargetMismatch {
                loss: self.name(),
                expected: "values",
            });
        };

        let y = graph.input(y.clone());
        graph.mse(y_pred, y)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::params::ParamSet;

    #[test]
    fn mean_of_squared_residuals() {
        let params = ParamSet::new();
        let mut graph = Graph::new(&params, true);
        let y_pred = graph.input(array![[1.0, 2.0], [3.0, 4.0]]);
        let y = Targets::Values(array![[0.0, 2.0], [1.0, 4.0]]);

        let loss = Mse::new().loss(&mut graph, y_pred, &y).unwrap();
        assert_eq!(graph.scalar(loss).unwrap(), (1. + 4.) / 4.);
    }

    #[test]
    fn refuses_class_targets() {
        let params = ParamSet::new();
        let mut graph = Graph::new(&params, true);
        let y_pred = graph.input(array![[1.0]]);

        assert!(matches!(
            Mse::new().loss(&mut graph, y_pred, &Targets::Classes(vec![0])),
            Err(MlErr::TargetMismatch { loss: "mse", .. })
        ));
    }
}
