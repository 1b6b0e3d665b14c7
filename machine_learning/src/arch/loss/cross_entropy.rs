use super::LossFn;
use crate::{
    MlErr, Result,
    dataset::Targets,
    graph::{Graph, NodeId},
};

/// Softmax cross-entropy over raw logits, against integer class targets.
///
/// The softmax is applied by the loss itself, so the model's last layer shouldn't have an
/// activation.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrossEntropy;

impl CrossEntropy {
    /// Returns a new `CrossEntropy`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for CrossEntropy {
    fn name(&self) -> &'static str {
        "cross_entropy"
    }

    fn loss(&self, graph: &mut Graph, y_pred: NodeId, y: &Targets) -> Result<NodeId> {
        let Targets::Classes(classes) = y else {
            return Err(MlErr::TargetMismatch {
                loss: self.name(),
                expected: "classes",
            });
        };

        graph.softmax_cross_entropy(y_pred, classes)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::params::ParamSet;

    #[test]
    fn confident_right_answers_cost_little() {
        let params = ParamSet::new();
        let mut graph = Graph::new(&params, true);
        let logits = graph.input(array![[10.0, -10.0], [-10.0, 10.0]]);

        let right = CrossEntropy::new()
            .loss(&mut graph, logits, &Targets::Classes(vec![0, 1]))
            .unwrap();
        let wrong = CrossEntropy::new()
            .loss(&mut graph, logits, &Targets::Classes(vec![1, 0]))
            .unwrap();

        let right = graph.scalar(right).unwrap();
        let wrong = graph.scalar(wrong).unwrap();
        assert!(right >= 0. && right < 1e-3);
        assert!(wrong > 19.);
    }

    #[test]
    fn refuses_value_targets() {
        let params = ParamSet::new();
        let mut graph = Graph::new(&params, true);
        let logits = graph.input(array![[1.0, 0.0]]);

        assert!(matches!(
            CrossEntropy::new().loss(&mut graph, logits, &Targets::Values(array![[1.0, 0.0]])),
            Err(MlErr::TargetMismatch {
                loss: "cross_entropy",
                expected: "classes"
            })
        ));
    }
}
