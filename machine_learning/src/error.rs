use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    /// A shape invariant was violated (e.g. an input batch with the wrong amount of columns).
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// The gradients were computed for a different version of the parameters.
    StaleGradient {
        expected: u64,
        got: Option<u64>,
    },
    NonFiniteLoss {
        step: usize,
        loss: f64,
    },
    GradientsNotTracked,
    UnknownNode {
        id: usize,
        len: usize,
    },
    UnknownParam {
        id: usize,
        len: usize,
    },
    TargetMismatch {
        loss: &'static str,
        expected: &'static str,
    },
    InvalidClass {
        class: usize,
        classes: usize,
    },
    EmptyDataset,
    TrainerDone,
    InvalidDistribution(String),
    InvalidConfig(String),
    Json(serde_json::Error),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(f, "shape mismatch for {what}: got {got}, expected {expected}"),
            MlErr::StaleGradient {
                expected,
                got: Some(got),
            } => write!(
                f,
                "stale gradient: computed for parameter generation {got}, parameters are at generation {expected}"
            ),
            MlErr::StaleGradient {
                expected,
                got: None,
            } => write!(
                f,
                "stale gradient: no backward pass ran for parameter generation {expected}"
            ),
            MlErr::NonFiniteLoss { step, loss } => {
                write!(f, "the loss diverged at step {step}: got {loss}")
            }
            MlErr::GradientsNotTracked => {
                write!(f, "backward called on a graph built without gradient tracking")
            }
            MlErr::UnknownNode { id, len } => {
                write!(f, "node {id} does not exist, the graph has {len} nodes")
            }
            MlErr::UnknownParam { id, len } => {
                write!(f, "parameter {id} does not exist, the set has {len} parameters")
            }
            MlErr::TargetMismatch { loss, expected } => {
                write!(f, "the {loss} loss expects {expected} targets")
            }
            MlErr::InvalidClass { class, classes } => {
                write!(f, "class {class} is out of range for {classes} outputs")
            }
            MlErr::EmptyDataset => write!(f, "the dataset has no samples"),
            MlErr::TrainerDone => write!(f, "the trainer already finished its epochs"),
            MlErr::InvalidDistribution(msg) => write!(f, "invalid distribution: {msg}"),
            MlErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            MlErr::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<MlErr> for io::Error {
    fn from(value: MlErr) -> Self {
        match value {
            MlErr::InvalidConfig(_) | MlErr::Json(_) => {
                io::Error::new(io::ErrorKind::InvalidInput, value)
            }
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
