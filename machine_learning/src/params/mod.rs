mod grad_set;
mod param_set;

pub use grad_set::GradSet;
pub(crate) use param_set::check_shape;
pub use param_set::{ParamId, ParamSet};
