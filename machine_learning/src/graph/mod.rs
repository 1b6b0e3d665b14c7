mod arena;
mod backward;
mod node;

pub use arena::Graph;
pub(crate) use arena::argmax_rows;
pub use node::NodeId;
