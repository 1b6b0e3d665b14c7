pub mod arch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod initialization;
pub mod metrics;
pub mod optimization;
pub mod params;
pub mod report;
pub mod training;

pub use error::{MlErr, Result};
