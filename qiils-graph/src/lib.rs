mod error;
pub use error::*;
mod graph;
pub use graph::*;
pub mod generation;
pub mod loading;
pub mod objective;
pub mod solution;

pub use objective::Spin;
pub use solution::Solution;
