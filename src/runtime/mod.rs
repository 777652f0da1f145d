//! Execution: values, the variable store, and the tree-walking evaluator

pub mod environment;
pub mod evaluator;
pub mod value;

pub use environment::{Environment, DEFAULT_CAPACITY};
pub use evaluator::Evaluator;
pub use value::Value;
