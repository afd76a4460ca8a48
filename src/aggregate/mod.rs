//! Aggregation modules.

pub mod engine;

pub use engine::*;
