//! Report modules.

pub mod generator;
pub mod views;

pub use generator::*;
pub use views::*;
