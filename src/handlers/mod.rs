//! HTTP handlers: guard chain, validation, one store call, response shaping.

pub mod developers;
pub mod projects;
pub use developers::*;
pub use projects::*;
