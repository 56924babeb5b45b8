//! Row types returned by the store and request payloads accepted by it.

mod developer;
mod project;
mod technology;

pub use developer::*;
pub use project::*;
pub use technology::*;
