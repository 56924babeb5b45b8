//! Safe SQL composition: identifiers from the column catalogue only, values as bound parameters.

mod builder;
pub mod params;
pub mod tables;
pub use builder::*;
pub use params::*;
pub use tables::*;
