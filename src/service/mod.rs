//! Request validation and guard chains shared by the handlers.

mod guard;
mod validation;
pub use guard::*;
pub use validation::{is_truthy, text_field, Body, FieldMap, RequestValidator};
