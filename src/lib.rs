/// Defines custom error types.
pub mod error;

/// Common-indent detection and stripping.
pub mod indent;

/// File-backed templates with named placeholder lookup.
pub mod loader;

/// The frozen result of a template invocation.
pub mod rendered;

/// Template configuration and substitution.
pub mod template;

/// Placeholder value model and primitive unwrapping.
pub mod value;

pub use error::{Error, Result};
pub use loader::FileTemplate;
pub use rendered::{Entries, Entry, Rendered};
pub use template::{Template, TypeHandler};
pub use value::{JsonObject, ObjectValue, Primitive, Value};
