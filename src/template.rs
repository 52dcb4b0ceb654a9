//! Template configuration and the substitution entry point.

use std::any::TypeId;
use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::debug;

use crate::error::{Error, Result};
use crate::indent;
use crate::loader::FileTemplate;
use crate::rendered::Rendered;
use crate::value::{Primitive, Value};

/// A registered rendering function for a non-primitive type.
///
/// Handlers receive the template they were registered on, so they can
/// consult its configuration while rendering.
pub type TypeHandler = Box<dyn Fn(&Template, &Value) -> Value>;

/// A named template "tag": indent configuration plus substitution rules and
/// type handlers.
///
/// A template is configuration only; rendering never mutates it. A
/// [`Rendered`] result borrows the template it came from, so configuration
/// cannot change while an outstanding result may still resolve its values.
pub struct Template {
    name: String,
    indent: String,
    rules: IndexMap<Primitive, String>,
    handlers: IndexMap<TypeId, TypeHandler>,
}

impl Template {
    /// Creates a template with the default indent characters, tab and
    /// space.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::MissingName);
        }
        Ok(Self {
            name,
            indent: "\t ".to_string(),
            rules: IndexMap::new(),
            handlers: IndexMap::new(),
        })
    }

    /// The identifying label set at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The characters eligible to form the common indent prefix.
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Replaces the indent character set.
    ///
    /// The characters form a literal set, not a pattern. An empty set
    /// disables indentation stripping entirely.
    pub fn set_indent(&mut self, indent: impl Into<String>) {
        self.indent = indent.into();
    }

    /// Registers an exact-match substitution rule for a primitive value.
    ///
    /// Re-registering the same value overwrites the previous display
    /// string. Objects and dates are not primitives and are rejected,
    /// leaving the existing rules untouched.
    pub fn rule(&mut self, value: impl Into<Value>, display: impl Into<String>) -> Result<()> {
        let key = Primitive::try_from(&value.into())?;
        self.rules.insert(key, display.into());
        Ok(())
    }

    /// Registers a rendering handler for the type `T`.
    ///
    /// Dispatch walks an object value's declared type chain from most to
    /// least specific, so a handler for a more derived type wins over one
    /// for its ancestor. Re-registering the same type overwrites the
    /// previous handler. Handlers for `DateTime<Utc>` apply to date values.
    pub fn on_type<T: 'static>(
        &mut self,
        handler: impl Fn(&Template, &Value) -> Value + 'static,
    ) {
        self.handlers.insert(TypeId::of::<T>(), Box::new(handler));
    }

    /// Renders a segments/values pair into a frozen result.
    ///
    /// `segments` must be exactly one longer than `values`; segment `i`
    /// precedes value `i` precedes segment `i + 1`. Value resolution is
    /// lazy: it happens on first stringification of the result.
    pub fn render<S: AsRef<str>>(
        &self,
        segments: &[S],
        values: Vec<Value>,
    ) -> Result<Rendered<'_>> {
        if segments.len() != values.len() + 1 {
            return Err(Error::Arity { segments: segments.len(), values: values.len() });
        }

        debug!("rendering '{}' with {} values", self.name, values.len());

        let segments = indent::normalize(segments, &self.indent);
        Ok(Rendered::new(self, segments, values))
    }

    /// Resolves a single value to its display string.
    ///
    /// Object values walk the type chain for a registered handler;
    /// primitive values consult the exact-match rules. Without a match the
    /// value falls through to its default string form.
    pub fn resolve(&self, value: &Value) -> String {
        match value {
            Value::Object(object) => {
                for tag in object.type_chain() {
                    if let Some(handler) = self.handlers.get(&tag) {
                        return self.stringify(&handler(self, value));
                    }
                }
                self.stringify(value)
            }
            Value::Date(_) => {
                if let Some(handler) = self.handlers.get(&TypeId::of::<DateTime<Utc>>()) {
                    return self.stringify(&handler(self, value));
                }
                value.to_string()
            }
            primitive => {
                // The remaining variants all unwrap to themselves.
                let key = primitive.unwrap();
                match self.rules.get(&key) {
                    Some(display) => display.clone(),
                    None => value.to_string(),
                }
            }
        }
    }

    /// Loads a file-backed template.
    ///
    /// The file is read synchronously and its placeholders are scanned up
    /// front, so a malformed placeholder fails here rather than at
    /// invocation time.
    pub fn file(&self, path: impl AsRef<Path>) -> Result<FileTemplate<'_>> {
        FileTemplate::load(self, path.as_ref())
    }

    /// The final string form of a resolution, honoring an object's
    /// primitive-conversion hook over its default display.
    fn stringify(&self, value: &Value) -> String {
        match value {
            Value::Object(object) => {
                object.to_primitive().unwrap_or_else(|| object.to_string())
            }
            other => other.to_string(),
        }
    }
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("indent", &self.indent)
            .field("rules", &self.rules.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
