//! Placeholder value model.
//!
//! Placeholder values form a closed variant decided at the producer
//! boundary: the primitive kinds, a date, or a generic object carrying its
//! own type chain for handler dispatch. This replaces any runtime probing
//! of what a value "really" is.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use chrono::{DateTime, Utc};

/// A non-primitive placeholder value.
///
/// Implementors declare their own type chain, most derived first, which is
/// what type-handler dispatch walks. The `Display` impl is the default
/// string form used when no handler matches.
pub trait ObjectValue: fmt::Display {
    /// Type tags from most to least specific, used for handler lookup.
    fn type_chain(&self) -> Vec<TypeId>;

    /// Downcasting support for handlers that need the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Custom primitive-conversion hook. When present it wins over the
    /// `Display` impl at stringification time.
    fn to_primitive(&self) -> Option<String> {
        None
    }
}

/// A value interpolated into a template.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(DateTime<Utc>),
    Object(Rc<dyn ObjectValue>),
}

impl Value {
    /// Wraps a non-primitive value.
    pub fn object(value: impl ObjectValue + 'static) -> Self {
        Value::Object(Rc::new(value))
    }

    /// Extracts the underlying primitive form of this value.
    ///
    /// Primitives pass through unchanged; a date yields its
    /// locale-independent string form; a generic object falls back to its
    /// primitive-conversion hook or default string form.
    pub fn unwrap(&self) -> Primitive {
        match self {
            Value::Null => Primitive::Null,
            Value::Bool(b) => Primitive::Bool(*b),
            Value::Int(n) => Primitive::Int(*n),
            Value::Float(f) => Primitive::Float(*f),
            Value::Str(s) => Primitive::Str(s.clone()),
            Value::Date(d) => Primitive::Str(d.to_string()),
            Value::Object(o) => {
                Primitive::Str(o.to_primitive().unwrap_or_else(|| o.to_string()))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Object(o) => write!(f, "{o}"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Date(d) => write!(f, "Date({d})"),
            Value::Object(o) => write!(f, "Object({o})"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

/// A JSON value carried across the file-template boundary.
///
/// Arrays and objects from a lookup scope land here; scalars convert to the
/// matching `Value` variants instead.
pub struct JsonObject(pub serde_json::Value);

impl fmt::Display for JsonObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ObjectValue for JsonObject {
    fn type_chain(&self) -> Vec<TypeId> {
        vec![TypeId::of::<JsonObject>()]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            composite => Value::object(JsonObject(composite)),
        }
    }
}

/// The primitive kinds a substitution rule may be keyed on.
#[derive(Debug, Clone)]
pub enum Primitive {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Float keys use SameValueZero semantics: every NaN is the same key and
/// negative zero equals positive zero.
fn canonical_bits(value: f64) -> u64 {
    if value.is_nan() {
        f64::NAN.to_bits()
    } else if value == 0.0 {
        0f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Primitive::Null, Primitive::Null) => true,
            (Primitive::Bool(a), Primitive::Bool(b)) => a == b,
            (Primitive::Int(a), Primitive::Int(b)) => a == b,
            (Primitive::Float(a), Primitive::Float(b)) => {
                canonical_bits(*a) == canonical_bits(*b)
            }
            (Primitive::Str(a), Primitive::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Primitive {}

impl Hash for Primitive {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Primitive::Null => {}
            Primitive::Bool(b) => b.hash(state),
            Primitive::Int(n) => n.hash(state),
            Primitive::Float(v) => canonical_bits(*v).hash(state),
            Primitive::Str(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Null => write!(f, "null"),
            Primitive::Bool(b) => write!(f, "{b}"),
            Primitive::Int(n) => write!(f, "{n}"),
            Primitive::Float(v) => write!(f, "{v}"),
            Primitive::Str(s) => write!(f, "{s}"),
        }
    }
}

impl TryFrom<&Value> for Primitive {
    type Error = crate::error::Error;

    fn try_from(value: &Value) -> crate::error::Result<Self> {
        match value {
            Value::Null => Ok(Primitive::Null),
            Value::Bool(b) => Ok(Primitive::Bool(*b)),
            Value::Int(n) => Ok(Primitive::Int(*n)),
            Value::Float(v) => Ok(Primitive::Float(*v)),
            Value::Str(s) => Ok(Primitive::Str(s.clone())),
            other => Err(crate::error::Error::NotPrimitive(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(p: &Primitive) -> u64 {
        let mut hasher = DefaultHasher::new();
        p.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_nan_keys_are_equal() {
        let a = Primitive::Float(f64::NAN);
        let b = Primitive::Float(0.0 / 0.0);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_signed_zero_keys_are_equal() {
        let a = Primitive::Float(0.0);
        let b = Primitive::Float(-0.0);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_int_and_float_keys_are_distinct() {
        assert_ne!(Primitive::Int(42), Primitive::Float(42.0));
    }

    #[test]
    fn test_unwrap_passes_primitives_through() {
        assert_eq!(Value::Null.unwrap(), Primitive::Null);
        assert_eq!(Value::Bool(true).unwrap(), Primitive::Bool(true));
        assert_eq!(Value::Int(42).unwrap(), Primitive::Int(42));
        assert_eq!(
            Value::Str(" ".to_string()).unwrap(),
            Primitive::Str(" ".to_string())
        );
    }

    #[test]
    fn test_unwrap_stringifies_dates() {
        let date: DateTime<Utc> =
            "2020-05-22T17:04:29.569Z".parse().expect("valid timestamp");
        assert_eq!(Value::Date(date).unwrap(), Primitive::Str(date.to_string()));
    }

    #[test]
    fn test_json_scalars_convert_to_primitive_variants() {
        assert!(matches!(Value::from(serde_json::json!(null)), Value::Null));
        assert!(matches!(Value::from(serde_json::json!(true)), Value::Bool(true)));
        assert!(matches!(Value::from(serde_json::json!(42)), Value::Int(42)));
        assert!(matches!(Value::from(serde_json::json!("x")), Value::Str(_)));
    }

    #[test]
    fn test_json_composites_convert_to_objects() {
        let value = Value::from(serde_json::json!(["yes", "no"]));
        assert_eq!(value.to_string(), r#"["yes","no"]"#);
    }
}
