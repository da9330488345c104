//! Value trees on both sides of the pipeline.
//!
//! The input side is a plain [`serde_json::Value`] (aliased as [`Payload`]):
//! a nested map/sequence/scalar tree with no identity or mutation semantics,
//! consumed read-only during a single hydrate call. The output side is
//! [`Hydrated`], where maps have become schema instances, enum backings have
//! become members, and scalars carry their coerced type.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::names::KeyCase;

/// Untyped hydration input. Typically decoded from JSON or an HTTP form;
/// the engine only cares about the tree shape, not the origin format.
pub type Payload = Value;

/// Runtime type name of a payload value, for error messages.
pub fn runtime_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_f64() {
                "float"
            } else {
                "integer"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

// ------------------------------ Hydrated tree ----------------------------- //

/// One fully coerced value: a scalar, a sequence of hydrated values, an
/// instance of a nested schema, or an enum member resolved by backing value.
#[derive(Debug, Clone, PartialEq)]
pub enum Hydrated {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Hydrated>),
    Instance(Instance),
    Enum(EnumValue),
    /// `Mixed` targets and plain `array` targets pass through untouched.
    Raw(Value),
    /// Skip sentinel: a field holding this value is omitted by [`to_map`].
    /// Only ever produced via field defaults, never by coercion.
    ///
    /// [`to_map`]: Hydrated::to_map
    Skipped,
}

/// Enum member resolved from a backing value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    /// Name of the enum declaration.
    pub decl: String,
    /// Member name.
    pub member: String,
    /// Backing scalar identifying the member on the wire.
    pub backing: Value,
}

impl Hydrated {
    pub fn is_null(&self) -> bool {
        matches!(self, Hydrated::Null)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Hydrated::Skipped)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Hydrated::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Hydrated::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Hydrated::Float(x) => Some(*x),
            Hydrated::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Hydrated::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Hydrated]> {
        match self {
            Hydrated::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Hydrated::Instance(inst) => Some(inst),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Hydrated::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Mirror of hydration: convert back into a payload tree, rewriting every
    /// map key through `case`, enums to their backing value, and dropping
    /// fields marked [`Hydrated::Skipped`].
    pub fn to_map(&self, case: KeyCase) -> Value {
        match self {
            Hydrated::Null | Hydrated::Skipped => Value::Null,
            Hydrated::Bool(b) => Value::from(*b),
            Hydrated::Int(n) => Value::from(*n),
            Hydrated::Float(x) => Value::from(*x),
            Hydrated::Str(s) => Value::from(s.clone()),
            Hydrated::List(items) => {
                Value::Array(items.iter().map(|item| item.to_map(case)).collect())
            }
            Hydrated::Instance(inst) => inst.to_map(case),
            Hydrated::Enum(e) => e.backing.clone(),
            Hydrated::Raw(v) => v.clone(),
        }
    }
}

// -------------------------------- Instances ------------------------------- //

/// A constructed instance of a schema: named hydrated values in field
/// declaration order. Never observable half-built; the hydrator only hands
/// one out after every field resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    schema: String,
    fields: IndexMap<String, Hydrated>,
}

impl Instance {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Hydrated> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Hydrated)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn insert(&mut self, field: String, value: Hydrated) {
        self.fields.insert(field, value);
    }

    /// See [`Hydrated::to_map`]. Keys come out in declaration order.
    pub fn to_map(&self, case: KeyCase) -> Value {
        let mut map = serde_json::Map::new();
        for (name, value) in &self.fields {
            if value.is_skipped() {
                continue;
            }
            map.insert(case.convert(name), value.to_map(case));
        }
        Value::Object(map)
    }
}

// --------------------------- Payload text helpers ------------------------- //

/// Decode payload text with JSON-path context in error messages.
pub fn payload_from_str(src: &str) -> Result<Payload, String> {
    from_str_with_path(src)
}

pub fn payload_from_slice(bytes: &[u8]) -> Result<Payload, String> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    match serde_path_to_error::deserialize::<_, Payload>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at JSON path {path} → {}", err.into_inner()))
        }
    }
}

fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at JSON path {path} → {}", err.into_inner()))
        }
    }
}
