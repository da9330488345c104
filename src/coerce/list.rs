//! List coercer: "array of T" fields, with per-item element coercion.
//!
//! Element rules are stricter than top-level scalar coercion: no boolean
//! token shortcuts, and any single bad element aborts the whole list with
//! the offending index. Invalid items are never skipped.

use serde_json::Value;

use crate::coerce::{Coercer, nested, num};
use crate::error::{HydrateError, HydrateErrorKind};
use crate::hydrate::Hydrator;
use crate::schema::{Kind, TypeDescriptor};
use crate::value::{Hydrated, runtime_kind};

pub struct ListCoercer;

impl Coercer for ListCoercer {
    fn can_handle(&self, _value: &Value, types: &[TypeDescriptor]) -> bool {
        types.iter().any(|t| t.is_list)
    }

    fn handle(
        &self,
        hydrator: &Hydrator<'_>,
        field: &str,
        value: &Value,
        types: &[TypeDescriptor],
    ) -> Result<Hydrated, HydrateError> {
        // Absent-or-null list becomes an empty sequence, not null. This is
        // deliberately asymmetric with scalar null handling and simplifies
        // downstream iteration.
        if value.is_null() {
            return Ok(Hydrated::List(Vec::new()));
        }

        let Some(items) = value.as_array() else {
            return Err(HydrateError::new(HydrateErrorKind::InvalidValue {
                field: field.to_string(),
                actual: runtime_kind(value),
            }));
        };

        // Sets are priority-sorted, so the list descriptor comes first among
        // list-flavored entries; resolution guarantees its element.
        let element = types
            .iter()
            .find(|t| t.is_list)
            .and_then(|t| t.element.as_deref())
            .ok_or_else(|| {
                HydrateError::new(HydrateErrorKind::InvalidValue {
                    field: field.to_string(),
                    actual: runtime_kind(value),
                })
            })?;

        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let coerced =
                coerce_element(hydrator, element, index, item).map_err(|e| e.at_index(index))?;
            out.push(coerced);
        }
        Ok(Hydrated::List(out))
    }
}

fn coerce_element(
    hydrator: &Hydrator<'_>,
    element: &TypeDescriptor,
    index: usize,
    item: &Value,
) -> Result<Hydrated, HydrateError> {
    match &element.kind {
        Kind::Object(schema) => {
            if !item.is_object() {
                return Err(HydrateError::new(HydrateErrorKind::InvalidElementShape {
                    index,
                    actual: runtime_kind(item),
                }));
            }
            hydrator.hydrate_schema(schema, item).map(Hydrated::Instance)
        }
        Kind::Enum(decl) => nested::enum_member(hydrator, decl, item).map(Hydrated::Enum),
        Kind::Int => num::as_int(item)
            .map(Hydrated::Int)
            .ok_or_else(|| invalid_element(index, "int", item)),
        Kind::Float => num::as_float(item)
            .map(Hydrated::Float)
            .ok_or_else(|| invalid_element(index, "float", item)),
        Kind::Str => stringify_element(item)
            .map(Hydrated::Str)
            .ok_or_else(|| invalid_element(index, "string", item)),
        // Other element kinds are rejected at schema resolution.
        _ => Err(invalid_element(index, "int|float|string", item)),
    }
}

/// Any scalar stringifies; null and containers do not.
fn stringify_element(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn invalid_element(index: usize, expected: &str, item: &Value) -> HydrateError {
    HydrateError::new(HydrateErrorKind::InvalidElementValue {
        index,
        expected: expected.to_string(),
        actual: runtime_kind(item),
    })
}
