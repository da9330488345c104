//! Terminal scalar/generic coercer. Always willing; tries the field's
//! priority-sorted targets in turn and rejects the value only when none of
//! them can take it.

use serde_json::Value;

use crate::coerce::{Coercer, num};
use crate::error::{HydrateError, HydrateErrorKind};
use crate::hydrate::Hydrator;
use crate::schema::{Kind, TypeDescriptor, allows_null};
use crate::value::{Hydrated, runtime_kind};

pub struct ScalarCoercer;

impl Coercer for ScalarCoercer {
    fn can_handle(&self, _value: &Value, _types: &[TypeDescriptor]) -> bool {
        true
    }

    fn handle(
        &self,
        _hydrator: &Hydrator<'_>,
        field: &str,
        value: &Value,
        types: &[TypeDescriptor],
    ) -> Result<Hydrated, HydrateError> {
        if value.is_null() {
            // Explicit null on a non-nullable field. Distinct from "absent":
            // that case is handled (and reported) by the hydrator before the
            // chain ever runs.
            if allows_null(types) {
                return Ok(Hydrated::Null);
            }
            return Err(invalid(field, value));
        }

        for target in types {
            if target.is_list {
                continue;
            }
            match &target.kind {
                Kind::Str => {
                    if let Some(s) = stringify(value) {
                        return Ok(Hydrated::Str(s));
                    }
                }
                Kind::Int => {
                    if let Some(n) = num::as_int(value) {
                        return Ok(Hydrated::Int(n));
                    }
                }
                Kind::Float => {
                    if let Some(x) = num::as_float(value) {
                        return Ok(Hydrated::Float(x));
                    }
                }
                // A reached bool target is terminal: an unrecognized token is
                // fatal rather than falling through to lossier targets.
                Kind::Bool => return as_bool(value).map(Hydrated::Bool).ok_or_else(|| {
                    HydrateError::new(HydrateErrorKind::InvalidBooleanValue {
                        field: field.to_string(),
                        given: render_token(value),
                    })
                }),
                Kind::Array => {
                    // Untyped array target: sequence passes through unchanged.
                    if value.is_array() {
                        return Ok(Hydrated::Raw(value.clone()));
                    }
                }
                Kind::Mixed => return Ok(Hydrated::Raw(value.clone())),
                // Null handled above; nested kinds belong to earlier coercers.
                Kind::Null | Kind::Object(_) | Kind::Enum(_) => {}
            }
        }

        Err(invalid(field, value))
    }
}

/// Canonical string form: strings as-is, numbers in natural decimal
/// notation. Booleans are never auto-stringified at the top level.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Canonical truthy/falsy tokens, case-insensitive, plus real booleans and
/// 0/1. The empty string counts as false.
fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Some(true),
            "0" | "false" | "off" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn render_token(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn invalid(field: &str, value: &Value) -> HydrateError {
    HydrateError::new(HydrateErrorKind::InvalidValue {
        field: field.to_string(),
        actual: runtime_kind(value),
    })
}
