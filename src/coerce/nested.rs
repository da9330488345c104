//! Nested coercer: object-typed and enum-typed fields.

use serde_json::Value;

use crate::coerce::Coercer;
use crate::error::{HydrateError, HydrateErrorKind};
use crate::hydrate::Hydrator;
use crate::schema::{Kind, TypeDescriptor, allows_null};
use crate::value::{EnumValue, Hydrated, runtime_kind};

pub struct NestedCoercer;

impl Coercer for NestedCoercer {
    fn can_handle(&self, _value: &Value, types: &[TypeDescriptor]) -> bool {
        types
            .iter()
            .any(|t| !t.is_list && matches!(t.kind, Kind::Object(_) | Kind::Enum(_)))
    }

    fn handle(
        &self,
        hydrator: &Hydrator<'_>,
        field: &str,
        value: &Value,
        types: &[TypeDescriptor],
    ) -> Result<Hydrated, HydrateError> {
        if value.is_null() {
            // A null that was acceptable never reaches this coercer; anything
            // else is a plain rejection, same as for scalar fields.
            if allows_null(types) {
                return Ok(Hydrated::Null);
            }
            return Err(HydrateError::new(HydrateErrorKind::InvalidValue {
                field: field.to_string(),
                actual: "null",
            }));
        }

        // A union may mix object and enum targets; the value's shape picks
        // the branch (maps hydrate, scalars look up a member). Within one
        // shape, priority-sorted descriptor order decides.
        let target = types
            .iter()
            .filter(|t| !t.is_list)
            .find(|t| match t.kind {
                Kind::Object(_) => value.is_object(),
                Kind::Enum(_) => !value.is_object() && !value.is_array(),
                _ => false,
            })
            .or_else(|| {
                types
                    .iter()
                    .find(|t| !t.is_list && matches!(t.kind, Kind::Object(_) | Kind::Enum(_)))
            });

        match target.map(|t| &t.kind) {
            Some(Kind::Enum(decl)) => enum_member(hydrator, decl, value).map(Hydrated::Enum),
            Some(Kind::Object(schema)) => {
                if !value.is_object() {
                    return Err(HydrateError::new(HydrateErrorKind::ExpectedMapForObject {
                        schema: schema.clone(),
                        actual: runtime_kind(value),
                    }));
                }
                // Recursive descent inherits the enclosing call's mode.
                hydrator
                    .hydrate_schema(schema, value)
                    .map(Hydrated::Instance)
            }
            _ => Err(HydrateError::new(HydrateErrorKind::InvalidValue {
                field: field.to_string(),
                actual: runtime_kind(value),
            })),
        }
    }
}

/// Resolve an enum member by backing value. Scalar equality is exact: no
/// numeric widening and no string/number bridging.
pub(crate) fn enum_member(
    hydrator: &Hydrator<'_>,
    decl: &str,
    raw: &Value,
) -> Result<EnumValue, HydrateError> {
    let def = hydrator.enum_def(decl)?;
    for (member, backing) in def.members() {
        if backing == raw {
            return Ok(EnumValue {
                decl: decl.to_string(),
                member: member.clone(),
                backing: backing.clone(),
            });
        }
    }
    Err(HydrateError::new(HydrateErrorKind::UnknownEnumValue {
        decl: decl.to_string(),
        given: match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }))
}
