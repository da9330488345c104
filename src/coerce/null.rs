//! Null coercer: explicit null under a field whose descriptor set admits it.

use serde_json::Value;

use crate::coerce::Coercer;
use crate::error::HydrateError;
use crate::hydrate::Hydrator;
use crate::schema::{Kind, TypeDescriptor};
use crate::value::Hydrated;

pub struct NullCoercer;

impl Coercer for NullCoercer {
    /// Declines when any descriptor is list-flavored: a null raw value under
    /// a list field must become an empty sequence (the list coercer's job),
    /// never null, even when the set also admits `Null`.
    fn can_handle(&self, value: &Value, types: &[TypeDescriptor]) -> bool {
        value.is_null()
            && types.iter().any(|t| t.kind == Kind::Null)
            && !types.iter().any(|t| t.is_list)
    }

    fn handle(
        &self,
        _hydrator: &Hydrator<'_>,
        _field: &str,
        _value: &Value,
        _types: &[TypeDescriptor],
    ) -> Result<Hydrated, HydrateError> {
        Ok(Hydrated::Null)
    }
}
