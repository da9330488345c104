//! The ordered coercion chain.
//!
//! Four coercers tried in a fixed order (null, list, nested object/enum,
//! then the terminal scalar fallback), first `can_handle` winning. Within
//! a coercer, the field's descriptor set is
//! already priority-sorted (see `schema`), so union targets are attempted
//! least-lossy first.

pub mod list;
pub mod nested;
pub mod null;
pub mod num;
pub mod scalar;

use serde_json::Value;

use crate::error::{HydrateError, HydrateErrorKind};
use crate::hydrate::Hydrator;
use crate::schema::TypeDescriptor;
use crate::value::{Hydrated, runtime_kind};

/// One strategy for converting a raw payload value into a field's target
/// type. `can_handle` must be cheap and side-effect free; `handle` is only
/// called after `can_handle` returned true.
pub trait Coercer: Send + Sync {
    fn can_handle(&self, value: &Value, types: &[TypeDescriptor]) -> bool;

    fn handle(
        &self,
        hydrator: &Hydrator<'_>,
        field: &str,
        value: &Value,
        types: &[TypeDescriptor],
    ) -> Result<Hydrated, HydrateError>;
}

/// The ordered chain. Built once per registry and reused by every hydrate
/// call; it holds no per-call state.
pub struct Chain {
    coercers: Vec<Box<dyn Coercer>>,
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("coercers", &self.coercers.len())
            .finish()
    }
}

impl Chain {
    pub(crate) fn new() -> Self {
        Self {
            coercers: vec![
                Box::new(null::NullCoercer),
                Box::new(list::ListCoercer),
                Box::new(nested::NestedCoercer),
                Box::new(scalar::ScalarCoercer),
            ],
        }
    }

    /// First coercer whose `can_handle` succeeds wins. The scalar coercer is
    /// a terminal fallback, so the trailing error is only reachable for an
    /// empty descriptor set, which resolution rules out.
    pub(crate) fn coerce(
        &self,
        hydrator: &Hydrator<'_>,
        field: &str,
        value: &Value,
        types: &[TypeDescriptor],
    ) -> Result<Hydrated, HydrateError> {
        for coercer in &self.coercers {
            if coercer.can_handle(value, types) {
                return coercer.handle(hydrator, field, value, types);
            }
        }
        Err(HydrateError::new(HydrateErrorKind::InvalidValue {
            field: field.to_string(),
            actual: runtime_kind(value),
        }))
    }
}
