//! Schema-driven hydration of JSON-like payloads (single-crate engine).
//!
//! Feed an untyped payload tree in and get a strongly-shaped object graph
//! out, or a structured error naming the exact path that failed; the graph
//! mirrors back into a map with any key casing.
//!
//! Design goals:
//! - Schemas are explicit tables ([`SchemaDecl`]), resolved and validated
//!   once at [`Registry`] build time; hydration never inspects language
//!   metadata.
//! - Coercion is an ordered chain of strategies; first match wins, priority
//!   is fixed, every failure is fatal to the call. No partial instances.
//! - The registry is immutable after build and safe to share across threads
//!   without locking.
//!
//! ```
//! use json_hydrate::{FieldDecl, Kind, Mode, Registry, SchemaDecl};
//! use serde_json::json;
//!
//! let registry = Registry::builder()
//!     .schema(SchemaDecl::new("Hobby").field(FieldDecl::new("name").ty(Kind::Str)))
//!     .schema(
//!         SchemaDecl::new("User")
//!             .field(FieldDecl::new("userName").ty(Kind::Str))
//!             .field(FieldDecl::new("hobbies").list_of(Kind::Object("Hobby".into()))),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let user = registry
//!     .hydrate(
//!         "User",
//!         &json!({ "user_name": "Dima", "hobbies": [{ "name": "mbx" }] }),
//!         Mode::Loose,
//!     )
//!     .unwrap();
//! assert_eq!(user.get("userName").unwrap().as_str(), Some("Dima"));
//! ```

pub mod coerce;
pub mod error;
pub mod hydrate;
pub mod names;
pub mod schema;
pub mod value;

pub use error::{FieldPath, HydrateError, HydrateErrorKind, PathSegment, SchemaError};
pub use hydrate::Hydrator;
pub use names::{KeyCase, Mode, NameStrategy};
pub use schema::{EnumDef, FieldDecl, Kind, Registry, SchemaDecl, TypeDescriptor};
pub use value::{EnumValue, Hydrated, Instance, Payload, payload_from_slice, payload_from_str};
