//! Error surfaces, split by origin:
//! - `SchemaError`: raised once at registry build time, independent of any payload.
//! - `HydrateError`: per-call rejection of an input payload, carrying the full
//!   field path down to the offending value.

use std::fmt;

// ------------------------------ Field paths ------------------------------- //

/// One step on the way down to a failing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Path from the root schema to the value an error is about, e.g.
/// `Person.hobbies[1].name`. Built back-to-front: each recursion level
/// prepends its own segment while the error bubbles up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    fn prepend(&mut self, seg: PathSegment) {
        self.0.insert(0, seg);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                PathSegment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{name}")?;
                }
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

// --------------------------- Schema-build errors -------------------------- //

/// Fatal schema-construction errors. These are detected once, when the
/// registry is built, and never retried: a malformed schema cannot become
/// valid by feeding it different payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// `list_of` names an element kind the list coercer cannot produce.
    /// Only `int`, `float`, `string`, object and enum elements are supported.
    #[error("field `{schema}.{field}`: unsupported list element type `{ty}`")]
    UnsupportedElementType {
        schema: String,
        field: String,
        ty: String,
    },

    /// A field references a schema or enum name that was never registered.
    #[error("field `{schema}.{field}` references unknown declaration `{name}`")]
    UnknownSchemaReference {
        schema: String,
        field: String,
        name: String,
    },

    /// The schema graph contains a reference cycle. Detected up front because
    /// payload depth alone cannot distinguish deep nesting from a cycle.
    #[error("cyclic schema reference: {path}")]
    CyclicSchemaReference { path: String },

    #[error("duplicate declaration `{name}`")]
    DuplicateDeclaration { name: String },
}

// ----------------------------- Hydration errors --------------------------- //

/// What went wrong, without the path context.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HydrateErrorKind {
    /// Payload lacks a non-defaultable, non-nullable field.
    #[error("missing required field `{field}`")]
    RequiredFieldMissing { field: String },

    /// Present value matches none of the field's acceptable types.
    #[error("value of field `{field}` has unexpected type `{actual}`")]
    InvalidValue { field: String, actual: &'static str },

    /// Value reached a bool target but is not a recognized truthy/falsy token.
    #[error("cannot interpret `{given}` as a boolean for field `{field}`")]
    InvalidBooleanValue { field: String, given: String },

    /// A list item failed scalar element coercion.
    #[error("list element at index {index} should be `{expected}`, got `{actual}`")]
    InvalidElementValue {
        index: usize,
        expected: String,
        actual: &'static str,
    },

    /// A list item was expected to be a map (object element) but is not.
    #[error("list element at index {index} should be a map, got `{actual}`")]
    InvalidElementShape { index: usize, actual: &'static str },

    /// Scalar does not match any member's backing value.
    #[error("`{given}` is not a member of enum `{decl}`")]
    UnknownEnumValue { decl: String, given: String },

    /// A nested-object field received a non-map value.
    #[error("schema `{schema}` expects a map, got `{actual}`")]
    ExpectedMapForObject {
        schema: String,
        actual: &'static str,
    },

    /// The caller asked for a schema name the registry does not know.
    #[error("no schema named `{name}` is registered")]
    UnknownSchema { name: String },
}

/// Rejection of one hydration call. Always fatal to the enclosing call:
/// there is no partial-success mode and coercion is deterministic, so a
/// retry with the same input cannot succeed.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrateError {
    path: FieldPath,
    kind: HydrateErrorKind,
}

impl HydrateError {
    pub fn new(kind: HydrateErrorKind) -> Self {
        Self {
            path: FieldPath::default(),
            kind,
        }
    }

    pub fn kind(&self) -> &HydrateErrorKind {
        &self.kind
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Prepend a field segment while bubbling out of a nested level.
    pub fn at_field(mut self, name: &str) -> Self {
        self.path.prepend(PathSegment::Field(name.to_string()));
        self
    }

    /// Prepend a sequence index while bubbling out of a list item.
    pub fn at_index(mut self, index: usize) -> Self {
        self.path.prepend(PathSegment::Index(index));
        self
    }
}

impl fmt::Display for HydrateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Path prefix only when there is one; bare kind otherwise.
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "at `{}`: {}", self.path, self.kind)
        }
    }
}

impl std::error::Error for HydrateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
