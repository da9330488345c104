//! Schema declarations and their one-time resolution.
//!
//! A schema is authored as an ordered list of [`FieldDecl`]s: the field's
//! declared name, its union of acceptable types, nullability, an optional
//! "list of T" annotation, an optional default and an optional rename
//! strategy. The engine never inspects language-level type metadata; this
//! table is the whole contract, however it was produced (hand-written,
//! generated, or derived).
//!
//! [`RegistryBuilder::build`] runs the type resolver once per field and
//! validates the whole graph up front: unsupported list element kinds,
//! dangling schema/enum references and reference cycles all fail here, as
//! [`SchemaError`]s, before any payload is ever seen. The built [`Registry`]
//! is immutable, `Send + Sync`, and concurrent hydrate calls on it need no
//! locking.

use indexmap::IndexMap;
use serde_json::Value;

use crate::coerce::Chain;
use crate::error::SchemaError;
use crate::names::NameStrategy;
use crate::value::Hydrated;

// --------------------------------- Kinds ---------------------------------- //

/// One named shape a value can take. `Object` and `Enum` carry the registry
/// name of the referenced declaration, resolved at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    /// Plain untyped array (no element annotation): passes through as-is.
    Array,
    Object(String),
    Enum(String),
    Mixed,
}

impl Kind {
    fn display_name(&self) -> String {
        match self {
            Kind::Null => "null".into(),
            Kind::Bool => "bool".into(),
            Kind::Int => "int".into(),
            Kind::Float => "float".into(),
            Kind::Str => "string".into(),
            Kind::Array => "array".into(),
            Kind::Object(name) | Kind::Enum(name) => name.clone(),
            Kind::Mixed => "mixed".into(),
        }
    }
}

/// One acceptable shape for a field. Immutable after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub kind: Kind,
    /// True for "array whose elements must each match `element`".
    pub is_list: bool,
    /// Present iff `is_list`.
    pub element: Option<Box<TypeDescriptor>>,
}

impl TypeDescriptor {
    pub fn of(kind: Kind) -> Self {
        Self {
            kind,
            is_list: false,
            element: None,
        }
    }

    pub fn list_of(element: TypeDescriptor) -> Self {
        Self {
            kind: Kind::Array,
            is_list: true,
            element: Some(Box::new(element)),
        }
    }

    /// Fixed dispatch priority: null, then lists, then scalars from least to
    /// most lossy, then nested declarations, with untyped arrays and `mixed`
    /// as last resorts. A `null` or sequence value must never be silently
    /// stringified, so structural kinds sort before scalar coercion.
    fn priority(&self) -> u8 {
        if self.is_list {
            return 1;
        }
        match self.kind {
            Kind::Null => 0,
            Kind::Str => 2,
            Kind::Int => 3,
            Kind::Float => 4,
            Kind::Bool => 5,
            Kind::Enum(_) | Kind::Object(_) => 6,
            Kind::Array => 7,
            Kind::Mixed => 8,
        }
    }
}

/// True if the descriptor set tolerates an explicit null (a `Null` sibling
/// or `Mixed`). The same test covers "may be absent" for required-field
/// checks.
pub fn allows_null(types: &[TypeDescriptor]) -> bool {
    types
        .iter()
        .any(|t| matches!(t.kind, Kind::Null | Kind::Mixed))
}

// ------------------------------ Declarations ------------------------------ //

/// Authored description of one field. Build with the chained setters and
/// hand to [`SchemaDecl::field`].
#[derive(Debug, Clone)]
pub struct FieldDecl {
    name: String,
    types: Vec<Kind>,
    nullable: bool,
    list_of: Option<Kind>,
    default: Option<Hydrated>,
    rename: Option<NameStrategy>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            nullable: false,
            list_of: None,
            default: None,
            rename: None,
        }
    }

    /// Add one acceptable type. Call repeatedly to declare a union; members
    /// keep declaration order.
    pub fn ty(mut self, kind: Kind) -> Self {
        self.types.push(kind);
        self
    }

    pub fn object(self, schema: impl Into<String>) -> Self {
        self.ty(Kind::Object(schema.into()))
    }

    pub fn enum_ref(self, decl: impl Into<String>) -> Self {
        self.ty(Kind::Enum(decl.into()))
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Declare "array of `element`". Supported elements: `int`, `float`,
    /// `string`, object and enum references. Anything else fails at build
    /// time, not per payload.
    pub fn list_of(mut self, element: Kind) -> Self {
        self.list_of = Some(element);
        self
    }

    /// Used verbatim when the field is absent; no coercion is applied.
    pub fn default_value(mut self, value: Hydrated) -> Self {
        self.default = Some(value);
        self
    }

    pub fn rename(mut self, strategy: NameStrategy) -> Self {
        self.rename = Some(strategy);
        self
    }
}

/// Authored schema: a name plus ordered field declarations, with an optional
/// schema-wide rename strategy (a field-level strategy wins over it).
#[derive(Debug, Clone)]
pub struct SchemaDecl {
    name: String,
    fields: Vec<FieldDecl>,
    rename: Option<NameStrategy>,
}

impl SchemaDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            rename: None,
        }
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn rename(mut self, strategy: NameStrategy) -> Self {
        self.rename = Some(strategy);
        self
    }
}

/// Backed enum declaration: members identified by a scalar backing value.
#[derive(Debug, Clone)]
pub struct EnumDef {
    name: String,
    members: Vec<(String, Value)>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn member(mut self, name: impl Into<String>, backing: impl Into<Value>) -> Self {
        self.members.push((name.into(), backing.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[(String, Value)] {
        &self.members
    }
}

// ------------------------------- Resolved form ---------------------------- //

/// A field after type resolution: descriptor set sorted by dispatch
/// priority, effective rename strategy folded in. Read-only from here on.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    /// Non-empty, stably sorted by the fixed dispatch priority.
    pub types: Vec<TypeDescriptor>,
    pub default: Option<Hydrated>,
    pub rename: Option<NameStrategy>,
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

/// Resolve one field declaration into its descriptor set.
///
/// - no declared constraint → `[Mixed]`
/// - a union keeps declaration order (no dedup)
/// - a "list of T" annotation contributes a list-flavored descriptor in
///   addition to the declared container types
/// - `nullable` appends a `Null` descriptor unless `Mixed` already admits it
fn resolve_field(
    schema: &str,
    decl: &FieldDecl,
    schema_rename: Option<&NameStrategy>,
) -> Result<FieldSpec, SchemaError> {
    let mut types = Vec::with_capacity(decl.types.len() + 2);

    if let Some(element) = &decl.list_of {
        let element = match element {
            Kind::Int | Kind::Float | Kind::Str | Kind::Object(_) | Kind::Enum(_) => {
                TypeDescriptor::of(element.clone())
            }
            other => {
                return Err(SchemaError::UnsupportedElementType {
                    schema: schema.to_string(),
                    field: decl.name.clone(),
                    ty: other.display_name(),
                });
            }
        };
        types.push(TypeDescriptor::list_of(element));
    }

    for kind in &decl.types {
        types.push(TypeDescriptor::of(kind.clone()));
    }

    if types.is_empty() {
        types.push(TypeDescriptor::of(Kind::Mixed));
    }

    if decl.nullable && !types.iter().any(|t| t.kind == Kind::Mixed) {
        types.push(TypeDescriptor::of(Kind::Null));
    }

    // Stable sort: equal priorities keep declaration order.
    types.sort_by_key(|t| t.priority());

    Ok(FieldSpec {
        name: decl.name.clone(),
        types,
        default: decl.default.clone(),
        rename: decl.rename.clone().or_else(|| schema_rename.cloned()),
    })
}

// --------------------------------- Registry ------------------------------- //

/// Immutable set of resolved schemas and enums plus the coercion chain.
/// Owned by the caller and passed by reference; there is no process-global
/// state anywhere in the engine.
#[derive(Debug)]
pub struct Registry {
    schemas: IndexMap<String, Schema>,
    enums: IndexMap<String, EnumDef>,
    chain: Chain,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.get(name)
    }

    pub(crate) fn chain(&self) -> &Chain {
        &self.chain
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    schemas: Vec<SchemaDecl>,
    enums: Vec<EnumDef>,
}

impl RegistryBuilder {
    pub fn schema(mut self, decl: SchemaDecl) -> Self {
        self.schemas.push(decl);
        self
    }

    pub fn enum_def(mut self, def: EnumDef) -> Self {
        self.enums.push(def);
        self
    }

    /// Resolve every declaration and validate the graph. All failures here
    /// are schema-construction errors: loud, once per registry, independent
    /// of any payload.
    pub fn build(self) -> Result<Registry, SchemaError> {
        let mut enums: IndexMap<String, EnumDef> = IndexMap::new();
        for def in self.enums {
            if enums.contains_key(def.name()) {
                return Err(SchemaError::DuplicateDeclaration {
                    name: def.name().to_string(),
                });
            }
            enums.insert(def.name().to_string(), def);
        }

        let mut schemas: IndexMap<String, Schema> = IndexMap::new();
        for decl in &self.schemas {
            if schemas.contains_key(&decl.name) || enums.contains_key(&decl.name) {
                return Err(SchemaError::DuplicateDeclaration {
                    name: decl.name.clone(),
                });
            }
            let fields = decl
                .fields
                .iter()
                .map(|f| resolve_field(&decl.name, f, decl.rename.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            schemas.insert(
                decl.name.clone(),
                Schema {
                    name: decl.name.clone(),
                    fields,
                },
            );
        }

        validate_references(&schemas, &enums)?;
        detect_cycles(&schemas)?;

        Ok(Registry {
            schemas,
            enums,
            chain: Chain::new(),
        })
    }
}

/// Every `Object`/`Enum` descriptor must point at a registered declaration.
fn validate_references(
    schemas: &IndexMap<String, Schema>,
    enums: &IndexMap<String, EnumDef>,
) -> Result<(), SchemaError> {
    for schema in schemas.values() {
        for field in &schema.fields {
            for desc in descriptors_with_elements(&field.types) {
                let (name, is_enum) = match &desc.kind {
                    Kind::Object(name) => (name, false),
                    Kind::Enum(name) => (name, true),
                    _ => continue,
                };
                let known = if is_enum {
                    enums.contains_key(name)
                } else {
                    schemas.contains_key(name)
                };
                if !known {
                    return Err(SchemaError::UnknownSchemaReference {
                        schema: schema.name.clone(),
                        field: field.name.clone(),
                        name: name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Depth-first walk over schema → schema edges. Any cycle (including direct
/// self-reference) is fatal at build time; hydration-time depth tracking
/// could not tell a cycle apart from legitimately deep payloads.
fn detect_cycles(schemas: &IndexMap<String, Schema>) -> Result<(), SchemaError> {
    fn visit(
        name: &str,
        schemas: &IndexMap<String, Schema>,
        stack: &mut Vec<String>,
        done: &mut Vec<String>,
    ) -> Result<(), SchemaError> {
        if done.iter().any(|n| n == name) {
            return Ok(());
        }
        if let Some(pos) = stack.iter().position(|n| n == name) {
            let mut path: Vec<&str> = stack[pos..].iter().map(String::as_str).collect();
            path.push(name);
            return Err(SchemaError::CyclicSchemaReference {
                path: path.join(" -> "),
            });
        }
        let Some(schema) = schemas.get(name) else {
            return Ok(()); // dangling refs are reported by validate_references
        };
        stack.push(name.to_string());
        for field in &schema.fields {
            for desc in descriptors_with_elements(&field.types) {
                if let Kind::Object(target) = &desc.kind {
                    visit(target, schemas, stack, done)?;
                }
            }
        }
        stack.pop();
        done.push(name.to_string());
        Ok(())
    }

    let mut done = Vec::new();
    for name in schemas.keys() {
        visit(name, schemas, &mut Vec::new(), &mut done)?;
    }
    Ok(())
}

/// Flatten a descriptor set including list element descriptors.
fn descriptors_with_elements(types: &[TypeDescriptor]) -> Vec<&TypeDescriptor> {
    let mut out = Vec::with_capacity(types.len());
    for t in types {
        out.push(t);
        if let Some(el) = &t.element {
            out.push(el);
        }
    }
    out
}
