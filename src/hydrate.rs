//! The object hydrator: walks a schema's field specs against a payload map
//! and assembles an [`Instance`], or fails with the first unrecoverable
//! field. No partial instance ever escapes; construction happens only
//! after every field resolved.
//!
//! Execution is single-threaded, synchronous, purely recursive descent.
//! Recursion depth equals payload nesting depth; schema cycles were already
//! ruled out when the registry was built.

use serde_json::Value;

use crate::error::{HydrateError, HydrateErrorKind};
use crate::names::{Mode, candidate_keys};
use crate::schema::{EnumDef, FieldSpec, Registry, allows_null};
use crate::value::{Hydrated, Instance, runtime_kind};

impl Registry {
    /// Hydrate `payload` into an instance of the named schema.
    ///
    /// The registry is borrowed for the duration of the call and nothing is
    /// mutated, so concurrent calls need no synchronization. Any error names
    /// the full path to the failing value, rooted at the schema name.
    pub fn hydrate(
        &self,
        schema: &str,
        payload: &Value,
        mode: Mode,
    ) -> Result<Instance, HydrateError> {
        let hydrator = Hydrator {
            registry: self,
            mode,
        };
        hydrator
            .hydrate_schema(schema, payload)
            .map_err(|e| e.at_field(schema))
    }
}

/// Per-call view over the registry. Carries the strict/loose mode down
/// through every level of recursion unchanged.
pub struct Hydrator<'a> {
    registry: &'a Registry,
    mode: Mode,
}

impl<'a> Hydrator<'a> {
    pub(crate) fn hydrate_schema(
        &self,
        schema: &str,
        payload: &Value,
    ) -> Result<Instance, HydrateError> {
        let Some(schema) = self.registry.schema(schema) else {
            return Err(HydrateError::new(HydrateErrorKind::UnknownSchema {
                name: schema.to_string(),
            }));
        };
        let Some(map) = payload.as_object() else {
            return Err(HydrateError::new(HydrateErrorKind::ExpectedMapForObject {
                schema: schema.name.clone(),
                actual: runtime_kind(payload),
            }));
        };

        let mut instance = Instance::new(schema.name.clone());
        for spec in &schema.fields {
            let resolved = match self.lookup(map, spec) {
                // Presence, not truthiness: an explicit null is a hit.
                Some(raw) => self
                    .registry
                    .chain()
                    .coerce(self, &spec.name, raw, &spec.types)
                    .map_err(|e| e.at_field(&spec.name))?,
                None => self.resolve_absent(spec)?,
            };
            instance.insert(spec.name.clone(), resolved);
        }
        Ok(instance)
    }

    fn lookup<'v>(
        &self,
        map: &'v serde_json::Map<String, Value>,
        spec: &FieldSpec,
    ) -> Option<&'v Value> {
        for key in candidate_keys(&spec.name, self.mode, spec.rename.as_ref()) {
            if let Some(value) = map.get(&key) {
                return Some(value);
            }
        }
        None
    }

    /// Field absent from the payload: default verbatim, then null if the
    /// descriptor set tolerates missing, else a hard failure.
    fn resolve_absent(&self, spec: &FieldSpec) -> Result<Hydrated, HydrateError> {
        if let Some(default) = &spec.default {
            return Ok(default.clone());
        }
        if allows_null(&spec.types) {
            // Same rule as a present null: list fields degrade to empty,
            // scalar fields to null.
            if spec.types.iter().any(|t| t.is_list) {
                return Ok(Hydrated::List(Vec::new()));
            }
            return Ok(Hydrated::Null);
        }
        Err(
            HydrateError::new(HydrateErrorKind::RequiredFieldMissing {
                field: spec.name.clone(),
            })
            .at_field(&spec.name),
        )
    }

    pub(crate) fn enum_def(&self, name: &str) -> Result<&'a EnumDef, HydrateError> {
        self.registry.enum_def(name).ok_or_else(|| {
            HydrateError::new(HydrateErrorKind::UnknownSchema {
                name: name.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HydrateErrorKind;
    use crate::names::{KeyCase, NameStrategy};
    use crate::schema::{EnumDef, FieldDecl, Kind, SchemaDecl};
    use serde_json::json;

    /// Registry mirroring the reference fixture: a person with scalars,
    /// a nested object, lists of scalars/objects/enums and a skippable
    /// defaulted field.
    fn registry() -> Registry {
        Registry::builder()
            .enum_def(
                EnumDef::new("Color")
                    .member("WHITE", "white")
                    .member("RED", "red")
                    .member("GREEN", "green"),
            )
            .schema(SchemaDecl::new("Hobby").field(FieldDecl::new("name").ty(Kind::Str)))
            .schema(
                SchemaDecl::new("Person")
                    .field(FieldDecl::new("userName").ty(Kind::Str))
                    .field(FieldDecl::new("isCool").ty(Kind::Bool))
                    .field(FieldDecl::new("age").ty(Kind::Int))
                    .field(FieldDecl::new("nums").list_of(Kind::Str))
                    .field(FieldDecl::new("weight").ty(Kind::Float).nullable())
                    .field(FieldDecl::new("hobby").object("Hobby"))
                    .field(FieldDecl::new("hobbies").list_of(Kind::Object("Hobby".into())))
                    .field(FieldDecl::new("testEnum").enum_ref("Color"))
                    .field(FieldDecl::new("colors").list_of(Kind::Enum("Color".into())))
                    .field(
                        FieldDecl::new("car")
                            .ty(Kind::Str)
                            .default_value(Hydrated::Skipped),
                    )
                    .field(FieldDecl::new("motorbike").ty(Kind::Str)),
            )
            .build()
            .unwrap()
    }

    fn person_payload() -> Value {
        json!({
            "userName": "Dima",
            "age": "29",
            "testEnum": "red",
            "weight": 110.2,
            "nums": [1, "2", 3.23, 4],
            "hobby": { "name": "dancing" },
            "hobbies": [ { "name": "mbx" }, { "name": "singing" } ],
            "colors": ["white", "red", "green"],
            "isCool": "On",
            "motorbike": "Kawasaki Ninja 400"
        })
    }

    fn snake_cased(v: &Value) -> Value {
        match v {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (crate::names::to_snake_case(k), snake_cased(v)))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.iter().map(snake_cased).collect()),
            other => other.clone(),
        }
    }

    #[test]
    fn hydrates_full_person_fixture() -> anyhow::Result<()> {
        let person = registry().hydrate("Person", &person_payload(), Mode::Loose)?;

        assert_eq!(person.get("userName").unwrap().as_str(), Some("Dima"));
        assert_eq!(person.get("isCool").unwrap().as_bool(), Some(true));
        assert_eq!(person.get("age").unwrap().as_i64(), Some(29));
        assert_eq!(person.get("weight").unwrap().as_f64(), Some(110.2));

        // heterogeneous scalars all stringified
        let nums: Vec<&str> = person.get("nums").unwrap().as_list().unwrap()
            .iter()
            .map(|n| n.as_str().unwrap())
            .collect();
        assert_eq!(nums, vec!["1", "2", "3.23", "4"]);

        let hobby = person.get("hobby").unwrap().as_instance().unwrap();
        assert_eq!(hobby.schema(), "Hobby");
        assert_eq!(hobby.get("name").unwrap().as_str(), Some("dancing"));

        let hobbies = person.get("hobbies").unwrap().as_list().unwrap();
        assert_eq!(hobbies.len(), 2);
        assert_eq!(
            hobbies[0].as_instance().unwrap().get("name").unwrap().as_str(),
            Some("mbx")
        );
        assert_eq!(
            hobbies[1].as_instance().unwrap().get("name").unwrap().as_str(),
            Some("singing")
        );

        let color = person.get("testEnum").unwrap().as_enum().unwrap();
        assert_eq!(color.member, "RED");
        assert_eq!(color.backing, json!("red"));

        let colors: Vec<&str> = person.get("colors").unwrap().as_list().unwrap()
            .iter()
            .map(|c| c.as_enum().unwrap().member.as_str())
            .collect();
        assert_eq!(colors, vec!["WHITE", "RED", "GREEN"]);

        // skip sentinel default survives verbatim
        assert!(person.get("car").unwrap().is_skipped());
        assert_eq!(
            person.get("motorbike").unwrap().as_str(),
            Some("Kawasaki Ninja 400")
        );
        Ok(())
    }

    #[test]
    fn loose_mode_binds_snake_cased_keys() {
        let payload = snake_cased(&person_payload());
        let person = registry().hydrate("Person", &payload, Mode::Loose).unwrap();
        assert_eq!(person.get("userName").unwrap().as_str(), Some("Dima"));
        assert_eq!(person.get("isCool").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn strict_mode_disables_casing_fallback() {
        let registry = Registry::builder()
            .schema(SchemaDecl::new("S").field(FieldDecl::new("userName").ty(Kind::Str)))
            .build()
            .unwrap();
        let payload = json!({ "user_name": "Dima" });

        let err = registry.hydrate("S", &payload, Mode::Strict).unwrap_err();
        assert_eq!(
            err.kind(),
            &HydrateErrorKind::RequiredFieldMissing {
                field: "userName".into()
            }
        );

        // Same payload in loose mode binds.
        let ok = registry.hydrate("S", &payload, Mode::Loose).unwrap();
        assert_eq!(ok.get("userName").unwrap().as_str(), Some("Dima"));
    }

    #[test]
    fn absent_and_explicit_null_are_distinguishable() {
        let registry = Registry::builder()
            .schema(SchemaDecl::new("S").field(FieldDecl::new("age").ty(Kind::Int)))
            .build()
            .unwrap();

        let absent = registry.hydrate("S", &json!({}), Mode::Loose).unwrap_err();
        assert!(matches!(
            absent.kind(),
            HydrateErrorKind::RequiredFieldMissing { .. }
        ));

        let explicit = registry
            .hydrate("S", &json!({ "age": null }), Mode::Loose)
            .unwrap_err();
        assert_eq!(
            explicit.kind(),
            &HydrateErrorKind::InvalidValue {
                field: "age".into(),
                actual: "null"
            }
        );
    }

    #[test]
    fn nullable_scalar_accepts_explicit_null() {
        let registry = Registry::builder()
            .schema(SchemaDecl::new("S").field(FieldDecl::new("weight").ty(Kind::Float).nullable()))
            .build()
            .unwrap();
        let s = registry
            .hydrate("S", &json!({ "weight": null }), Mode::Loose)
            .unwrap();
        assert!(s.get("weight").unwrap().is_null());

        // Absent behaves the same for a nullable field.
        let s = registry.hydrate("S", &json!({}), Mode::Loose).unwrap();
        assert!(s.get("weight").unwrap().is_null());
    }

    #[test]
    fn null_list_hydrates_to_empty_sequence_even_when_nullable() {
        let registry = Registry::builder()
            .schema(SchemaDecl::new("S").field(FieldDecl::new("tags").list_of(Kind::Str).nullable()))
            .build()
            .unwrap();
        let s = registry
            .hydrate("S", &json!({ "tags": null }), Mode::Loose)
            .unwrap();
        assert_eq!(s.get("tags").unwrap().as_list().unwrap().len(), 0);
        assert!(!s.get("tags").unwrap().is_null());
    }

    #[test]
    fn absent_list_field_behavior_tracks_nullability() {
        let registry = Registry::builder()
            .schema(
                SchemaDecl::new("S")
                    .field(FieldDecl::new("required").list_of(Kind::Str))
                    .field(FieldDecl::new("optional").list_of(Kind::Str).nullable()),
            )
            .build()
            .unwrap();

        let err = registry
            .hydrate("S", &json!({ "optional": [] }), Mode::Loose)
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            HydrateErrorKind::RequiredFieldMissing { .. }
        ));

        let s = registry
            .hydrate("S", &json!({ "required": ["a"] }), Mode::Loose)
            .unwrap();
        assert_eq!(s.get("optional").unwrap().as_list().unwrap().len(), 0);
    }

    #[test]
    fn bad_list_element_names_index_and_kind() {
        let registry = Registry::builder()
            .schema(SchemaDecl::new("S").field(FieldDecl::new("nums").list_of(Kind::Int)))
            .build()
            .unwrap();
        let err = registry
            .hydrate("S", &json!({ "nums": [1, "x", 3] }), Mode::Loose)
            .unwrap_err();
        assert_eq!(
            err.kind(),
            &HydrateErrorKind::InvalidElementValue {
                index: 1,
                expected: "int".into(),
                actual: "string"
            }
        );
        assert_eq!(err.path().to_string(), "S.nums[1]");
    }

    #[test]
    fn non_map_list_element_for_object_names_index() {
        let err = registry()
            .hydrate(
                "Person",
                &{
                    let mut p = person_payload();
                    p["hobbies"] = json!([{ "name": "mbx" }, "singing"]);
                    p
                },
                Mode::Loose,
            )
            .unwrap_err();
        assert_eq!(
            err.kind(),
            &HydrateErrorKind::InvalidElementShape {
                index: 1,
                actual: "string"
            }
        );
        assert_eq!(err.path().to_string(), "Person.hobbies[1]");
    }

    #[test]
    fn nested_failure_reports_full_path() {
        let mut payload = person_payload();
        payload["hobbies"][1]["name"] = json!({});
        let err = registry()
            .hydrate("Person", &payload, Mode::Loose)
            .unwrap_err();
        assert_eq!(err.path().to_string(), "Person.hobbies[1].name");
        assert!(matches!(err.kind(), HydrateErrorKind::InvalidValue { .. }));
    }

    #[test]
    fn unknown_enum_value_is_fatal() {
        let mut payload = person_payload();
        payload["testEnum"] = json!("purple");
        let err = registry()
            .hydrate("Person", &payload, Mode::Loose)
            .unwrap_err();
        assert_eq!(
            err.kind(),
            &HydrateErrorKind::UnknownEnumValue {
                decl: "Color".into(),
                given: "purple".into()
            }
        );
    }

    #[test]
    fn invalid_boolean_token_is_fatal() {
        let mut payload = person_payload();
        payload["isCool"] = json!("maybe");
        let err = registry()
            .hydrate("Person", &payload, Mode::Loose)
            .unwrap_err();
        assert_eq!(
            err.kind(),
            &HydrateErrorKind::InvalidBooleanValue {
                field: "isCool".into(),
                given: "maybe".into()
            }
        );
    }

    #[test]
    fn scalar_for_nested_object_field_is_rejected() {
        let mut payload = person_payload();
        payload["hobby"] = json!("dancing");
        let err = registry()
            .hydrate("Person", &payload, Mode::Loose)
            .unwrap_err();
        assert_eq!(
            err.kind(),
            &HydrateErrorKind::ExpectedMapForObject {
                schema: "Hobby".into(),
                actual: "string"
            }
        );
        assert_eq!(err.path().to_string(), "Person.hobby");
    }

    #[test]
    fn strict_mode_is_inherited_by_nested_schemas() {
        let registry = Registry::builder()
            .schema(SchemaDecl::new("Inner").field(FieldDecl::new("someKey").ty(Kind::Str)))
            .schema(SchemaDecl::new("Outer").field(FieldDecl::new("inner").object("Inner")))
            .build()
            .unwrap();
        let payload = json!({ "inner": { "some_key": "v" } });

        let err = registry
            .hydrate("Outer", &payload, Mode::Strict)
            .unwrap_err();
        assert_eq!(err.path().to_string(), "Outer.inner.someKey");

        assert!(registry.hydrate("Outer", &payload, Mode::Loose).is_ok());
    }

    #[test]
    fn schema_level_rename_replaces_candidates_entirely() {
        let registry = Registry::builder()
            .schema(
                SchemaDecl::new("User")
                    .rename(NameStrategy::Snake)
                    .field(FieldDecl::new("userName").ty(Kind::Str)),
            )
            .build()
            .unwrap();

        // Renamed key binds even in strict mode.
        let ok = registry
            .hydrate("User", &json!({ "user_name": "Dima" }), Mode::Strict)
            .unwrap();
        assert_eq!(ok.get("userName").unwrap().as_str(), Some("Dima"));

        // The declared spelling no longer matches, even loosely: the
        // strategy output is the only candidate.
        let err = registry
            .hydrate("User", &json!({ "userName": "Dima" }), Mode::Loose)
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            HydrateErrorKind::RequiredFieldMissing { .. }
        ));
    }

    #[test]
    fn mixed_field_passes_anything_through() {
        let registry = Registry::builder()
            .schema(SchemaDecl::new("S").field(FieldDecl::new("extra")))
            .build()
            .unwrap();
        let s = registry
            .hydrate("S", &json!({ "extra": { "deep": [1, 2] } }), Mode::Loose)
            .unwrap();
        assert_eq!(
            s.get("extra").unwrap(),
            &Hydrated::Raw(json!({ "deep": [1, 2] }))
        );

        // Absent mixed field resolves to null rather than failing.
        let s = registry.hydrate("S", &json!({}), Mode::Loose).unwrap();
        assert!(s.get("extra").unwrap().is_null());
    }

    #[test]
    fn unknown_schema_name_is_reported() {
        let err = registry()
            .hydrate("Ghost", &json!({}), Mode::Loose)
            .unwrap_err();
        assert_eq!(
            err.kind(),
            &HydrateErrorKind::UnknownSchema {
                name: "Ghost".into()
            }
        );
    }

    #[test]
    fn round_trip_is_stable_after_first_coercion() -> anyhow::Result<()> {
        let registry = registry();
        let first = registry.hydrate("Person", &person_payload(), Mode::Loose)?;

        for case in [KeyCase::Camel, KeyCase::Snake, KeyCase::Kebab] {
            let mirrored = first.to_map(case);
            let second = registry.hydrate("Person", &mirrored, Mode::Loose)?;
            // `car` was Skipped on the way out and absent on the way back in,
            // where its default kicks in again, so instances match exactly.
            assert_eq!(first, second, "round trip through {case:?}");
        }
        Ok(())
    }
}
