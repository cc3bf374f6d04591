//! Tests for model registries.

use assert_matches::assert_matches;
use serde_json::json;

use super::*;
use crate::{
    field::IntegerField,
    model,
    testonly::{
        ChildModel, EmptyModel, GrandchildModel, InfoConfig, KidConfig, OtherParentModel,
        ParentModel, PersonConfig,
    },
    value::Value,
};

#[test]
fn registry_basics() {
    let schema = PersonConfig::schema();
    assert_eq!(schema.name(), "PersonConfig");
    assert_eq!(schema.help(), "Person configuration.");
    assert!(schema.ancestors().is_empty());
    assert_eq!(schema.ty(), RustType::of::<PersonConfig>("PersonConfig"));

    let ids: Vec<_> = schema.fields().map(|(id, _)| id).collect();
    assert_eq!(ids, ["city", "info", "name", "tags"]);

    let name = schema.field("name").unwrap();
    assert_eq!(name.name(), "name");
    assert_eq!(name.help(), Some("Full name of the person."));
    assert!(!name.is_nullable());
    assert!(schema.field("missing").is_none());
}

#[test]
fn registry_is_built_once() {
    let first: *const ModelSchema = InfoConfig::schema();
    let second: *const ModelSchema = InfoConfig::schema();
    assert_eq!(first, second);
}

#[test]
fn inheritance() {
    let schema = ChildModel::schema();
    let ids: Vec<_> = schema.fields().map(|(id, _)| id).collect();
    assert_eq!(ids, ["age", "email", "name", "school"]);
    assert_eq!(schema.ancestors().len(), 2);
    assert_eq!(schema.ancestors()[0].name(), "ParentModel");

    // Own declarations win over ancestors.
    assert_eq!(schema.field("age").unwrap().default_value(), 10);
    assert_eq!(schema.field("name").unwrap().default_value(), "parent");
    assert_eq!(schema.field("email").unwrap().help(), Some("Contact email"));

    // Ancestor registries are not affected.
    assert_eq!(
        ParentModel::schema().field("age").unwrap().default_value(),
        50
    );
    assert_eq!(OtherParentModel::schema().fields().len(), 2);

    let schema = GrandchildModel::schema();
    let ids: Vec<_> = schema.fields().map(|(id, _)| id).collect();
    assert_eq!(ids, ["age", "email", "name", "school", "toy"]);
    assert_eq!(schema.field("age").unwrap().default_value(), 10);
}

model! {
    struct FirstAncestor {
        value: Field::integer().with_default(1),
    }
}

model! {
    struct SecondAncestor {
        value: Field::integer().with_default(2),
        other: Field::boolean(),
    }
}

model! {
    struct MultiChild: FirstAncestor, SecondAncestor {}
}

#[test]
fn first_listed_ancestor_wins() {
    let schema = MultiChild::schema();
    assert_eq!(schema.fields().len(), 2);
    assert_eq!(schema.field("value").unwrap().default_value(), 1);
}

#[test]
fn resolving_fields() {
    let schema = PersonConfig::schema();
    let field = schema.resolve_field("info.age").unwrap();
    assert_eq!(field.kind_name(), "IntegerField");
    assert_eq!(field.default_value(), 21);
    assert_eq!(schema.resolve_field("name").unwrap().name(), "name");

    assert!(schema.resolve_field("").is_none());
    assert!(schema.resolve_field("info.height").is_none());
    assert!(schema.resolve_field("name.first").is_none());
    // Arrays are not traversed.
    assert!(schema.resolve_field("info.kids.name").is_none());
    assert!(schema.resolve_field("info.").is_none());
}

#[test]
fn describing_models() {
    let description = serde_json::to_value(KidConfig::schema().describe()).unwrap();
    assert_eq!(
        description,
        json!({
            "name": "KidConfig",
            "fields": {
                "age": {
                    "type": "IntegerField",
                    "name": "age",
                    "desc": null,
                    "extra": { "nullable": true, "default": null },
                },
                "name": {
                    "type": "StringField",
                    "name": "name",
                    "desc": null,
                    "extra": { "nullable": false, "default": null },
                },
            },
        })
    );

    let description = serde_json::to_value(PersonConfig::schema().describe()).unwrap();
    assert_eq!(description["help"], "Person configuration.");
    assert_eq!(description["fields"]["tags"]["extra"]["default"], json!(["default"]));
    let info = &description["fields"]["info"]["extra"]["model_info"];
    assert_eq!(info["help"], "Information about a person.");
    assert_eq!(info["fields"]["age"]["desc"], "Age in years.");
    assert_eq!(info["fields"]["age"]["extra"]["domain"], json!([1, 100]));
    let kids = &info["fields"]["kids"]["extra"]["element_info"];
    assert_eq!(kids["type"], "ModelField");
    assert_eq!(kids["extra"]["model_info"]["name"], "KidConfig");
}

#[test]
fn describing_empty_model() {
    let description = EmptyModel::schema().describe();
    assert!(description.fields.is_empty());
    assert_eq!(
        serde_json::to_value(description).unwrap(),
        json!({ "name": "EmptyModel", "fields": {} })
    );
}

#[derive(Debug)]
struct Dynamic;

impl Model for Dynamic {
    const NAME: &'static str = "Dynamic";

    fn schema() -> &'static ModelSchema {
        unreachable!("registry is built manually in tests")
    }
}

#[test]
fn building_registry_manually() {
    let schema = ModelSchema::builder::<Dynamic>()
        .help_lines(&[" First line.", "", " Second line. "])
        .extends::<ParentModel>()
        .field("count", Field::integer().with_default(3))
        .field_with_help("flag", Field::boolean(), &[" Flag help."])
        .field_with_help("label", Field::string().desc("Explicit"), &["Ignored"])
        .build()
        .unwrap();

    assert_eq!(schema.help(), "First line.\nSecond line.");
    let ids: Vec<_> = schema.fields().map(|(id, _)| id).collect();
    assert_eq!(ids, ["age", "count", "flag", "label", "name"]);
    assert_eq!(schema.field("flag").unwrap().help(), Some("Flag help."));
    assert_eq!(schema.field("label").unwrap().help(), Some("Explicit"));
    assert_eq!(schema.field("count").unwrap().default_value(), Value::Integer(3));
}

#[test]
fn invalid_identifier() {
    let err = ModelSchema::builder::<Dynamic>()
        .field("isWorking", Field::boolean())
        .build()
        .unwrap_err();
    let DefinitionError::Config(err) = err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(err.model(), Some("Dynamic"));
    assert_matches!(
        err.kind(),
        ConfigErrorKind::InvalidIdentifier { id, reason }
            if id == "isWorking" && reason.contains("disallowed char 'W'")
    );
}

#[test]
fn duplicate_field() {
    let err = ModelSchema::builder::<Dynamic>()
        .field("value", Field::boolean())
        .field("value", Field::integer())
        .build()
        .unwrap_err();
    let DefinitionError::Config(err) = err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(*err.kind(), ConfigErrorKind::DuplicateField("value".into()));
    assert_eq!(
        err.to_string(),
        "invalid definition of field `value` in model `Dynamic`: field `value` is declared twice"
    );
}

#[test]
fn field_errors_mention_model() {
    let err = ModelSchema::builder::<Dynamic>()
        .field("age", Field::builder(IntegerField::with_domain(5..=1)))
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid definition of field `age` in model `Dynamic`: \
         domain lower bound 5 is greater than the upper bound 1"
    );

    let err = ModelSchema::builder::<Dynamic>()
        .field("age", Field::integer().with_default("old"))
        .build()
        .unwrap_err();
    let DefinitionError::Default(err) = err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(err.path(), "age");
    assert_eq!(err.field(), Some("age"));

    let err = ModelSchema::builder::<Dynamic>()
        .field("age", Field::integer().name("Age").with_default("old"))
        .build()
        .unwrap_err();
    let DefinitionError::Default(err) = err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(err.path(), "age");
    assert_eq!(err.field(), Some("Age"));
}

model! {
    struct BrokenModel {
        age: Field::builder(IntegerField::with_domain(1..=10)).with_default(100),
    }
}

#[test]
#[should_panic(expected = "model `BrokenModel` is defined incorrectly")]
fn broken_model_panics_on_access() {
    BrokenModel::schema();
}
