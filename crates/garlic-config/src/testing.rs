//! Testing tools for model instances.

use crate::{
    error::ValidationErrors,
    instance::{DumpOptions, ModelInstance},
    schema::{Model, ModelSchema},
    value::Pointer,
};

/// Tests loading and validating a model instance from the provided sample.
///
/// # Errors
///
/// Propagates load and validation errors, which allows testing negative cases.
///
/// # Examples
///
/// ## Basic usage
///
/// ```
/// use garlic_config::{document, model, testing, Field};
///
/// model! {
///     pub struct TestConfig {
///         flag: Field::boolean().with_default(true),
///         size: Field::integer().required(),
///     }
/// }
///
/// let sample = document!("size": 64);
/// let config = testing::test::<TestConfig>(&sample)?;
/// assert_eq!(*config.get("flag").unwrap(), true);
/// assert_eq!(*config.get("size").unwrap(), 64);
/// # anyhow::Ok(())
/// ```
///
/// ## Testing errors
///
/// ```
/// use garlic_config::{document, model, testing, Field, Violation};
/// # use assert_matches::assert_matches;
///
/// model! {
///     pub struct TestConfig {
///         flag: Field::boolean().with_default(true),
///     }
/// }
///
/// let sample = document!("flag": "no");
/// let errors = testing::test::<TestConfig>(&sample).unwrap_err();
/// let err = errors.first();
/// assert_eq!(err.path(), "flag");
/// assert_matches!(err.violation(), Violation::InvalidType { .. });
/// ```
pub fn test<M: Model>(sample: &serde_json::Value) -> Result<ModelInstance, ValidationErrors> {
    let instance = M::load(sample)?;
    instance.validate()?;
    Ok(instance)
}

/// Tests loading and validating a model instance ensuring that *all* fields declared in the model
/// are covered by the sample. Fields of nested models are checked recursively if the sample contains
/// an object for the nested model.
///
/// # Panics
///
/// Panics if the `sample` doesn't recursively cover all fields in the model. The panic message
/// will contain paths to the missing fields.
///
/// # Errors
///
/// Propagates load and validation errors, which allows testing negative cases.
///
/// # Examples
///
/// ```should_panic
/// use garlic_config::{document, model, testing, Field};
///
/// model! {
///     pub struct TestConfig {
///         flag: Field::boolean().with_default(true),
///         size: Field::integer().required(),
///     }
/// }
///
/// let incomplete_sample = document!("size": 64);
/// // Will panic with a message detailing missing fields (`flag` in this case)
/// testing::test_complete::<TestConfig>(&incomplete_sample)?;
/// # anyhow::Ok(())
/// ```
#[track_caller] // necessary for assertion panics to be located in the test code, rather than in this crate
pub fn test_complete<M: Model>(
    sample: &serde_json::Value,
) -> Result<ModelInstance, ValidationErrors> {
    let mut missing_fields = vec![];
    collect_missing_fields(M::schema(), sample, "", &mut missing_fields);
    assert!(
        missing_fields.is_empty(),
        "missing fields in `{}`: {missing_fields:?}",
        M::NAME
    );
    test::<M>(sample)
}

fn collect_missing_fields(
    schema: &'static ModelSchema,
    sample: &serde_json::Value,
    prefix: &str,
    missing_fields: &mut Vec<String>,
) {
    for (id, field) in schema.fields() {
        let path = Pointer(prefix).join(id);
        match sample.get(id) {
            None => missing_fields.push(path),
            Some(value @ serde_json::Value::Object(_)) => {
                if let Some(nested) = field.kind().nested_model() {
                    collect_missing_fields(nested, value, &path, missing_fields);
                }
            }
            Some(_) => { /* leaf value is present */ }
        }
    }
}

/// Asserts that the instance survives dumping (with null values) and loading back.
///
/// A nested model field explicitly set to null is not preserved: loading `null` for a model field
/// produces a fresh instance with default values, so such instances fail this assertion.
///
/// # Panics
///
/// Panics if the dumped document cannot be loaded, or if the loaded instance differs from the original one.
#[track_caller]
pub fn assert_round_trip(instance: &ModelInstance) {
    let document = serde_json::Value::Object(DumpOptions::with_nulls().dump(instance));
    let loaded = match instance.schema().load(&document) {
        Ok(loaded) => loaded,
        Err(err) => panic!("failed loading dumped `{}`: {err}", instance.model_name()),
    };
    assert_eq!(
        loaded,
        *instance,
        "round trip changed `{}`; dumped document: {document}",
        instance.model_name()
    );
}
