//! Built-in field kinds.

use std::{collections::HashSet, ops::RangeInclusive};

use super::{BasicTypes, Field, FieldDetails, FieldKind};
use crate::{
    error::{ConfigError, ConfigErrorKind, ValidationError, Violation},
    instance::DumpOptions,
    schema::{Model, ModelSchema, RustType},
    value::{describe_plain, Value},
};

/// String field optionally restricted to a set of choices.
#[derive(Debug, Clone, Default)]
pub struct StringField {
    choices: Option<Vec<String>>,
}

impl StringField {
    /// Creates a string field accepting any string.
    pub const fn new() -> Self {
        Self { choices: None }
    }

    /// Creates a string field accepting only the specified choices. The set of choices must be non-empty
    /// and must not contain duplicates; this is checked when the field is built.
    pub fn with_choices<S: Into<String>>(choices: impl IntoIterator<Item = S>) -> Self {
        Self {
            choices: Some(choices.into_iter().map(Into::into).collect()),
        }
    }

    /// Returns the allowed choices, if any.
    pub fn choices(&self) -> Option<&[String]> {
        self.choices.as_deref()
    }
}

impl FieldKind for StringField {
    fn kind_name(&self) -> &'static str {
        "StringField"
    }

    fn expecting(&self) -> BasicTypes {
        BasicTypes::STRING
    }

    fn check_config(&self) -> Result<(), ConfigError> {
        let Some(choices) = &self.choices else {
            return Ok(());
        };
        if choices.is_empty() {
            return Err(ConfigErrorKind::EmptyChoices.into());
        }
        let mut seen = HashSet::with_capacity(choices.len());
        for choice in choices {
            if !seen.insert(choice.as_str()) {
                return Err(ConfigErrorKind::DuplicateChoice(choice.clone()).into());
            }
        }
        Ok(())
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Value::String(value) = value else {
            return Err(ValidationError::invalid_type(
                BasicTypes::STRING,
                value.describe(),
            ));
        };
        if let Some(choices) = &self.choices {
            if !choices.contains(value) {
                return Err(ValidationError::new(Violation::NotInChoices {
                    value: value.clone(),
                    choices: choices.clone(),
                }));
            }
        }
        Ok(())
    }

    fn describe(&self, details: &mut FieldDetails) {
        details.choices.clone_from(&self.choices);
    }
}

/// Boolean field.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanField;

impl FieldKind for BooleanField {
    fn kind_name(&self) -> &'static str {
        "BooleanField"
    }

    fn expecting(&self) -> BasicTypes {
        BasicTypes::BOOL
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::Bool(_) => Ok(()),
            _ => Err(ValidationError::invalid_type(
                BasicTypes::BOOL,
                value.describe(),
            )),
        }
    }
}

/// Integer field optionally restricted to an inclusive domain.
#[derive(Debug, Clone, Default)]
pub struct IntegerField {
    domain: Option<(i64, i64)>,
}

impl IntegerField {
    /// Creates an integer field accepting any integer.
    pub const fn new() -> Self {
        Self { domain: None }
    }

    /// Creates an integer field accepting only integers within the inclusive `domain`.
    /// The domain must not be inverted; this is checked when the field is built.
    pub fn with_domain(domain: RangeInclusive<i64>) -> Self {
        Self {
            domain: Some((*domain.start(), *domain.end())),
        }
    }

    /// Returns the inclusive domain, if any.
    pub fn domain(&self) -> Option<RangeInclusive<i64>> {
        self.domain.map(|(min, max)| min..=max)
    }
}

impl FieldKind for IntegerField {
    fn kind_name(&self) -> &'static str {
        "IntegerField"
    }

    fn expecting(&self) -> BasicTypes {
        BasicTypes::INTEGER
    }

    fn check_config(&self) -> Result<(), ConfigError> {
        match self.domain {
            Some((min, max)) if min > max => {
                Err(ConfigErrorKind::InvertedDomain { min, max }.into())
            }
            _ => Ok(()),
        }
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let &Value::Integer(value) = value else {
            return Err(ValidationError::invalid_type(
                BasicTypes::INTEGER,
                value.describe(),
            ));
        };
        if let Some((min, max)) = self.domain {
            if !(min..=max).contains(&value) {
                return Err(ValidationError::new(Violation::OutOfDomain {
                    value,
                    min,
                    max,
                }));
            }
        }
        Ok(())
    }

    fn describe(&self, details: &mut FieldDetails) {
        details.domain = self.domain;
    }
}

/// Array field with elements described by another field.
///
/// Elements are converted and validated by the element field. Validation errors for elements
/// have the element index as the leading path segment. Nested model elements are dumped as `{}`
/// if empty so that the array length is preserved.
#[derive(Debug, Clone)]
pub struct ArrayField {
    element: Field,
}

impl ArrayField {
    /// Creates an array field with the specified element field.
    pub fn new(element: Field) -> Self {
        Self { element }
    }

    /// Returns the element field.
    pub fn element(&self) -> &Field {
        &self.element
    }
}

impl FieldKind for ArrayField {
    fn kind_name(&self) -> &'static str {
        "ArrayField"
    }

    fn expecting(&self) -> BasicTypes {
        BasicTypes::ARRAY
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Value::Array(items) = value else {
            return Err(ValidationError::invalid_type(
                BasicTypes::ARRAY,
                value.describe(),
            ));
        };
        for (i, item) in items.iter().enumerate() {
            self.element
                .check(item)
                .map_err(|err| err.with_parent(&i.to_string()))?;
        }
        Ok(())
    }

    fn to_native(&self, plain: &serde_json::Value) -> Result<Value, ValidationError> {
        match plain {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Array(items) => {
                let items = items.iter().enumerate().map(|(i, item)| {
                    self.element
                        .to_native(item)
                        .map_err(|err| err.with_parent(&i.to_string()))
                });
                Ok(Value::Array(items.collect::<Result<_, _>>()?))
            }
            _ => Err(ValidationError::invalid_type(
                BasicTypes::ARRAY,
                describe_plain(plain),
            )),
        }
    }

    fn to_plain(&self, value: &Value, include_nulls: bool) -> serde_json::Value {
        let Value::Array(items) = value else {
            return value.to_plain(include_nulls);
        };
        let items = items.iter().map(|item| {
            let plain = self.element.to_plain(item, include_nulls);
            if plain.is_null() && matches!(item, Value::Model(_)) {
                serde_json::Value::Object(serde_json::Map::new())
            } else {
                plain
            }
        });
        items.collect()
    }

    fn describe(&self, details: &mut FieldDetails) {
        details.element_info = Some(Box::new(self.element.describe()));
    }
}

/// Field holding an instance of a nested model.
///
/// The default value of such a field is a fresh defaulted instance of the model. An empty nested
/// instance is dumped as null (i.e., omitted) unless nulls are requested explicitly.
#[derive(Debug, Clone, Copy)]
pub struct ModelField {
    ty: RustType,
    schema: fn() -> &'static ModelSchema,
}

impl ModelField {
    /// Creates a field for the model type `M`.
    pub fn new<M: Model>() -> Self {
        Self {
            ty: RustType::of::<M>(M::NAME),
            schema: M::schema,
        }
    }

    /// Returns the nested model registry.
    pub fn schema(&self) -> &'static ModelSchema {
        (self.schema)()
    }
}

impl FieldKind for ModelField {
    fn kind_name(&self) -> &'static str {
        "ModelField"
    }

    fn expecting(&self) -> BasicTypes {
        BasicTypes::OBJECT
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Value::Model(instance) = value else {
            return Err(ValidationError::invalid_type(
                BasicTypes::OBJECT,
                value.describe(),
            ));
        };
        let actual = instance.schema().ty();
        if actual != self.ty {
            return Err(ValidationError::new(Violation::ModelMismatch {
                expected: self.ty.name_in_code(),
                actual: actual.name_in_code(),
            }));
        }
        instance.validate().map_err(|errors| errors.into_first())
    }

    fn to_native(&self, plain: &serde_json::Value) -> Result<Value, ValidationError> {
        match plain {
            serde_json::Value::Null => Ok(self.schema().new_instance().into()),
            serde_json::Value::Object(_) => Ok(self.schema().load(plain)?.into()),
            _ => Err(ValidationError::invalid_type(
                BasicTypes::OBJECT,
                describe_plain(plain),
            )),
        }
    }

    fn to_plain(&self, value: &Value, include_nulls: bool) -> serde_json::Value {
        let Value::Model(instance) = value else {
            return value.to_plain(include_nulls);
        };
        let options = DumpOptions { include_nulls };
        let dumped = options.dump(instance);
        if dumped.is_empty() && !include_nulls {
            serde_json::Value::Null
        } else {
            dumped.into()
        }
    }

    fn implicit_default(&self) -> Option<Value> {
        Some(self.schema().new_instance().into())
    }

    fn nested_model(&self) -> Option<&'static ModelSchema> {
        Some(self.schema())
    }

    fn describe(&self, details: &mut FieldDetails) {
        details.model_info = Some(Box::new(self.schema().describe()));
    }
}
