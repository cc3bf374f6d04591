//! Field descriptors.
//!
//! A [`Field`] is a typed, self-validating descriptor of a single configuration attribute. It owns
//! a display name, a description, a nullability flag and a default value; the type-specific behavior
//! (validation, conversion between plain and native values, description) is delegated to a [`FieldKind`].
//!
//! # Built-in kinds
//!
//! | Kind | Native value | Validation |
//! |:-----|:-------------|:-----------|
//! | [`StringField`] | [`Value::String`] | Must be a string; if choices are set, must be one of them |
//! | [`BooleanField`] | [`Value::Bool`] | Must be a Boolean |
//! | [`IntegerField`] | [`Value::Integer`] | Must be an integer; if a domain is set, must be within it (inclusive) |
//! | [`ArrayField`] | [`Value::Array`] | Every element must pass validation of the element field |
//! | [`ModelField`] | [`Value::Model`] | Must be an instance of exactly the declared model type |
//!
//! # Examples
//!
//! ```
//! use garlic_config::{field::{IntegerField, StringField}, Field, Value};
//!
//! let field = Field::builder(IntegerField::with_domain(1..=100))
//!     .with_default(50)
//!     .required()
//!     .build()?;
//! field.check(&Value::Integer(100))?;
//! assert!(field.check(&Value::Integer(101)).is_err());
//! assert!(field.check(&Value::Null).is_err());
//!
//! let field = Field::builder(StringField::with_choices(["value1", "value2"]))
//!     .with_default("value1")
//!     .build()?;
//! assert!(field.check(&"something".into()).is_err());
//! # anyhow::Ok(())
//! ```

use std::{fmt, sync::Arc};

use serde::Serialize;

pub use self::kinds::{ArrayField, BooleanField, IntegerField, ModelField, StringField};
use crate::{
    error::{ConfigError, DefinitionError, ValidationError, Violation},
    schema::{ModelDescription, ModelSchema},
    value::Value,
};

mod kinds;

/// Set of one or more basic types in the JSON object model.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BasicTypes(u8);

impl BasicTypes {
    /// Boolean value.
    pub const BOOL: Self = Self(1);
    /// Integer value.
    pub const INTEGER: Self = Self(2);
    /// String.
    pub const STRING: Self = Self(4);
    /// Array of values.
    pub const ARRAY: Self = Self(8);
    /// Object / map of values.
    pub const OBJECT: Self = Self(16);
    /// Any value.
    pub const ANY: Self = Self(31);

    const COMPONENTS: &'static [(Self, &'static str)] = &[
        (Self::BOOL, "Boolean"),
        (Self::INTEGER, "integer"),
        (Self::STRING, "string"),
        (Self::ARRAY, "array"),
        (Self::OBJECT, "object"),
    ];

    /// Returns a union of two sets of basic types.
    #[must_use]
    pub const fn or(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }

    /// Checks whether the `needle` is fully contained in this set.
    pub const fn contains(self, needle: Self) -> bool {
        self.0 & needle.0 == needle.0
    }
}

impl fmt::Display for BasicTypes {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ANY {
            formatter.write_str("any")
        } else {
            let mut is_empty = true;
            for &(component, name) in Self::COMPONENTS {
                if self.contains(component) {
                    if !is_empty {
                        formatter.write_str(" | ")?;
                    }
                    formatter.write_str(name)?;
                    is_empty = false;
                }
            }
            Ok(())
        }
    }
}

impl fmt::Debug for BasicTypes {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, formatter)
    }
}

/// Type-specific behavior of a [`Field`].
///
/// The built-in kinds are listed in the [module docs](self). Custom kinds can be defined
/// by implementing this trait and passing the kind to [`Field::builder()`].
///
/// # Examples
///
/// ```
/// use garlic_config::{
///     field::{BasicTypes, FieldKind}, Field, ValidationError, Value,
/// };
///
/// /// Accepts only even integers.
/// #[derive(Debug)]
/// struct EvenField;
///
/// impl FieldKind for EvenField {
///     fn kind_name(&self) -> &'static str {
///         "EvenField"
///     }
///
///     fn expecting(&self) -> BasicTypes {
///         BasicTypes::INTEGER
///     }
///
///     fn validate(&self, value: &Value) -> Result<(), ValidationError> {
///         match value.as_integer() {
///             Some(value) if value % 2 == 0 => Ok(()),
///             _ => Err(ValidationError::custom(format!("{value} is not an even integer"))),
///         }
///     }
/// }
///
/// let field = Field::builder(EvenField).with_default(2).build()?;
/// assert!(field.check(&Value::Null).is_ok()); // fields are nullable by default
/// assert!(field.check(&Value::Integer(3)).is_err());
/// assert!(Field::builder(EvenField).with_default(1).build().is_err());
/// # anyhow::Ok(())
/// ```
pub trait FieldKind: fmt::Debug + Send + Sync + 'static {
    /// Name of this kind used in descriptions (e.g., `StringField`). Also used as the display name
    /// of fields that were not given a name, such as array elements.
    fn kind_name(&self) -> &'static str;

    /// Basic type(s) of plain values accepted by this kind.
    fn expecting(&self) -> BasicTypes;

    /// Checks kind configuration. Called once when a field is built.
    ///
    /// # Errors
    ///
    /// Should return an error if the configuration is malformed.
    fn check_config(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Validates a non-null native value.
    ///
    /// # Errors
    ///
    /// Should return an error if the value violates kind rules.
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;

    /// Converts a plain value to the native representation. The default implementation maps scalars
    /// to their native counterparts without checking types; type checks are performed by [`Self::validate()`].
    ///
    /// # Errors
    ///
    /// Should return an error if the plain value has a shape that cannot be represented natively.
    fn to_native(&self, plain: &serde_json::Value) -> Result<Value, ValidationError> {
        Ok(Value::from_plain_scalar(plain))
    }

    /// Converts a native value to the plain representation. Returning `null` signals the caller
    /// to omit the value unless `include_nulls` is set.
    fn to_plain(&self, value: &Value, include_nulls: bool) -> serde_json::Value {
        value.to_plain(include_nulls)
    }

    /// Default value used if a field of this kind has no explicit default.
    fn implicit_default(&self) -> Option<Value> {
        None
    }

    /// Returns the model registry if this kind holds nested model instances.
    fn nested_model(&self) -> Option<&'static ModelSchema> {
        None
    }

    /// Adds kind-specific details to the field description.
    fn describe(&self, details: &mut FieldDetails) {
        let _ = details;
    }
}

/// Typed, self-validating descriptor of a configuration attribute.
///
/// Fields are created with [`FieldBuilder`]s. Once built, a field is immutable; model registries
/// share fields among all instances of a model.
#[derive(Debug, Clone)]
pub struct Field {
    name: Option<String>,
    help: Option<String>,
    nullable: bool,
    default: Value,
    kind: Arc<dyn FieldKind>,
}

impl Field {
    /// Starts building a field of the specified kind.
    pub fn builder(kind: impl FieldKind) -> FieldBuilder {
        FieldBuilder::new(Ok(Arc::new(kind)))
    }

    /// Starts building a [`StringField`] without choices.
    pub fn string() -> FieldBuilder {
        Self::builder(StringField::new())
    }

    /// Starts building a [`BooleanField`].
    pub fn boolean() -> FieldBuilder {
        Self::builder(BooleanField)
    }

    /// Starts building an [`IntegerField`] without a domain.
    pub fn integer() -> FieldBuilder {
        Self::builder(IntegerField::new())
    }

    /// Starts building an [`ArrayField`] with the specified element field. If the element field
    /// cannot be built, the error is reported by [`FieldBuilder::build()`].
    pub fn array(element: FieldBuilder) -> FieldBuilder {
        let kind = element
            .build()
            .map(|element| Arc::new(ArrayField::new(element)) as Arc<dyn FieldKind>);
        FieldBuilder::new(kind)
    }

    /// Starts building a [`ModelField`] for the model type `M`.
    pub fn model<M: crate::Model>() -> FieldBuilder {
        Self::builder(ModelField::new::<M>())
    }

    /// Returns the display name of this field. If the name was not set explicitly, it's equal
    /// to the field identifier in the model registry, or to the kind name for standalone fields.
    pub fn name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.kind.kind_name())
    }

    /// Returns the human-readable description of this field.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Checks whether this field may hold null values.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns the field kind.
    pub fn kind(&self) -> &dyn FieldKind {
        self.kind.as_ref()
    }

    /// Returns the name of the field kind.
    pub fn kind_name(&self) -> &'static str {
        self.kind.kind_name()
    }

    /// Returns the default value for this field. Nested model fields produce a fresh defaulted instance.
    pub fn default_value(&self) -> Value {
        if self.default.is_null() {
            self.kind.implicit_default().unwrap_or_default()
        } else {
            self.default.clone()
        }
    }

    /// Runs the full validation of a value: null check followed by kind validation for non-null values.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is null for a non-nullable field, or if it violates kind rules.
    pub fn check(&self, value: &Value) -> Result<(), ValidationError> {
        if value.is_null() {
            if self.nullable {
                Ok(())
            } else {
                Err(ValidationError::new(Violation::Null).for_field(self.name()))
            }
        } else {
            self.validate(value)
        }
    }

    /// Validates a non-null value according to the field kind. Use [`Self::check()`]
    /// to validate values that may be null.
    ///
    /// # Errors
    ///
    /// Returns an error if the value violates kind rules.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self.kind
            .validate(value)
            .map_err(|err| err.for_field(self.name()))
    }

    /// Converts a plain value into the native representation of this field.
    ///
    /// # Errors
    ///
    /// Returns an error if the plain value has a shape incompatible with the field (e.g., a non-array
    /// value for an array field).
    pub fn to_native(&self, plain: &serde_json::Value) -> Result<Value, ValidationError> {
        self.kind
            .to_native(plain)
            .map_err(|err| err.for_field(self.name()))
    }

    /// Converts a native value into the plain representation. Returns `null` if the value is null
    /// or empty and `include_nulls` is not set.
    pub fn to_plain(&self, value: &Value, include_nulls: bool) -> serde_json::Value {
        if value.is_null() {
            serde_json::Value::Null
        } else {
            self.kind.to_plain(value, include_nulls)
        }
    }

    /// Produces a structural description of this field.
    pub fn describe(&self) -> FieldDescription {
        let mut extra = FieldDetails {
            nullable: self.nullable,
            default: self.to_plain(&self.default_value(), false),
            ..FieldDetails::default()
        };
        self.kind.describe(&mut extra);
        FieldDescription {
            kind: self.kind.kind_name(),
            expecting: self.kind.expecting(),
            name: self.name().to_owned(),
            desc: self.help.clone(),
            extra,
        }
    }
}

/// Builder of [`Field`]s.
///
/// By default, the built field is nullable, has a null default and no description.
#[derive(Debug)]
#[must_use = "field builders do nothing unless built"]
pub struct FieldBuilder {
    kind: Result<Arc<dyn FieldKind>, DefinitionError>,
    name: Option<String>,
    help: Option<String>,
    nullable: bool,
    default: Value,
}

impl FieldBuilder {
    fn new(kind: Result<Arc<dyn FieldKind>, DefinitionError>) -> Self {
        Self {
            kind,
            name: None,
            help: None,
            nullable: true,
            default: Value::Null,
        }
    }

    /// Sets the display name of the field.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the human-readable description of the field.
    pub fn desc(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Sets whether the field may hold null values.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Marks the field as non-nullable.
    pub fn required(self) -> Self {
        self.nullable(false)
    }

    /// Sets the default value of the field.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// Fills in the display name and description from the registry if they are not set explicitly.
    pub(crate) fn registered_as(mut self, id: &str, doc_help: Option<String>) -> Self {
        if self.name.is_none() {
            self.name = Some(id.to_owned());
        }
        if self.help.is_none() {
            self.help = doc_help;
        }
        self
    }

    /// Builds the field.
    ///
    /// A null default is accepted even for non-nullable fields; such a field is reported
    /// when validating a model instance which doesn't provide a value for it.
    ///
    /// # Errors
    ///
    /// - Returns [`DefinitionError::Config`] if the kind configuration is malformed.
    /// - Returns [`DefinitionError::Default`] if the non-null default value fails validation.
    pub fn build(self) -> Result<Field, DefinitionError> {
        let kind = self.kind?;
        let display_name = self.name.as_deref().unwrap_or_else(|| kind.kind_name());
        kind.check_config()
            .map_err(|err| err.for_field(display_name))?;
        if !self.default.is_null() {
            kind.validate(&self.default)
                .map_err(|err| err.for_field(display_name))?;
        }

        Ok(Field {
            name: self.name,
            help: self.help,
            nullable: self.nullable,
            default: self.default,
            kind,
        })
    }
}

/// Structural description of a [`Field`] produced by [`Field::describe()`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescription {
    /// Kind name (e.g., `StringField`).
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Basic types of plain values accepted by the field.
    #[serde(skip)]
    pub expecting: BasicTypes,
    /// Display name.
    pub name: String,
    /// Human-readable description.
    pub desc: Option<String>,
    /// Nullability, default and kind-specific details.
    pub extra: FieldDetails,
}

/// Details of a [`FieldDescription`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[non_exhaustive]
pub struct FieldDetails {
    /// Whether the field may hold null values.
    pub nullable: bool,
    /// Default value in the plain representation.
    pub default: serde_json::Value,
    /// Allowed choices for string fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    /// Inclusive domain for integer fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<(i64, i64)>,
    /// Description of the element field for array fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_info: Option<Box<FieldDescription>>,
    /// Description of the nested model for model fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_info: Option<Box<ModelDescription>>,
}
