//! Definition and validation errors.

use std::fmt;

use crate::field::BasicTypes;

/// Kind of a [`ConfigError`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigErrorKind {
    /// String field with an empty set of choices.
    EmptyChoices,
    /// String field with a choice mentioned more than once.
    DuplicateChoice(String),
    /// Integer field with a domain whose lower bound exceeds its upper bound.
    InvertedDomain {
        /// Lower bound of the domain.
        min: i64,
        /// Upper bound of the domain.
        max: i64,
    },
    /// Field identifier that cannot be used in a model registry.
    InvalidIdentifier {
        /// Offending identifier.
        id: String,
        /// Human-readable reason.
        reason: String,
    },
    /// Field declared more than once on the same model.
    DuplicateField(String),
    /// Custom error raised by a user-defined field kind.
    Custom(String),
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyChoices => formatter.write_str("choices cannot be empty"),
            Self::DuplicateChoice(choice) => {
                write!(formatter, "choice '{choice}' is specified more than once")
            }
            Self::InvertedDomain { min, max } => write!(
                formatter,
                "domain lower bound {min} is greater than the upper bound {max}"
            ),
            Self::InvalidIdentifier { id, reason } => {
                write!(formatter, "identifier `{id}` is invalid: {reason}")
            }
            Self::DuplicateField(id) => write!(formatter, "field `{id}` is declared twice"),
            Self::Custom(message) => formatter.write_str(message),
        }
    }
}

/// Malformed field or model definition. Such errors are raised when a field or a model registry
/// is constructed and are not recoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    model: Option<&'static str>,
    field: Option<String>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self
            .field
            .as_ref()
            .map_or_else(String::new, |field| format!(" of field `{field}`"));
        let model = self
            .model
            .map_or_else(String::new, |model| format!(" in model `{model}`"));
        write!(
            formatter,
            "invalid definition{field}{model}: {kind}",
            kind = self.kind
        )
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigErrorKind> for ConfigError {
    fn from(kind: ConfigErrorKind) -> Self {
        Self {
            kind,
            model: None,
            field: None,
        }
    }
}

impl ConfigError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }

    /// Returns the name of the model being defined, if known.
    pub fn model(&self) -> Option<&'static str> {
        self.model
    }

    /// Returns the identifier or display name of the malformed field, if known.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub(crate) fn for_field(mut self, field: &str) -> Self {
        if self.field.is_none() {
            self.field = Some(field.to_owned());
        }
        self
    }

    pub(crate) fn in_model(mut self, model: &'static str) -> Self {
        if self.model.is_none() {
            self.model = Some(model);
        }
        self
    }
}

/// Specific rule violated by a value.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Violation {
    /// Value is null, but the field is not nullable.
    Null,
    /// Value has an unexpected type.
    InvalidType {
        /// Expected basic type(s).
        expected: BasicTypes,
        /// Description of the actual value.
        actual: String,
    },
    /// String value is not one of the allowed choices.
    NotInChoices {
        /// Offending value.
        value: String,
        /// Allowed choices.
        choices: Vec<String>,
    },
    /// Integer value is outside the inclusive domain.
    OutOfDomain {
        /// Offending value.
        value: i64,
        /// Lower bound of the domain.
        min: i64,
        /// Upper bound of the domain.
        max: i64,
    },
    /// Model instance has a different model type than the one declared by the field.
    ModelMismatch {
        /// Declared model type.
        expected: &'static str,
        /// Model type of the provided instance.
        actual: &'static str,
    },
    /// Field with the specified identifier is not present in the model registry.
    UnknownField(String),
    /// Custom violation raised by a user-defined field kind.
    Custom(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => formatter.write_str("value is not allowed to be null"),
            Self::InvalidType { expected, actual } => {
                write!(formatter, "expected {expected}, got {actual}")
            }
            Self::NotInChoices { value, choices } => write!(
                formatter,
                "given value '{value}' is not accepted; choices are '{}'",
                choices.join("', '")
            ),
            Self::OutOfDomain { value, min, max } => write!(
                formatter,
                "value {value} is outside the allowed domain [{min}, {max}]"
            ),
            Self::ModelMismatch { expected, actual } => write!(
                formatter,
                "expected an instance of model `{expected}`, got an instance of `{actual}`"
            ),
            Self::UnknownField(id) => write!(formatter, "model has no field `{id}`"),
            Self::Custom(message) => formatter.write_str(message),
        }
    }
}

/// Error validating a configuration value against a field.
///
/// Carries the field display name and the dotted path to the value relative to the validated
/// model instance (e.g., `info.kids.0.name`).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    violation: Violation,
    field: Option<String>,
    path: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self
            .field
            .as_ref()
            .map_or_else(|| "value".to_owned(), |field| format!("field `{field}`"));
        let at = if self.path.is_empty() {
            String::new()
        } else {
            format!(" at `{}`", self.path)
        };
        write!(formatter, "invalid {field}{at}: {}", self.violation)
    }
}

impl std::error::Error for ValidationError {}

impl From<Violation> for ValidationError {
    fn from(violation: Violation) -> Self {
        Self::new(violation)
    }
}

impl ValidationError {
    /// Creates an error with the specified violation.
    pub fn new(violation: Violation) -> Self {
        Self {
            violation,
            field: None,
            path: String::new(),
        }
    }

    /// Creates an error with a custom message.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(Violation::Custom(message.into()))
    }

    pub(crate) fn invalid_type(expected: BasicTypes, actual: String) -> Self {
        Self::new(Violation::InvalidType { expected, actual })
    }

    /// Returns the violated rule.
    pub fn violation(&self) -> &Violation {
        &self.violation
    }

    /// Returns the display name of the field that has failed validation, if known.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the dotted path to the invalid value. Empty if the error concerns the root value.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn for_field(mut self, name: &str) -> Self {
        if self.field.is_none() {
            self.field = Some(name.to_owned());
        }
        self
    }

    /// Prepends `segment` to the error path.
    pub(crate) fn with_parent(mut self, segment: &str) -> Self {
        self.path = if self.path.is_empty() {
            segment.to_owned()
        } else {
            format!("{segment}.{}", self.path)
        };
        self
    }
}

/// Collection of [`ValidationError`]s produced by validating a model instance.
/// Contains at least one error.
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub(crate) fn push(&mut self, err: ValidationError) {
        self.errors.push(err);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> + '_ {
        self.errors.iter()
    }

    /// Returns the number of contained errors.
    #[allow(clippy::len_without_is_empty)] // is_empty should always return false
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns the first error.
    ///
    /// # Panics
    ///
    /// Panics if the collection is empty, which cannot happen for errors returned from the library.
    pub fn first(&self) -> &ValidationError {
        self.errors.first().expect("no errors")
    }

    pub(crate) fn into_first(self) -> ValidationError {
        self.errors.into_iter().next().expect("no errors")
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(err: ValidationError) -> Self {
        Self { errors: vec![err] }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for err in &self.errors {
            writeln!(formatter, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Error defining a field or a model.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DefinitionError {
    /// Field or model configuration is malformed.
    Config(ConfigError),
    /// Default value of a field fails the field validation.
    Default(ValidationError),
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => fmt::Display::fmt(err, formatter),
            Self::Default(err) => write!(formatter, "invalid default value: {err}"),
        }
    }
}

impl std::error::Error for DefinitionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(match self {
            Self::Config(err) => err,
            Self::Default(err) => err,
        })
    }
}

impl From<ConfigError> for DefinitionError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<ValidationError> for DefinitionError {
    fn from(err: ValidationError) -> Self {
        Self::Default(err)
    }
}

impl DefinitionError {
    pub(crate) fn in_model(self, model: &'static str, id: &str) -> Self {
        match self {
            Self::Config(err) => Self::Config(err.for_field(id).in_model(model)),
            Self::Default(err) => Self::Default(err.with_parent(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displaying_validation_errors() {
        let err = ValidationError::new(Violation::OutOfDomain {
            value: 101,
            min: 1,
            max: 100,
        })
        .for_field("Age")
        .with_parent("age")
        .with_parent("info");
        assert_eq!(err.path(), "info.age");
        assert_eq!(
            err.to_string(),
            "invalid field `Age` at `info.age`: value 101 is outside the allowed domain [1, 100]"
        );

        let err = ValidationError::new(Violation::NotInChoices {
            value: "something".into(),
            choices: vec!["value1".into(), "value2".into()],
        });
        assert_eq!(
            err.to_string(),
            "invalid value: given value 'something' is not accepted; choices are 'value1', 'value2'"
        );
    }

    #[test]
    fn field_name_is_not_overwritten() {
        let err = ValidationError::new(Violation::Null)
            .for_field("inner")
            .for_field("outer");
        assert_eq!(err.field(), Some("inner"));
    }

    #[test]
    fn displaying_config_errors() {
        let err = ConfigError::from(ConfigErrorKind::InvertedDomain { min: 10, max: 1 })
            .for_field("age")
            .in_model("Person");
        assert_eq!(
            err.to_string(),
            "invalid definition of field `age` in model `Person`: \
             domain lower bound 10 is greater than the upper bound 1"
        );
    }
}
