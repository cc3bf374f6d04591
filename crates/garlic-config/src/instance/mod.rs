//! Model instances: live configuration objects.
//!
//! # Load policy
//!
//! Loading is *tolerant*: [`ModelSchema::load()`] only fails if the document is neither an object nor null.
//! Values present in the document are converted by the corresponding fields; if a conversion fails
//! (e.g., an array field is given a string), the failure is recorded on the instance and the field keeps
//! its default value. Missing fields keep their defaults, and unknown keys are ignored. All violations,
//! including missing required values, are reported by an explicit [`ModelInstance::validate()`] call.
//!
//! # Examples
//!
//! ```
//! use garlic_config::{document, field::IntegerField, model, Field, Model, Violation};
//! # use assert_matches::assert_matches;
//!
//! model! {
//!     pub struct Server {
//!         host: Field::string().required(),
//!         port: Field::builder(IntegerField::with_domain(1..=65_535)).with_default(8080),
//!     }
//! }
//!
//! let instance = Server::load(&document!("port": 100_000))?;
//! let errors = instance.validate().unwrap_err();
//! let messages: Vec<_> = errors.iter().map(|err| (err.path(), err.violation())).collect();
//! assert_matches!(
//!     messages.as_slice(),
//!     [("host", Violation::Null), ("port", Violation::OutOfDomain { value: 100_000, .. })]
//! );
//!
//! let mut instance = Server::load(&document!("host": "localhost"))?;
//! instance.validate()?;
//! // Assignments are checked by default.
//! assert!(instance.set("port", 0).is_err());
//! instance.set("port", 3000)?;
//! assert_eq!(
//!     serde_json::Value::from(instance.dump()),
//!     serde_json::json!({ "host": "localhost", "port": 3000 })
//! );
//! # anyhow::Ok(())
//! ```

use std::{collections::BTreeMap, fmt};

use crate::{
    error::{ValidationError, ValidationErrors, Violation},
    field::BasicTypes,
    schema::ModelSchema,
    value::{describe_plain, JsonObject, Pointer, Value},
};


/// Mode of assigning values to fields of a [`ModelInstance`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AssignmentMode {
    /// Values are validated before being assigned; invalid values are rejected.
    #[default]
    Checked,
    /// Values are assigned without validation. Violations are reported by [`ModelInstance::validate()`].
    Deferred,
}

/// Options for dumping model instances into plain documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct DumpOptions {
    /// Include fields with null values, and empty nested models. If not set, such fields are omitted.
    pub include_nulls: bool,
}

impl DumpOptions {
    /// Creates options that keep null values.
    pub const fn with_nulls() -> Self {
        Self {
            include_nulls: true,
        }
    }

    /// Dumps the instance into a plain document.
    pub fn dump(self, instance: &ModelInstance) -> JsonObject {
        let mut output = JsonObject::new();
        for (id, field) in instance.schema.fields() {
            let plain = field.to_plain(instance.value(id), self.include_nulls);
            if self.include_nulls || !plain.is_null() {
                output.insert(id.to_owned(), plain);
            }
        }
        output
    }
}

/// Live configuration object holding one value per field of its model registry.
#[derive(Clone)]
pub struct ModelInstance {
    schema: &'static ModelSchema,
    values: BTreeMap<String, Value>,
    mode: AssignmentMode,
    load_errors: BTreeMap<String, ValidationError>,
}

impl fmt::Debug for ModelInstance {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ModelInstance")
            .field("model", &self.schema.name())
            .field("values", &self.values)
            .field("mode", &self.mode)
            .field("load_errors", &self.load_errors)
            .finish()
    }
}

/// Compares model types and field values. Assignment modes and recorded load errors are not compared.
impl PartialEq for ModelInstance {
    fn eq(&self, other: &Self) -> bool {
        self.schema.ty() == other.schema.ty() && self.values == other.values
    }
}

impl ModelSchema {
    /// Creates an instance with all fields set to their defaults.
    pub fn new_instance(&'static self) -> ModelInstance {
        ModelInstance {
            schema: self,
            values: self
                .fields()
                .map(|(id, field)| (id.to_owned(), field.default_value()))
                .collect(),
            mode: AssignmentMode::default(),
            load_errors: BTreeMap::new(),
        }
    }

    /// Loads an instance from a plain document. Null documents produce a defaulted instance.
    /// See the [module docs](crate::instance#load-policy) for the load policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is neither an object nor null.
    #[tracing::instrument(level = "debug", skip_all, fields(model = self.name()))]
    pub fn load(&'static self, document: &serde_json::Value) -> Result<ModelInstance, ValidationError> {
        let object = match document {
            serde_json::Value::Null => return Ok(self.new_instance()),
            serde_json::Value::Object(object) => object,
            _ => {
                return Err(ValidationError::invalid_type(
                    BasicTypes::OBJECT,
                    describe_plain(document),
                ));
            }
        };

        let mut instance = self.new_instance();
        for (key, plain) in object {
            let Some(field) = self.field(key) else {
                tracing::trace!(key, "Ignoring key not present in the registry");
                continue;
            };
            match field.to_native(plain) {
                Ok(value) => {
                    instance.values.insert(key.clone(), value);
                }
                Err(err) => {
                    tracing::debug!(key, %err, "Failed converting value; keeping the default");
                    instance.load_errors.insert(key.clone(), err);
                }
            }
        }
        Ok(instance)
    }
}

impl ModelInstance {
    /// Returns the model registry of this instance.
    pub fn schema(&self) -> &'static ModelSchema {
        self.schema
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &'static str {
        self.schema.name()
    }

    /// Returns the current assignment mode.
    pub fn mode(&self) -> AssignmentMode {
        self.mode
    }

    /// Sets the assignment mode, returning the modified instance.
    #[must_use]
    pub fn with_mode(mut self, mode: AssignmentMode) -> Self {
        self.set_mode(mode);
        self
    }

    /// Sets the assignment mode for this instance and all nested model instances.
    pub fn set_mode(&mut self, mode: AssignmentMode) {
        self.mode = mode;
        for value in self.values.values_mut() {
            set_nested_mode(value, mode);
        }
    }

    /// Returns the current value of a field. Returns `None` if the model has no such field.
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    /// Returns a nested model instance held by a field.
    pub fn get_model(&self, id: &str) -> Option<&ModelInstance> {
        self.values.get(id)?.as_model()
    }

    /// Returns a mutable reference to a nested model instance held by a field.
    ///
    /// A failure recorded for the field while loading is discarded, since the nested instance
    /// may be repaired through the returned reference; it is validated on its own afterwards.
    pub fn get_model_mut(&mut self, id: &str) -> Option<&mut ModelInstance> {
        let instance = self.values.get_mut(id)?.as_model_mut()?;
        self.load_errors.remove(id);
        Some(instance)
    }

    fn value(&self, id: &str) -> &Value {
        self.values.get(id).unwrap_or(&Value::Null)
    }

    /// Assigns a value to a field. In the [checked](AssignmentMode::Checked) mode, the value is validated
    /// before being committed.
    ///
    /// # Errors
    ///
    /// - Returns an error if the model has no field with the specified identifier.
    /// - In the checked mode, returns an error if the value fails validation; the instance is not modified
    ///   in this case.
    pub fn set(&mut self, id: &str, value: impl Into<Value>) -> Result<(), ValidationError> {
        let value = value.into();
        if self.mode == AssignmentMode::Checked {
            let field = self.field(id)?;
            field.check(&value).map_err(|err| err.with_parent(id))?;
        }
        self.set_unchecked(id, value)
    }

    /// Assigns a value to a field without validation, regardless of the assignment mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the model has no field with the specified identifier.
    pub fn set_unchecked(&mut self, id: &str, value: impl Into<Value>) -> Result<(), ValidationError> {
        self.field(id)?;
        let mut value = value.into();
        set_nested_mode(&mut value, self.mode);
        self.load_errors.remove(id);
        self.values.insert(id.to_owned(), value);
        Ok(())
    }

    fn field(&self, id: &str) -> Result<&'static crate::Field, ValidationError> {
        self.schema
            .field(id)
            .ok_or_else(|| ValidationError::new(Violation::UnknownField(id.to_owned())).with_parent(id))
    }

    /// Resolves a dot-separated path to a value, walking through nested models and array indices.
    /// Returns `None` for an empty path or if any segment cannot be resolved.
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        let mut segments = Pointer(path).segments();
        let mut value = self.values.get(segments.next()?)?;
        for segment in segments {
            value = match value {
                Value::Model(instance) => instance.values.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(value)
    }

    /// Dumps this instance into a plain document omitting null values and empty nested models.
    /// Use [`DumpOptions`] to customize dumping.
    pub fn dump(&self) -> JsonObject {
        DumpOptions::default().dump(self)
    }

    /// Validates all fields of this instance: checks nullability and field rules of current values,
    /// and reports failures recorded while loading.
    ///
    /// # Errors
    ///
    /// Returns all violations, at most one per field. Violations inside nested models are reported
    /// with the full dotted path; a nested model contributes its first violation.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for (id, field) in self.schema.fields() {
            let result = match self.load_errors.get(id) {
                Some(err) => Err(err.clone()),
                None => field.check(self.value(id)),
            };
            if let Err(err) = result {
                errors.push(err.with_parent(id));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::warn!(
                model = self.model_name(),
                error_count = errors.len(),
                "Model instance failed validation"
            );
            Err(errors)
        }
    }
}

fn set_nested_mode(value: &mut Value, mode: AssignmentMode) {
    match value {
        Value::Model(instance) => instance.set_mode(mode),
        Value::Array(items) => {
            for item in items {
                set_nested_mode(item, mode);
            }
        }
        _ => { /* no nested instances */ }
    }
}
