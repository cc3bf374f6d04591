//! Model registries.
//!
//! Each model type has an associated [`ModelSchema`] (the *registry*): an immutable table mapping
//! field identifiers to [`Field`] descriptors. Registries are usually defined with the [`model!`](crate::model)
//! macro, which builds the registry once on first access; [`ModelSchemaBuilder`] is the underlying
//! runtime API.
//!
//! # Inheritance
//!
//! A model may extend one or more ancestor models. The registry of such a model is the union of
//! its own fields and the fields of all ancestors; a field declared on the model itself always wins
//! over an ancestor field with the same identifier. If several ancestors declare the same field,
//! the ancestor listed first wins.
//!
//! # Examples
//!
//! ```
//! use garlic_config::{field::IntegerField, model, Field, Model};
//!
//! model! {
//!     /// Information about a person.
//!     pub struct Person {
//!         /// Full name.
//!         name: Field::string().required(),
//!         age: Field::builder(IntegerField::with_domain(0..=150)).with_default(30),
//!     }
//! }
//!
//! model! {
//!     pub struct Kid: Person {
//!         /// Kids are younger by default.
//!         age: Field::builder(IntegerField::with_domain(0..=17)).with_default(5),
//!     }
//! }
//!
//! let schema = Kid::schema();
//! assert_eq!(schema.name(), "Kid");
//! let ids: Vec<_> = schema.fields().map(|(id, _)| id).collect();
//! assert_eq!(ids, ["age", "name"]);
//! assert_eq!(schema.field("age").unwrap().default_value(), 5);
//! assert_eq!(schema.field("name").unwrap().help(), Some("Full name."));
//! ```

use std::{any, collections::BTreeMap, fmt};

use serde::Serialize;

use crate::{
    error::{ConfigError, ConfigErrorKind, DefinitionError, ValidationError},
    field::{Field, FieldBuilder, FieldDescription},
    instance::ModelInstance,
    value::Pointer,
};

#[doc(hidden)] // used by macros
pub mod _private;
#[cfg(test)]
mod tests;

/// Model type with an associated registry.
///
/// This trait is usually implemented with the [`model!`](crate::model) macro.
pub trait Model: 'static + Send + Sync {
    /// Name of the model.
    const NAME: &'static str;

    /// Returns the model registry. The registry is built once and is shared by all instances.
    fn schema() -> &'static ModelSchema;

    /// Creates an instance with all fields set to their defaults.
    fn new_instance() -> ModelInstance {
        Self::schema().new_instance()
    }

    /// Loads an instance from a plain document. See [`ModelSchema::load()`] for details.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is neither an object nor null.
    fn load(document: &serde_json::Value) -> Result<ModelInstance, ValidationError> {
        Self::schema().load(document)
    }
}

/// Representation of a Rust type.
#[derive(Clone, Copy)]
pub struct RustType {
    id: fn() -> any::TypeId,
    name_in_code: &'static str,
}

impl fmt::Debug for RustType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name_in_code)
    }
}

impl PartialEq for RustType {
    fn eq(&self, other: &Self) -> bool {
        (self.id)() == (other.id)()
    }
}

impl RustType {
    /// Creates a new type.
    pub const fn of<T: 'static>(name_in_code: &'static str) -> Self {
        Self {
            id: any::TypeId::of::<T>,
            name_in_code,
        }
    }

    /// Returns the unique ID of this type.
    pub fn id(&self) -> any::TypeId {
        (self.id)()
    }

    /// Returns the name of this type as specified in code.
    pub const fn name_in_code(&self) -> &'static str {
        self.name_in_code
    }
}

/// Registry of a model type: an immutable table of fields keyed by identifiers.
#[derive(Debug)]
pub struct ModelSchema {
    ty: RustType,
    help: String,
    ancestors: Vec<&'static ModelSchema>,
    fields: BTreeMap<String, Field>,
}

impl ModelSchema {
    /// Starts building a registry for the model type `M`.
    pub fn builder<M: Model>() -> ModelSchemaBuilder {
        ModelSchemaBuilder {
            ty: RustType::of::<M>(M::NAME),
            help: String::new(),
            ancestors: vec![],
            fields: vec![],
        }
    }

    /// Returns the model name.
    pub fn name(&self) -> &'static str {
        self.ty.name_in_code()
    }

    /// Returns the model type.
    pub fn ty(&self) -> RustType {
        self.ty
    }

    /// Returns the human-readable model description. Empty if not specified.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Returns direct ancestors of the model in the declaration order.
    pub fn ancestors(&self) -> &[&'static ModelSchema] {
        &self.ancestors
    }

    /// Iterates over fields in the registry ordered by identifier.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = (&str, &Field)> + '_ {
        self.fields.iter().map(|(id, field)| (id.as_str(), field))
    }

    /// Returns a field with the specified identifier.
    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.get(id)
    }

    /// Resolves a dot-separated path to a field descriptor, walking through nested model fields.
    /// Returns `None` for an empty path, an unknown segment, or a path traversing a non-model field.
    ///
    /// # Examples
    ///
    /// ```
    /// # use garlic_config::{model, Field, Model};
    /// model! {
    ///     pub struct Info {
    ///         working: Field::boolean(),
    ///     }
    /// }
    /// model! {
    ///     pub struct Person {
    ///         name: Field::string(),
    ///         info: Field::model::<Info>(),
    ///     }
    /// }
    ///
    /// let schema = Person::schema();
    /// let field = schema.resolve_field("info.working").unwrap();
    /// assert_eq!(field.kind_name(), "BooleanField");
    /// assert!(schema.resolve_field("name.length").is_none());
    /// assert!(schema.resolve_field("").is_none());
    /// ```
    pub fn resolve_field(&self, path: &str) -> Option<&Field> {
        let (parent, last_segment) = Pointer(path).split_last()?;
        let mut schema = self;
        for segment in parent.segments() {
            schema = schema.field(segment)?.kind().nested_model()?;
        }
        schema.field(last_segment)
    }

    /// Produces a structural description of this registry. Nested models and array elements
    /// are described recursively.
    pub fn describe(&self) -> ModelDescription {
        ModelDescription {
            name: self.name(),
            help: self.help.clone(),
            fields: self
                .fields
                .iter()
                .map(|(id, field)| (id.clone(), field.describe()))
                .collect(),
        }
    }
}

/// Builder of [`ModelSchema`]s.
#[derive(Debug)]
#[must_use = "registry builders do nothing unless built"]
pub struct ModelSchemaBuilder {
    ty: RustType,
    help: String,
    ancestors: Vec<&'static ModelSchema>,
    fields: Vec<(String, FieldBuilder, Option<String>)>,
}

impl ModelSchemaBuilder {
    /// Sets the human-readable model description.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Sets the model description from doc comment lines.
    pub fn help_lines(mut self, lines: &[&str]) -> Self {
        self.help = join_doc_lines(lines).unwrap_or_default();
        self
    }

    /// Adds an ancestor model. Fields of ancestors added earlier win over fields of ancestors added later.
    pub fn extends<P: Model>(mut self) -> Self {
        self.ancestors.push(P::schema());
        self
    }

    /// Declares a field on the model.
    pub fn field(mut self, id: impl Into<String>, field: FieldBuilder) -> Self {
        self.fields.push((id.into(), field, None));
        self
    }

    /// Declares a field with a description taken from doc comment lines. The description is only used
    /// if the field builder doesn't specify one.
    pub fn field_with_help(
        mut self,
        id: impl Into<String>,
        field: FieldBuilder,
        help_lines: &[&str],
    ) -> Self {
        self.fields
            .push((id.into(), field, join_doc_lines(help_lines)));
        self
    }

    /// Builds the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a field identifier is invalid or declared more than once, or if any
    /// of the declared fields cannot be built.
    pub fn build(self) -> Result<ModelSchema, DefinitionError> {
        let model = self.ty.name_in_code();
        let mut fields = BTreeMap::new();
        for ancestor in self.ancestors.iter().rev() {
            for (id, field) in &ancestor.fields {
                fields.insert(id.clone(), field.clone());
            }
        }
        let inherited_count = fields.len();

        let mut own_fields = BTreeMap::new();
        for (id, builder, doc_help) in self.fields {
            if let Err(err) = _private::validate_name(&id) {
                let kind = ConfigErrorKind::InvalidIdentifier {
                    id,
                    reason: err.to_string(),
                };
                return Err(ConfigError::from(kind).in_model(model).into());
            }
            if own_fields.contains_key(&id) {
                let err = ConfigError::from(ConfigErrorKind::DuplicateField(id.clone()));
                return Err(err.for_field(&id).in_model(model).into());
            }

            let field = builder
                .registered_as(&id, doc_help)
                .build()
                .map_err(|err| err.in_model(model, &id))?;
            own_fields.insert(id, field);
        }

        tracing::debug!(
            model,
            own_fields = own_fields.len(),
            inherited_fields = inherited_count,
            ancestors = self.ancestors.len(),
            "Built model registry"
        );
        fields.extend(own_fields);
        Ok(ModelSchema {
            ty: self.ty,
            help: self.help,
            ancestors: self.ancestors,
            fields,
        })
    }
}

fn join_doc_lines(lines: &[&str]) -> Option<String> {
    let lines: Vec<_> = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Structural description of a [`ModelSchema`] produced by [`ModelSchema::describe()`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDescription {
    /// Model name.
    pub name: &'static str,
    /// Human-readable description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub help: String,
    /// Descriptions of fields keyed by identifiers.
    pub fields: BTreeMap<String, FieldDescription>,
}
