//! `garlic-config` – declarative configuration schemas with validation, layered merging and pluggable storage.
//!
//! # Overview
//!
//! Configurations are described by *models*: named composite structures made of typed, self-validating
//! [fields](Field). Each model type has an immutable [registry](ModelSchema) mapping field identifiers
//! to field descriptors; registries are usually defined with the [`model!`] macro. A model may extend
//! other models, inheriting their fields.
//!
//! Configuration data is processed in two representations:
//!
//! - *Plain documents* follow the JSON object model ([`serde_json::Value`]). They are used for loading, dumping,
//!   [merging](merge()) and storage.
//! - *Native values* ([`Value`]) are held by [model instances](ModelInstance). Each field converts between
//!   plain and native values, and validates native values.
//!
//! Loading is tolerant: invalid or missing data is recorded on the instance, and all violations are reported
//! by an explicit [`ModelInstance::validate()`] call. Assignments to instances are [checked](AssignmentMode)
//! by default.
//!
//! Instances can be encoded to text with a [codec](codec::Codec) and persisted in a [repository](repository::Repository);
//! [`ConfigStore`] combines both and supports loading layered configurations.
//!
//! # Examples
//!
//! ## Basic workflow
//!
//! ```
//! use garlic_config::{
//!     document, field::{IntegerField, StringField}, merge, model, Field, Model, Violation,
//! };
//!
//! model! {
//!     /// Database connection settings.
//!     pub struct DatabaseConfig {
//!         /// Database URL.
//!         url: Field::string().required(),
//!         /// Size of the connection pool.
//!         pool_size: Field::builder(IntegerField::with_domain(1..=100)).with_default(10),
//!     }
//! }
//!
//! model! {
//!     /// Application settings.
//!     pub struct AppConfig {
//!         env: Field::builder(StringField::with_choices(["dev", "prod"])).with_default("dev"),
//!         database: Field::model::<DatabaseConfig>(),
//!         features: Field::array(Field::string()),
//!     }
//! }
//!
//! let base = document!("database.url": "postgres://localhost/app", "features": ["cache"]);
//! let overrides = document!("env": "prod", "database.pool_size": 50);
//! let merged = merge(&base, &overrides)?;
//!
//! let config = AppConfig::load(&merged)?;
//! config.validate()?;
//! assert_eq!(*config.get("env").unwrap(), "prod");
//! assert_eq!(*config.resolve("database.pool_size").unwrap(), 50);
//! assert_eq!(*config.resolve("features.0").unwrap(), "cache");
//!
//! // Violations are reported by validation.
//! let config = AppConfig::load(&document!("database.pool_size": 0))?;
//! let errors = config.validate().unwrap_err();
//! let paths: Vec<_> = errors.iter().map(|err| err.path()).collect();
//! assert_eq!(paths, ["database.pool_size"]);
//! assert!(matches!(errors.first().violation(), Violation::OutOfDomain { .. }));
//! # anyhow::Ok(())
//! ```
//!
//! ## Storing configurations
//!
//! ```
//! use garlic_config::{codec::Yaml, model, repository::MemoryRepository, ConfigStore, Field, Model};
//!
//! model! {
//!     pub struct Settings {
//!         name: Field::string().with_default("app"),
//!         debug: Field::boolean().with_default(false),
//!     }
//! }
//!
//! let mut store = ConfigStore::new(MemoryRepository::new(), Yaml);
//! let mut settings = Settings::new_instance();
//! settings.set("debug", true)?;
//! store.save("local", &settings)?;
//!
//! assert_eq!(store.names()?, ["local"]);
//! let loaded = store.load_model::<Settings>("local")?;
//! assert_eq!(loaded, settings);
//! # anyhow::Ok(())
//! ```

#![doc(html_root_url = "https://docs.rs/garlic-config/0.1.0")]
// Linter settings
#![warn(missing_docs)]

pub use self::{
    error::{
        ConfigError, ConfigErrorKind, DefinitionError, ValidationError, ValidationErrors,
        Violation,
    },
    field::{Field, FieldBuilder, FieldKind},
    instance::{AssignmentMode, DumpOptions, ModelInstance},
    merge::{merge, merge_layers, MergeError, MergeOperand},
    schema::{Model, ModelSchema, ModelSchemaBuilder},
    store::ConfigStore,
    value::Value,
};

pub mod codec;
mod error;
pub mod field;
pub mod instance;
mod macros;
mod merge;
pub mod repository;
pub mod schema;
mod store;
pub mod testing;
#[cfg(test)]
mod testonly;
pub mod value;

#[doc(hidden)] // used by macros
pub mod _reexports {
    pub use serde_json;
}

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
