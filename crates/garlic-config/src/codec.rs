//! Text codecs for plain documents.
//!
//! A [`Codec`] converts plain documents to and from text. [`encode()`] and [`decode()`] connect codecs
//! with model instances: an instance is [dumped](ModelInstance::dump()) before encoding, and decoded
//! documents are [loaded](ModelSchema::load()) into instances.
//!
//! # Examples
//!
//! ```
//! use garlic_config::{codec::{self, Json}, model, Field, Model};
//!
//! model! {
//!     pub struct Settings {
//!         name: Field::string(),
//!         enabled: Field::boolean().with_default(true),
//!     }
//! }
//!
//! let mut settings = Settings::new_instance();
//! settings.set("name", "test")?;
//! let text = codec::encode(&settings, &Json::compact())?;
//! assert_eq!(text, r#"{"enabled":true,"name":"test"}"#);
//!
//! let decoded = codec::decode(&text, Settings::schema(), &Json::default())?;
//! assert_eq!(decoded, settings);
//! # anyhow::Ok(())
//! ```

use std::fmt;

use crate::{
    error::ValidationError,
    instance::ModelInstance,
    schema::ModelSchema,
    value::JsonObject,
};

/// Error encoding or decoding a document.
#[derive(Debug)]
#[non_exhaustive]
pub enum CodecError {
    /// JSON (de)serialization error.
    Json(serde_json::Error),
    /// YAML (de)serialization error.
    Yaml(serde_yaml::Error),
    /// Decoded document cannot be loaded into a model instance.
    Validation(ValidationError),
}

impl fmt::Display for CodecError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(formatter, "JSON error: {err}"),
            Self::Yaml(err) => write!(formatter, "YAML error: {err}"),
            Self::Validation(err) => write!(formatter, "cannot load decoded document: {err}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(match self {
            Self::Json(err) => err,
            Self::Yaml(err) => err,
            Self::Validation(err) => err,
        })
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<serde_yaml::Error> for CodecError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err)
    }
}

impl From<ValidationError> for CodecError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// Text format for plain documents.
pub trait Codec: fmt::Debug + Send + Sync {
    /// Human-readable codec name used in logs.
    fn name(&self) -> &'static str;

    /// Encodes a document to text.
    ///
    /// # Errors
    ///
    /// Propagates serialization errors.
    fn encode(&self, document: &JsonObject) -> Result<String, CodecError>;

    /// Decodes a document from text.
    ///
    /// # Errors
    ///
    /// Propagates deserialization errors.
    fn decode(&self, text: &str) -> Result<serde_json::Value, CodecError>;
}

/// JSON codec. Object keys are always sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Json {
    pretty: bool,
}

/// Uses the [pretty](Json::pretty()) format.
impl Default for Json {
    fn default() -> Self {
        Self::pretty()
    }
}

impl Json {
    /// Pretty format with 2-space indentation.
    pub const fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Compact format with `,` and `:` separators and no whitespace.
    pub const fn compact() -> Self {
        Self { pretty: false }
    }

    /// Checks whether this codec produces pretty output.
    pub const fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Codec for Json {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn encode(&self, document: &JsonObject) -> Result<String, CodecError> {
        Ok(if self.pretty {
            serde_json::to_string_pretty(document)?
        } else {
            serde_json::to_string(document)?
        })
    }

    fn decode(&self, text: &str) -> Result<serde_json::Value, CodecError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// YAML codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Yaml;

impl Codec for Yaml {
    fn name(&self) -> &'static str {
        "YAML"
    }

    fn encode(&self, document: &JsonObject) -> Result<String, CodecError> {
        Ok(serde_yaml::to_string(document)?)
    }

    fn decode(&self, text: &str) -> Result<serde_json::Value, CodecError> {
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Encodes a model instance to text. Null values and empty nested models are omitted.
///
/// # Errors
///
/// Propagates codec errors.
pub fn encode(instance: &ModelInstance, codec: &dyn Codec) -> Result<String, CodecError> {
    codec.encode(&instance.dump())
}

/// Decodes a model instance from text. The decoded document is loaded tolerantly; call
/// [`ModelInstance::validate()`] to check the result.
///
/// # Errors
///
/// Returns an error if the text cannot be decoded, or if the decoded document is neither an object nor null.
pub fn decode(
    text: &str,
    schema: &'static ModelSchema,
    codec: &dyn Codec,
) -> Result<ModelInstance, CodecError> {
    let document = codec.decode(text)?;
    Ok(schema.load(&document)?)
}
