//! Configuration store combining a repository with a codec.

use anyhow::Context as _;

use crate::{
    codec::{Codec, Json},
    instance::ModelInstance,
    merge::merge_layers,
    repository::Repository,
    schema::{Model, ModelSchema},
};

/// Store of model instances persisted in a [`Repository`] in a text format defined by a [`Codec`].
///
/// # Examples
///
/// ```
/// use garlic_config::{
///     codec::Json, document, model, repository::MemoryRepository, ConfigStore, Field, Model,
/// };
///
/// model! {
///     pub struct Settings {
///         host: Field::string().with_default("localhost"),
///         port: Field::integer().with_default(8080),
///     }
/// }
///
/// let mut store = ConfigStore::new(MemoryRepository::new(), Json::compact());
/// let base = Settings::load(&document!("host": "example.com"))?;
/// store.save("base", &base)?;
/// let overrides = Settings::load(&document!("port": 3000))?;
/// store.save("prod", &overrides)?;
///
/// // Layers are merged in order, so `prod` overrides `base`.
/// let settings = store.load_layered(["base", "prod"], Settings::schema())?;
/// assert_eq!(*settings.get("host").unwrap(), "localhost");
/// assert_eq!(*settings.get("port").unwrap(), 3000);
/// # anyhow::Ok(())
/// ```
///
/// Note that dumped instances contain default values, so in the example above, `prod` overrides
/// the host from `base` with the default one.
#[derive(Debug)]
pub struct ConfigStore<R, C = Json> {
    repository: R,
    codec: C,
}

impl<R: Repository> ConfigStore<R> {
    /// Creates a store using the pretty JSON codec.
    pub fn json(repository: R) -> Self {
        Self::new(repository, Json::pretty())
    }
}

impl<R: Repository, C: Codec> ConfigStore<R, C> {
    /// Creates a store.
    pub fn new(repository: R, codec: C) -> Self {
        Self { repository, codec }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns the codec used by this store.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Lists names of stored configurations.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    pub fn names(&self) -> anyhow::Result<Vec<String>> {
        self.repository
            .list()
            .context("failed listing configurations")
    }

    /// Encodes and saves a model instance. The instance is not validated.
    ///
    /// # Errors
    ///
    /// Propagates codec and repository errors.
    #[tracing::instrument(level = "debug", name = "ConfigStore::save", skip(self, instance))]
    pub fn save(&mut self, name: &str, instance: &ModelInstance) -> anyhow::Result<()> {
        let document = instance.dump();
        let text = self
            .codec
            .encode(&document)
            .with_context(|| format!("failed encoding configuration `{name}`"))?;
        self.repository
            .save(name, &text)
            .with_context(|| format!("failed saving configuration `{name}`"))?;
        tracing::debug!(
            codec = self.codec.name(),
            model = instance.model_name(),
            len = text.len(),
            "Saved configuration"
        );
        Ok(())
    }

    fn retrieve_document(&self, name: &str) -> anyhow::Result<serde_json::Value> {
        let text = self
            .repository
            .retrieve(name)
            .with_context(|| format!("failed retrieving configuration `{name}`"))?;
        self.codec
            .decode(&text)
            .with_context(|| format!("failed decoding configuration `{name}`"))
    }

    /// Loads a configuration. The instance is loaded tolerantly; call [`ModelInstance::validate()`]
    /// to check it.
    ///
    /// # Errors
    ///
    /// Propagates repository and codec errors. Returns an error if the decoded document is neither an object nor null.
    #[tracing::instrument(level = "debug", name = "ConfigStore::load", skip(self, schema))]
    pub fn load(&self, name: &str, schema: &'static ModelSchema) -> anyhow::Result<ModelInstance> {
        let document = self.retrieve_document(name)?;
        schema
            .load(&document)
            .with_context(|| format!("failed loading configuration `{name}` as `{}`", schema.name()))
    }

    /// Loads a configuration for the model type `M`.
    ///
    /// # Errors
    ///
    /// See [`Self::load()`].
    pub fn load_model<M: Model>(&self, name: &str) -> anyhow::Result<ModelInstance> {
        self.load(name, M::schema())
    }

    /// Loads a configuration merged from several stored documents. Documents are merged in the provided order,
    /// i.e., later documents override earlier ones.
    ///
    /// # Errors
    ///
    /// Propagates repository and codec errors. Returns an error if any of the decoded documents is not an object.
    #[tracing::instrument(level = "debug", name = "ConfigStore::load_layered", skip_all)]
    pub fn load_layered<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
        schema: &'static ModelSchema,
    ) -> anyhow::Result<ModelInstance> {
        let mut layer_names = vec![];
        let mut documents = vec![];
        for name in names {
            documents.push(self.retrieve_document(name)?);
            layer_names.push(name);
        }
        tracing::debug!(?layer_names, model = schema.name(), "Retrieved configuration layers");

        let merged = merge_layers(&documents)
            .with_context(|| format!("failed merging configurations {layer_names:?}"))?;
        schema
            .load(&merged)
            .with_context(|| format!("failed loading merged configuration as `{}`", schema.name()))
    }

    /// Loads all stored configurations.
    ///
    /// # Errors
    ///
    /// Returns the first encountered error.
    pub fn load_all(
        &self,
        schema: &'static ModelSchema,
    ) -> anyhow::Result<Vec<(String, ModelInstance)>> {
        self.names()?
            .into_iter()
            .map(|name| {
                let instance = self.load(&name, schema)?;
                Ok((name, instance))
            })
            .collect()
    }
}
