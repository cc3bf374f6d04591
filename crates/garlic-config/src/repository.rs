//! Named storage for encoded configurations.

use std::{collections::BTreeMap, fmt, fs, io, path::PathBuf};

/// Error retrieving a configuration that is not present in a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundError {
    name: String,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "configuration `{}` is not found", self.name)
    }
}

impl std::error::Error for NotFoundError {}

impl NotFoundError {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }

    /// Returns the name of the missing configuration.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Error accessing a [`Repository`].
#[derive(Debug)]
#[non_exhaustive]
pub enum RepositoryError {
    /// Configuration is not present in the repository.
    NotFound(NotFoundError),
    /// Configuration name cannot be used with the repository.
    InvalidName {
        /// Offending name.
        name: String,
        /// Human-readable reason.
        reason: &'static str,
    },
    /// I/O error.
    Io {
        /// Name of the accessed configuration, if any.
        name: Option<String>,
        /// Underlying error.
        err: io::Error,
    },
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(err) => fmt::Display::fmt(err, formatter),
            Self::InvalidName { name, reason } => {
                write!(formatter, "invalid configuration name `{name}`: {reason}")
            }
            Self::Io { name: Some(name), err } => {
                write!(formatter, "I/O error accessing configuration `{name}`: {err}")
            }
            Self::Io { name: None, err } => write!(formatter, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(err) => Some(err),
            Self::InvalidName { .. } => None,
            Self::Io { err, .. } => Some(err),
        }
    }
}

impl From<NotFoundError> for RepositoryError {
    fn from(err: NotFoundError) -> Self {
        Self::NotFound(err)
    }
}

/// Named storage of encoded configurations.
pub trait Repository: fmt::Debug {
    /// Saves a configuration under the specified name, replacing the existing configuration if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid for this repository, or on I/O errors.
    fn save(&mut self, name: &str, text: &str) -> Result<(), RepositoryError>;

    /// Retrieves a configuration by name.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if there is no configuration with the specified name.
    fn retrieve(&self, name: &str) -> Result<String, RepositoryError>;

    /// Lists names of all stored configurations in the lexicographic order.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O errors.
    fn list(&self) -> Result<Vec<String>, RepositoryError>;
}

/// In-memory [`Repository`].
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    configs: BTreeMap<String, String>,
}

impl MemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository for MemoryRepository {
    fn save(&mut self, name: &str, text: &str) -> Result<(), RepositoryError> {
        self.configs.insert(name.to_owned(), text.to_owned());
        Ok(())
    }

    fn retrieve(&self, name: &str) -> Result<String, RepositoryError> {
        self.configs
            .get(name)
            .cloned()
            .ok_or_else(|| NotFoundError::new(name).into())
    }

    fn list(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self.configs.keys().cloned().collect())
    }
}

/// [`Repository`] storing each configuration as a file in a root directory.
///
/// The file name is equal to the configuration name. Hidden files (ones with the name starting with `.`)
/// and subdirectories are not listed. The root directory is created on the first save if necessary.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    root: PathBuf,
}

impl DirectoryRepository {
    /// Creates a repository with the specified root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn path(&self, name: &str) -> Result<PathBuf, RepositoryError> {
        let reason = if name.is_empty() {
            Some("name is empty")
        } else if name.starts_with('.') {
            Some("name cannot start with `.`")
        } else if name.contains(['/', '\\']) {
            Some("name cannot contain path separators")
        } else {
            None
        };

        if let Some(reason) = reason {
            Err(RepositoryError::InvalidName {
                name: name.to_owned(),
                reason,
            })
        } else {
            Ok(self.root.join(name))
        }
    }
}

impl Repository for DirectoryRepository {
    fn save(&mut self, name: &str, text: &str) -> Result<(), RepositoryError> {
        let path = self.path(name)?;
        let map_err = |err| RepositoryError::Io {
            name: Some(name.to_owned()),
            err,
        };
        fs::create_dir_all(&self.root).map_err(map_err)?;
        fs::write(&path, text).map_err(map_err)?;
        tracing::debug!(name, path = %path.display(), "Saved configuration file");
        Ok(())
    }

    fn retrieve(&self, name: &str) -> Result<String, RepositoryError> {
        let path = self.path(name)?;
        fs::read_to_string(&path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                NotFoundError::new(name).into()
            } else {
                RepositoryError::Io {
                    name: Some(name.to_owned()),
                    err,
                }
            }
        })
    }

    fn list(&self) -> Result<Vec<String>, RepositoryError> {
        let map_err = |err| RepositoryError::Io { name: None, err };
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(map_err(err)),
        };

        let mut names = vec![];
        for entry in entries {
            let entry = entry.map_err(map_err)?;
            if !entry.file_type().map_err(map_err)?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                tracing::trace!(path = ?entry.path(), "Skipping file with non-UTF-8 name");
                continue;
            };
            if !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort_unstable();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn assert_repository_basics(repo: &mut dyn Repository) {
        assert_eq!(repo.list().unwrap(), [] as [String; 0]);
        let err = repo.retrieve("something").unwrap_err();
        assert_matches!(&err, RepositoryError::NotFound(err) if err.name() == "something");
        assert_eq!(err.to_string(), "configuration `something` is not found");

        repo.save("config1", "data").unwrap();
        assert_eq!(repo.retrieve("config1").unwrap(), "data");
        repo.save("config1", "other data").unwrap();
        assert_eq!(repo.retrieve("config1").unwrap(), "other data");
        repo.save("base", "{}").unwrap();
        assert_eq!(repo.list().unwrap(), ["base", "config1"]);
    }

    #[test]
    fn memory_repository() {
        assert_repository_basics(&mut MemoryRepository::new());
    }

    #[test]
    fn directory_repository() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = DirectoryRepository::new(dir.path().join("configs"));
        assert_repository_basics(&mut repo);

        fs::write(repo.root().join(".DS_Store"), "something").unwrap();
        fs::create_dir(repo.root().join("nested")).unwrap();
        assert_eq!(repo.list().unwrap(), ["base", "config1"]);
    }

    #[test]
    fn directory_repository_rejects_invalid_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = DirectoryRepository::new(dir.path());
        for name in ["", ".hidden", "nested/config", "..", "a\\b"] {
            let err = repo.save(name, "data").unwrap_err();
            assert_matches!(err, RepositoryError::InvalidName { .. }, "{name}");
        }
        let err = repo.retrieve("../config").unwrap_err();
        assert_matches!(err, RepositoryError::InvalidName { .. });
    }
}
