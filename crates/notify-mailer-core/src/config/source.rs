//! Where preferences come from.

use super::model::Preferences;
use crate::error::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::warn;

/// Supplies the current preferences on demand.
pub trait ConfigSource: Send + Sync {
    /// Returns the preferences as they are now.
    fn preferences(&self) -> Preferences;
}

impl<T: ConfigSource + ?Sized> ConfigSource for Arc<T> {
    fn preferences(&self) -> Preferences {
        (**self).preferences()
    }
}

/// Preferences read from a JSON file on every request.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    /// Creates a source for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the preferences file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the preferences file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(&self) -> Result<Preferences> {
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl ConfigSource for FileConfigSource {
    /// Missing or unreadable files yield disabled defaults.
    fn preferences(&self) -> Preferences {
        self.load().unwrap_or_else(|e| {
            warn!(path = %self.path.display(), "Cannot load preferences: {e}");
            Preferences::default()
        })
    }
}

/// Preferences held in memory.
#[derive(Debug, Default)]
pub struct StaticConfigSource {
    prefs: RwLock<Preferences>,
}

impl StaticConfigSource {
    /// Creates a source holding `prefs`.
    #[must_use]
    pub const fn new(prefs: Preferences) -> Self {
        Self {
            prefs: RwLock::new(prefs),
        }
    }

    /// Replaces the held preferences.
    pub fn set(&self, prefs: Preferences) {
        *self.prefs.write().unwrap_or_else(PoisonError::into_inner) = prefs;
    }
}

impl ConfigSource for StaticConfigSource {
    fn preferences(&self) -> Preferences {
        self.prefs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::fixtures::complete_preferences;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("notify-mailer-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_file_source_rereads_each_time() {
        let path = temp_path("reread");
        let source = FileConfigSource::new(&path);

        let mut prefs = complete_preferences();
        std::fs::write(&path, serde_json::to_string(&prefs).unwrap()).unwrap();
        assert!(source.preferences().enabled);

        prefs.enabled = false;
        std::fs::write(&path, serde_json::to_string(&prefs).unwrap()).unwrap();
        assert!(!source.preferences().enabled);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_disabled() {
        let source = FileConfigSource::new(temp_path("missing"));
        assert!(source.load().is_err());
        assert_eq!(source.preferences(), Preferences::default());
    }

    #[test]
    fn test_malformed_file_is_disabled() {
        let path = temp_path("malformed");
        std::fs::write(&path, "{ not json").unwrap();
        let source = FileConfigSource::new(&path);
        assert!(!source.preferences().enabled);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_static_source_can_be_replaced() {
        let source = Arc::new(StaticConfigSource::new(complete_preferences()));
        assert!(source.preferences().enabled);
        source.set(Preferences::default());
        assert!(!source.preferences().enabled);
    }
}
