//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::form::StyleMap;

/// Project-local config file name, looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = ".yamlform.yaml";

/// yamlform configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Classes applied to rendered forms, per style slot
    pub styles: StyleMap,

    /// Validate fields as they change (default: true)
    pub validate_on_change: Option<bool>,

    /// Default output format for values (`yaml` or `json`)
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        Self::load_from(Self::global_config_path().as_deref(), Path::new(LOCAL_CONFIG_FILE))
    }

    /// Load with explicit global and local paths
    pub fn load_from(global: Option<&Path>, local: &Path) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/yamlform/config.yaml)
        if let Some(global) = global.and_then(Self::read_file) {
            config.merge(global);
        }

        // 3. Local config (./.yamlform.yaml)
        if let Some(local) = Self::read_file(local) {
            config.merge(local);
        }

        // 4. Environment variables
        if let Ok(format) = std::env::var("YAMLFORM_FORMAT") {
            config.default_format = Some(format);
        }
        if let Ok(styles_path) = std::env::var("YAMLFORM_STYLES") {
            match load_styles(Path::new(&styles_path)) {
                Ok(styles) => config.styles.merge(styles),
                Err(e) => warn!(path = %styles_path, error = %e, "ignoring YAMLFORM_STYLES"),
            }
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config");
                Some(config)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed config");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "yamlform")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.styles.merge(other.styles);
        if other.validate_on_change.is_some() {
            self.validate_on_change = other.validate_on_change;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    pub fn validate_on_change(&self) -> bool {
        self.validate_on_change.unwrap_or(true)
    }
}

/// Read a style map from a YAML file of `slot: class` entries
pub fn load_styles(path: &Path) -> Result<StyleMap, String> {
    let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    if contents.trim().is_empty() {
        return Ok(StyleMap::default());
    }
    serde_yml::from_str(&contents).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::StyleSlot;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_from(None, &tmp.path().join("missing.yaml"));
        assert!(config.validate_on_change());
        assert!(config.styles.is_empty());
    }

    #[test]
    fn test_local_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.yaml");
        let local = tmp.path().join("local.yaml");
        std::fs::write(&global, "validate_on_change: false\nstyles:\n  form: g-form\n  title: g-title\n").unwrap();
        std::fs::write(&local, "styles:\n  form: l-form\n").unwrap();

        let config = Config::load_from(Some(&global), &local);
        assert!(!config.validate_on_change());
        assert_eq!(config.styles.get(StyleSlot::Form), Some("l-form"));
        assert_eq!(config.styles.get(StyleSlot::Title), Some("g-title"));
    }

    #[test]
    fn test_malformed_config_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let local = tmp.path().join("local.yaml");
        std::fs::write(&local, "styles: [not, a, map]").unwrap();
        let config = Config::load_from(None, &local);
        assert!(config.styles.is_empty());
    }

    #[test]
    fn test_load_styles() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("styles.yaml");
        std::fs::write(&path, "error: text-red\n").unwrap();
        let styles = load_styles(&path).unwrap();
        assert_eq!(styles.get(StyleSlot::Error), Some("text-red"));
    }
}
