//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/entitree/entitree.toml`
//! 3. Local config: `<dir>/.entitree.toml` (usually the working directory)
//! 4. Environment variables: `ENTITREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::util::path::expand_path;

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_file: Option<PathBuf>,
    pub include_samples: Option<bool>,
    pub seed_file: Option<PathBuf>,
}

/// Unified configuration for entitree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// JSON file holding the forest collection
    pub data_file: PathBuf,
    /// Merge the built-in GlobalCorp example into the collection on load
    pub include_samples: bool,
    /// Extra forests merged in on load, after the stored ones
    pub seed_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            include_samples: true,
            seed_file: None,
        }
    }
}

/// Default store location: `$XDG_DATA_HOME/entitree/entities.json`.
fn default_data_file() -> PathBuf {
    ProjectDirs::from("", "", "entitree")
        .map(|dirs| dirs.data_dir().join("entities.json"))
        .unwrap_or_else(|| PathBuf::from("~/.local/share/entitree/entities.json"))
}

/// Get the XDG config directory for entitree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "entitree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("entitree.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".entitree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.data_file = expand_path(&self.data_file);
        self.seed_file = self.seed_file.as_deref().map(expand_path);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_file: overlay
                .data_file
                .clone()
                .unwrap_or_else(|| self.data_file.clone()),
            include_samples: overlay.include_samples.unwrap_or(self.include_samples),
            seed_file: overlay.seed_file.clone().or_else(|| self.seed_file.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory searched for `.entitree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), local_dir)
    }

    /// Layered load with an explicit global config path, for tests.
    pub fn load_from(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply ENTITREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("ENTITREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_file") {
            settings.data_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_bool("include_samples") {
            settings.include_samples = val;
        }
        if let Ok(val) = config.get_string("seed_file") {
            settings.seed_file = Some(PathBuf::from(val));
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# entitree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/entitree/entitree.toml
#   Local:  ./.entitree.toml
#   Env:    ENTITREE_* environment variables

# JSON file holding the forest collection
# data_file = "~/.local/share/entitree/entities.json"

# Merge the built-in GlobalCorp example on load
# include_samples = true

# Extra forests (one forest or a list) merged on load
# seed_file = "~/treasury/seed.json"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
