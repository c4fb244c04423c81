//! Layered settings loader built on the `config` crate.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. a TOML file (`tokenbridge.toml`, or the path in `TOKENBRIDGE_CONFIG`)
//! 3. `TOKENBRIDGE_*` environment variables, nested with `__`
//!    (`TOKENBRIDGE_EXCHANGE__VERIFICATION_DOMAIN`)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use thiserror::Error;
use tokenbridge_domain::{DomainError, Settings};
use tracing::debug;

/// Default settings file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tokenbridge.toml";

/// Environment variable that overrides the settings file path.
pub const CONFIG_PATH_VAR: &str = "TOKENBRIDGE_CONFIG";

/// Prefix of settings environment variables.
pub const ENV_PREFIX: &str = "TOKENBRIDGE";

/// Settings loading errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or deserialized.
    #[error("failed to load settings: {0}")]
    Load(#[from] ConfigError),

    /// The merged settings are invalid.
    #[error("invalid settings: {0}")]
    Invalid(#[from] DomainError),
}

/// Builds `Settings` from a file and the environment.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    path: PathBuf,
    required: bool,
    env: Option<HashMap<String, String>>,
}

impl SettingsLoader {
    /// Loader for the default file location, honouring `TOKENBRIDGE_CONFIG`.
    ///
    /// A missing default file is not an error.
    #[must_use]
    pub fn new() -> Self {
        std::env::var(CONFIG_PATH_VAR).map_or_else(
            |_| Self {
                path: PathBuf::from(DEFAULT_CONFIG_FILE),
                required: false,
                env: None,
            },
            Self::with_file,
        )
    }

    /// Loader for an explicit file, which must exist.
    #[must_use]
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: true,
            env: None,
        }
    }

    /// Reads environment variables from `vars` instead of the process.
    #[must_use]
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// The settings file this loader reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and validates the settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Load` if a source is unreadable or has the
    /// wrong shape, and `SettingsError::Invalid` if validation fails.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        debug!(path = %self.path.display(), required = self.required, "loading settings");

        let file = File::from(self.path.as_path())
            .format(FileFormat::Toml)
            .required(self.required);

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(self.env.clone());

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}
