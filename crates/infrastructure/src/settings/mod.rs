//! Settings loading from files and the environment.

mod loader;

pub use loader::{
    CONFIG_PATH_VAR, DEFAULT_CONFIG_FILE, ENV_PREFIX, SettingsError, SettingsLoader,
};
