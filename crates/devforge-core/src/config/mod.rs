//! Configuration loading for config.json

mod loader;

pub use loader::{generate_default_config, LoadedConfig, CONFIG_FILE_NAME};
