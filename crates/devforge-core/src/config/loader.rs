//! Configuration file loading and parsing

use crate::error::{Error, Result};
use crate::types::StackConfig;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Fixed configuration file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Loaded and validated devforge configuration
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration
    pub config: StackConfig,

    /// Path to the configuration file
    pub config_path: Utf8PathBuf,

    /// Directory the configuration file lives in
    pub working_dir: Utf8PathBuf,
}

impl LoadedConfig {
    /// Load configuration from the specified path, or `config.json` in the
    /// current directory. Missing file or malformed JSON is fatal: the
    /// caller aborts before any installer runs.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_owned(),
            None => Utf8PathBuf::from(CONFIG_FILE_NAME),
        };

        let content = fs::read_to_string(&config_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(config_path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        let working_dir = config_path
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .map(|p| p.to_owned())
            .unwrap_or_else(|| Utf8PathBuf::from("."));

        let config: StackConfig = serde_json::from_str(&content)?;

        Ok(Self {
            config,
            config_path,
            working_dir,
        })
    }

    /// Load and run value-level validation
    pub fn load_and_validate(path: Option<&Utf8Path>) -> Result<Self> {
        let loaded = Self::load(path)?;
        loaded.config.validate()?;
        Ok(loaded)
    }

    /// Serialize the configuration back to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.config).map_err(Error::from)
    }
}

/// Generate a starter config.json with every component enabled
pub fn generate_default_config(project_name: &str) -> String {
    let mut config = StackConfig::default();
    config.components.php.enabled = true;
    config.components.php.extensions = vec!["mbstring".to_string(), "curl".to_string()];
    config.components.redis.enabled = true;
    config.components.mariadb.enabled = true;
    config.components.laravel.enabled = true;
    config.components.laravel.project_name = project_name.to_string();
    config.components.laravel.generate_api = true;

    // StackConfig serializes cleanly; a failure here is a programming error
    serde_json::to_string_pretty(&config).expect("default config serializes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_generation() {
        let content = generate_default_config("my-shop");
        let config: StackConfig = serde_json::from_str(&content).unwrap();
        assert!(config.components.php.enabled);
        assert!(config.components.laravel.enabled);
        assert_eq!(config.components.laravel.project_name, "my-shop");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let path = Utf8Path::new("/tmp/nonexistent-devforge-config-98765.json");
        let result = LoadedConfig::load(Some(path));
        let err = result.unwrap_err();
        assert!(
            matches!(err, Error::ConfigNotFound { .. }),
            "Expected ConfigNotFound, got: {:?}",
            err
        );
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_invalid_json_syntax() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        std::fs::write(&config_path, "{ \"components\": { oops }").unwrap();

        let utf8_path =
            Utf8PathBuf::from_path_buf(config_path).expect("path should be valid UTF-8");
        let err = LoadedConfig::load(Some(utf8_path.as_path())).unwrap_err();
        assert!(
            matches!(err, Error::JsonParse(_)),
            "Expected JsonParse, got: {:?}",
            err
        );
    }

    #[test]
    fn test_load_and_validate_bad_value() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "components": { "redis": { "enabled": true, "port": 0 } } }"#;
        std::fs::write(&config_path, json).unwrap();

        let utf8_path =
            Utf8PathBuf::from_path_buf(config_path).expect("path should be valid UTF-8");
        let err = LoadedConfig::load_and_validate(Some(utf8_path.as_path())).unwrap_err();
        assert!(
            matches!(err, Error::InvalidConfig { .. }),
            "Expected InvalidConfig, got: {:?}",
            err
        );
    }

    #[test]
    fn test_working_dir_is_config_parent() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        std::fs::write(&config_path, "{}").unwrap();

        let utf8_path =
            Utf8PathBuf::from_path_buf(config_path).expect("path should be valid UTF-8");
        let loaded = LoadedConfig::load(Some(utf8_path.as_path())).unwrap();
        assert_eq!(loaded.working_dir.as_str(), temp_dir.path().to_str().unwrap());
    }

    #[test]
    fn test_roundtrip_to_json() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        std::fs::write(&config_path, generate_default_config("demo")).unwrap();

        let utf8_path =
            Utf8PathBuf::from_path_buf(config_path).expect("path should be valid UTF-8");
        let loaded = LoadedConfig::load(Some(utf8_path.as_path())).unwrap();
        let json = loaded.to_json().unwrap();
        assert!(json.contains("\"project_name\": \"demo\""));
    }
}
