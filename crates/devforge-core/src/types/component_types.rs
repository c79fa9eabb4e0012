//! Configuration types for config.json

use crate::error::{Error, Result};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Root config.json configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StackConfig {
    /// Per-component configuration
    #[serde(default)]
    pub components: ComponentsConfig,

    /// Filesystem locations used by the generators
    #[serde(default)]
    pub paths: PathsConfig,
}

impl StackConfig {
    /// Value-level validation beyond what serde enforces.
    ///
    /// Parse errors are fatal before this runs; this pass rejects values
    /// that parse fine but cannot possibly provision.
    pub fn validate(&self) -> Result<()> {
        let c = &self.components;

        if c.php.enabled && c.php.version.trim().is_empty() {
            return Err(Error::invalid_config("components.php.version is empty"));
        }

        if c.redis.enabled && c.redis.port == 0 {
            return Err(Error::invalid_config("components.redis.port must be non-zero"));
        }

        if c.mariadb.enabled {
            if c.mariadb.port == 0 {
                return Err(Error::invalid_config(
                    "components.mariadb.port must be non-zero",
                ));
            }
            if c.mariadb.database.trim().is_empty() {
                return Err(Error::invalid_config(
                    "components.mariadb.database is empty",
                ));
            }
            if c.mariadb.user.trim().is_empty() {
                return Err(Error::invalid_config("components.mariadb.user is empty"));
            }
        }

        if c.laravel.enabled {
            if c.laravel.project_name.trim().is_empty() {
                return Err(Error::invalid_config(
                    "components.laravel.project_name is empty",
                ));
            }
            if c.laravel.cache_driver.trim().is_empty() {
                return Err(Error::invalid_config(
                    "components.laravel.cache_driver is empty",
                ));
            }
            if c.laravel.database_driver.trim().is_empty() {
                return Err(Error::invalid_config(
                    "components.laravel.database_driver is empty",
                ));
            }
        }

        Ok(())
    }
}

/// Per-component enable flags and parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentsConfig {
    #[serde(default)]
    pub php: PhpConfig,

    #[serde(default)]
    pub redis: RedisConfig,

    #[serde(default)]
    pub mariadb: MariadbConfig,

    #[serde(default)]
    pub laravel: LaravelConfig,
}

/// PHP interpreter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhpConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Pinned version installed when no interpreter is found (e.g. "8.3")
    #[serde(default = "default_php_version")]
    pub version: String,

    /// Extensions to enable, in order
    #[serde(default)]
    pub extensions: Vec<String>,

    #[serde(default = "default_memory_limit")]
    pub memory_limit: String,

    /// Seconds
    #[serde(default = "default_max_execution_time")]
    pub max_execution_time: u32,

    #[serde(default = "default_post_max_size")]
    pub post_max_size: String,

    #[serde(default = "default_post_max_size")]
    pub upload_max_filesize: String,

    /// Explicit install directory; probed paths are used when unset
    #[serde(default)]
    pub install_dir: Option<Utf8PathBuf>,
}

impl Default for PhpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            version: default_php_version(),
            extensions: Vec::new(),
            memory_limit: default_memory_limit(),
            max_execution_time: default_max_execution_time(),
            post_max_size: default_post_max_size(),
            upload_max_filesize: default_post_max_size(),
            install_dir: None,
        }
    }
}

fn default_php_version() -> String {
    "8.3".to_string()
}

fn default_memory_limit() -> String {
    "256M".to_string()
}

fn default_max_execution_time() -> u32 {
    120
}

fn default_post_max_size() -> String {
    "64M".to_string()
}

/// Redis server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Directory the binary distribution is extracted into
    #[serde(default)]
    pub install_dir: Option<Utf8PathBuf>,

    #[serde(default = "default_redis_port")]
    pub port: u16,

    /// Memory cap passed through to maxmemory (e.g. "256mb")
    #[serde(default = "default_max_memory")]
    pub max_memory: String,

    #[serde(default)]
    pub eviction_policy: EvictionPolicy,

    /// Enables the append-only persistence block
    #[serde(default)]
    pub persistence: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            install_dir: None,
            port: default_redis_port(),
            max_memory: default_max_memory(),
            eviction_policy: EvictionPolicy::default(),
            persistence: false,
        }
    }
}

fn default_redis_port() -> u16 {
    6379
}

fn default_max_memory() -> String {
    "256mb".to_string()
}

/// Redis maxmemory eviction policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvictionPolicy {
    Noeviction,
    #[default]
    AllkeysLru,
    VolatileLru,
    AllkeysLfu,
    VolatileLfu,
    AllkeysRandom,
    VolatileRandom,
    VolatileTtl,
}

impl std::fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EvictionPolicy::Noeviction => "noeviction",
            EvictionPolicy::AllkeysLru => "allkeys-lru",
            EvictionPolicy::VolatileLru => "volatile-lru",
            EvictionPolicy::AllkeysLfu => "allkeys-lfu",
            EvictionPolicy::VolatileLfu => "volatile-lfu",
            EvictionPolicy::AllkeysRandom => "allkeys-random",
            EvictionPolicy::VolatileRandom => "volatile-random",
            EvictionPolicy::VolatileTtl => "volatile-ttl",
        };
        write!(f, "{}", s)
    }
}

/// MariaDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MariadbConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_mariadb_port")]
    pub port: u16,

    /// Empty string means passwordless root access
    #[serde(default)]
    pub root_password: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_db_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,
}

impl Default for MariadbConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_mariadb_port(),
            root_password: String::new(),
            database: default_database(),
            user: default_db_user(),
            password: String::new(),
        }
    }
}

fn default_mariadb_port() -> u16 {
    3306
}

fn default_database() -> String {
    "app_db".to_string()
}

fn default_db_user() -> String {
    "app_user".to_string()
}

/// Laravel project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaravelConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Explicit project directory; paths.project_root/project_name when unset
    #[serde(default)]
    pub project_path: Option<Utf8PathBuf>,

    /// Framework version constraint handed to the scaffolding tool
    #[serde(default = "default_laravel_version")]
    pub version: String,

    #[serde(default = "default_cache_driver")]
    pub cache_driver: String,

    #[serde(default = "default_database_driver")]
    pub database_driver: String,

    /// Redis client library added as a project dependency
    #[serde(default = "default_redis_client")]
    pub redis_client: String,

    /// Scaffold the cache-aware product API
    #[serde(default)]
    pub generate_api: bool,
}

impl Default for LaravelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            project_name: default_project_name(),
            project_path: None,
            version: default_laravel_version(),
            cache_driver: default_cache_driver(),
            database_driver: default_database_driver(),
            redis_client: default_redis_client(),
            generate_api: false,
        }
    }
}

impl LaravelConfig {
    /// Resolve the project directory against the configured project root
    pub fn resolved_project_path(&self, paths: &PathsConfig) -> Utf8PathBuf {
        self.project_path
            .clone()
            .unwrap_or_else(|| paths.project_root.join(&self.project_name))
    }
}

fn default_project_name() -> String {
    "laravel-app".to_string()
}

fn default_laravel_version() -> String {
    "^11.0".to_string()
}

fn default_cache_driver() -> String {
    "redis".to_string()
}

fn default_database_driver() -> String {
    "mysql".to_string()
}

fn default_redis_client() -> String {
    "predis".to_string()
}

/// Filesystem locations used by all generators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Where generated scripts land
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: Utf8PathBuf,

    /// Root for scaffolded projects
    #[serde(default = "default_project_root")]
    pub project_root: Utf8PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            scripts_dir: default_scripts_dir(),
            project_root: default_project_root(),
        }
    }
}

fn default_scripts_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("scripts")
}

fn default_project_root() -> Utf8PathBuf {
    Utf8PathBuf::from(".")
}
