//! Typed contexts for the artifact templates

use devforge_core::types::{MariadbConfig, RedisConfig};
use serde::Serialize;

/// Context for redis.conf
#[derive(Debug, Serialize)]
pub struct RedisConfContext {
    pub port: u16,
    pub max_memory: String,
    pub eviction_policy: String,
    pub persistence: bool,
}

impl RedisConfContext {
    pub fn from_config(config: &RedisConfig) -> Self {
        Self {
            port: config.port,
            max_memory: config.max_memory.clone(),
            eviction_policy: config.eviction_policy.to_string(),
            persistence: config.persistence,
        }
    }
}

/// Context for the session-scoped interpreter activation scripts
#[derive(Debug, Serialize)]
pub struct PhpActivationContext {
    /// Directory prepended to PATH for the current shell session
    pub php_dir: String,
}

/// Context for the background-service control scripts
#[derive(Debug, Serialize)]
pub struct ServiceControlContext {
    pub service_name: String,
    pub display_name: String,
}

/// Context for the cache connectivity test scripts
#[derive(Debug, Serialize)]
pub struct RedisTestContext {
    pub port: u16,
}

/// Context for the database connectivity test scripts
#[derive(Debug, Serialize)]
pub struct MariadbTestContext {
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl MariadbTestContext {
    pub fn from_config(config: &MariadbConfig) -> Self {
        Self {
            port: config.port,
            database: config.database.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
        }
    }
}

/// Context for the development-server launcher scripts
#[derive(Debug, Serialize)]
pub struct ServeContext {
    pub project_dir: String,
}

/// Context shared by the API scaffold sources
#[derive(Debug, Serialize)]
pub struct ApiScaffoldContext {
    pub project_name: String,
    /// Cache-aside entry lifetime in seconds
    pub cache_ttl: u32,
}

/// Context for the standalone cache diagnostic page
#[derive(Debug, Serialize)]
pub struct CacheStatusContext {
    pub redis_port: u16,
}
