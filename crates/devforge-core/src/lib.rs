//! # devforge-core
//!
//! Core library for the devforge CLI providing:
//! - Configuration file parsing (config.json)
//! - Type definitions for components and provisioning outcomes
//! - The per-run provisioning log
//! - Shared utilities

pub mod config;
pub mod error;
pub mod runlog;
pub mod types;
pub mod utils;

pub use config::{generate_default_config, LoadedConfig};
pub use error::{Error, Result};
pub use runlog::{LogLevel, RunLog};
pub use utils::get_home_dir;
