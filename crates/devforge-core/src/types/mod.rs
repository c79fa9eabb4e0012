//! Type definitions shared across devforge crates

mod component_types;
mod outcome;

pub use component_types::{
    ComponentsConfig, EvictionPolicy, LaravelConfig, MariadbConfig, PathsConfig, PhpConfig,
    RedisConfig, StackConfig,
};
pub use outcome::{build_plan, Component, ComponentOutcome, ComponentState};
