//! # devforge-artifacts
//!
//! Everything devforge writes for the user to run later lives here:
//! Tera templates for scripts and configuration files, typed contexts to
//! fill them, the Postman collection builder, and the provisioning
//! summary that is regenerated at the end of every run.

mod context;
mod generator;
mod postman;
mod summary;

pub use context::{
    ApiScaffoldContext, CacheStatusContext, MariadbTestContext, PhpActivationContext,
    RedisConfContext, RedisTestContext, ServeContext, ServiceControlContext,
};
pub use generator::ArtifactRegistry;
pub use postman::PostmanCollectionBuilder;
pub use summary::{render_summary, write_summary, SUMMARY_FILE_NAME};
