//! # devforge-installers
//!
//! One module per provisionable component (PHP, Redis, MariaDB,
//! Laravel), each exposing an `ensure` function that detects before
//! acting, shells out to external tools, and reports a
//! [`ComponentOutcome`]. Shared plumbing: the command runner, package
//! manager and service abstractions, and the structured ini/env/SQL
//! editors.

pub mod command;
pub mod envfile;
pub mod ini;
pub mod laravel;
pub mod mariadb;
pub mod orchestrator;
pub mod package_manager;
pub mod php;
pub mod redis;
pub mod service;
pub mod sql;

use camino::Utf8PathBuf;
use devforge_artifacts::ArtifactRegistry;
use devforge_core::types::PathsConfig;
use devforge_core::RunLog;

/// Everything an installer needs besides its own configuration subtree
pub struct ProvisionContext<'a> {
    /// The per-run log
    pub run_log: &'a RunLog,

    /// Artifact template registry
    pub registry: &'a ArtifactRegistry,

    /// Resolved generator output locations
    pub scripts_dir: Utf8PathBuf,
    pub project_root: Utf8PathBuf,

    /// Answer prompts affirmatively without asking
    pub assume_yes: bool,
}

impl<'a> ProvisionContext<'a> {
    /// Build a context, resolving relative generator paths against the
    /// directory the configuration file lives in
    pub fn new(
        run_log: &'a RunLog,
        registry: &'a ArtifactRegistry,
        paths: &PathsConfig,
        working_dir: &Utf8PathBuf,
        assume_yes: bool,
    ) -> Self {
        let resolve = |p: &Utf8PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                working_dir.join(p)
            }
        };

        Self {
            run_log,
            registry,
            scripts_dir: resolve(&paths.scripts_dir),
            project_root: resolve(&paths.project_root),
            assume_yes,
        }
    }
}
