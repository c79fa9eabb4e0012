//! Template registry for generated files
//!
//! Uses Tera templates embedded at compile time to produce the scripts,
//! configuration files, and framework sources the installers write out.

use anyhow::{Context as _, Result};
use camino::Utf8Path;
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

/// Every embedded template, registered under its output-style name
const TEMPLATES: &[(&str, &str)] = &[
    ("redis.conf", include_str!("templates/redis.conf.tera")),
    ("activate_php.sh", include_str!("templates/activate_php.sh.tera")),
    ("activate_php.ps1", include_str!("templates/activate_php.ps1.tera")),
    ("service_control.sh", include_str!("templates/service_control.sh.tera")),
    ("service_control.ps1", include_str!("templates/service_control.ps1.tera")),
    ("test_redis.sh", include_str!("templates/test_redis.sh.tera")),
    ("test_redis.ps1", include_str!("templates/test_redis.ps1.tera")),
    ("test_mariadb.sh", include_str!("templates/test_mariadb.sh.tera")),
    ("test_mariadb.ps1", include_str!("templates/test_mariadb.ps1.tera")),
    ("serve_laravel.sh", include_str!("templates/serve_laravel.sh.tera")),
    ("serve_laravel.ps1", include_str!("templates/serve_laravel.ps1.tera")),
    ("product_model.php", include_str!("templates/product_model.php.tera")),
    (
        "products_migration.php",
        include_str!("templates/products_migration.php.tera"),
    ),
    (
        "product_controller.php",
        include_str!("templates/product_controller.php.tera"),
    ),
    ("api_routes.php", include_str!("templates/api_routes.php.tera")),
    ("product_seeder.php", include_str!("templates/product_seeder.php.tera")),
    ("cache_status.php", include_str!("templates/cache_status.php.tera")),
    (
        "provision_summary.md",
        include_str!("templates/provision_summary.md.tera"),
    ),
];

/// Registry over the embedded artifact templates
pub struct ArtifactRegistry {
    tera: Tera,
}

impl ArtifactRegistry {
    /// Create a registry with all embedded templates registered
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        for (name, source) in TEMPLATES {
            tera.add_raw_template(name, source)
                .with_context(|| format!("Failed to register template: {}", name))?;
        }
        Ok(Self { tera })
    }

    /// Render a template with a typed context
    pub fn render<C: Serialize>(&self, template: &str, context: &C) -> Result<String> {
        let tera_context = Context::from_serialize(context)
            .with_context(|| format!("Failed to build context for template: {}", template))?;
        self.tera
            .render(template, &tera_context)
            .with_context(|| format!("Failed to render template: {}", template))
    }

    /// Render a template and write it to `dest`, creating the target
    /// directory if it does not exist
    pub fn render_to<C: Serialize>(
        &self,
        template: &str,
        context: &C,
        dest: &Utf8Path,
    ) -> Result<()> {
        let content = self.render(template, context)?;

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent))?;
        }

        std::fs::write(dest, content).with_context(|| format!("Failed to write: {}", dest))?;
        debug!("Generated {} from template {}", dest, template);
        Ok(())
    }

    /// Like `render_to` but marks the result executable on Unix
    pub fn render_script_to<C: Serialize>(
        &self,
        template: &str,
        context: &C,
        dest: &Utf8Path,
    ) -> Result<()> {
        self.render_to(template, context, dest)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o755);
            std::fs::set_permissions(dest, perms)
                .with_context(|| format!("Failed to set executable permissions: {}", dest))?;
        }

        Ok(())
    }

    /// Registered template names (used by the self-check test)
    pub fn template_names(&self) -> Vec<&str> {
        self.tera.get_template_names().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{RedisConfContext, RedisTestContext, ServiceControlContext};
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_registry_registers_all_templates() {
        let registry = ArtifactRegistry::new().unwrap();
        assert_eq!(registry.template_names().len(), TEMPLATES.len());
    }

    #[test]
    fn test_render_redis_conf_with_persistence() {
        let registry = ArtifactRegistry::new().unwrap();
        let context = RedisConfContext {
            port: 6380,
            max_memory: "100mb".to_string(),
            eviction_policy: "allkeys-lru".to_string(),
            persistence: true,
        };
        let content = registry.render("redis.conf", &context).unwrap();
        assert!(content.contains("port 6380"));
        assert!(content.contains("maxmemory 100mb"));
        assert!(content.contains("maxmemory-policy allkeys-lru"));
        assert!(content.contains("appendonly yes"));
    }

    #[test]
    fn test_render_redis_conf_without_persistence() {
        let registry = ArtifactRegistry::new().unwrap();
        let context = RedisConfContext {
            port: 6379,
            max_memory: "256mb".to_string(),
            eviction_policy: "noeviction".to_string(),
            persistence: false,
        };
        let content = registry.render("redis.conf", &context).unwrap();
        assert!(content.contains("port 6379"));
        assert!(!content.contains("appendonly yes"));
    }

    #[test]
    fn test_render_to_creates_missing_directories() {
        let temp = TempDir::new().unwrap();
        let registry = ArtifactRegistry::new().unwrap();
        let dest = Utf8PathBuf::from_path_buf(temp.path().join("nested/dir/test-redis.sh")).unwrap();

        registry
            .render_script_to("test_redis.sh", &RedisTestContext { port: 6379 }, &dest)
            .unwrap();

        assert!(dest.as_std_path().exists());
        let content = std::fs::read_to_string(&dest).unwrap();
        assert!(content.contains("PONG"));
    }

    #[test]
    fn test_service_control_script_has_all_subcommands() {
        let registry = ArtifactRegistry::new().unwrap();
        let context = ServiceControlContext {
            service_name: "devforge-redis".to_string(),
            display_name: "Redis".to_string(),
        };
        for template in ["service_control.sh", "service_control.ps1"] {
            let content = registry.render(template, &context).unwrap();
            for subcommand in ["start", "stop", "restart", "status"] {
                assert!(
                    content.contains(subcommand),
                    "{} is missing the {} subcommand",
                    template,
                    subcommand
                );
            }
        }
    }
}
