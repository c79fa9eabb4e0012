//! Laravel installer
//!
//! Scaffolds the project via composer, wires its .env to the provisioned
//! cache and database through the structured env editor, and optionally
//! generates the cache-aware product API. An existing project directory
//! is either backed up under a timestamped name and replaced, or kept,
//! depending on the overwrite prompt.

use crate::command::{command_exists, run_streamed};
use crate::envfile::EnvFile;
use crate::package_manager::{ensure_package_manager, PackageManager};
use crate::ProvisionContext;
use anyhow::{anyhow, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;
use devforge_artifacts::{ApiScaffoldContext, CacheStatusContext, PostmanCollectionBuilder, ServeContext};
use devforge_core::types::{Component, ComponentOutcome, LaravelConfig, MariadbConfig, RedisConfig};
use dialoguer::Confirm;
use std::time::Duration;

const SCAFFOLD_TIMEOUT: Duration = Duration::from_secs(1800);
const REQUIRE_TIMEOUT: Duration = Duration::from_secs(900);

/// Lifetime of cache-aside entries in the generated controller, seconds
const CACHE_TTL_SECONDS: u32 = 300;

/// Ensure the Laravel project exists and is configured
pub async fn ensure(
    config: &LaravelConfig,
    mariadb: &MariadbConfig,
    redis: &RedisConfig,
    ctx: &ProvisionContext<'_>,
) -> Result<ComponentOutcome> {
    let project_dir = config
        .project_path
        .clone()
        .unwrap_or_else(|| ctx.project_root.join(&config.project_name));

    let mut notes = Vec::new();

    if project_dir.exists() {
        ctx.run_log
            .warning(&format!("Project directory already exists: {}", project_dir));

        let overwrite = ctx.assume_yes
            || Confirm::new()
                .with_prompt(format!(
                    "Back up {} and scaffold a fresh project?",
                    project_dir
                ))
                .default(false)
                .interact()
                .unwrap_or(false);

        if !overwrite {
            ctx.run_log
                .info("Keeping existing project; scaffolding skipped");
            generate_serve_scripts(&project_dir, ctx)?;
            return Ok(ComponentOutcome::already_present(Component::Laravel)
                .with_version(config.version.clone())
                .with_install_path(project_dir)
                .with_note("existing project kept"));
        }

        let backup = backup_path(&project_dir);
        std::fs::rename(&project_dir, &backup)
            .with_context(|| format!("Failed to back up {}", project_dir))?;
        ctx.run_log
            .warning(&format!("Existing project moved to {}", backup));
        notes.push(format!("previous project backed up to {}", backup));
    }

    ensure_composer().await?;

    ctx.run_log.info(&format!(
        "Scaffolding Laravel {} into {} (this may take a few minutes)",
        config.version, project_dir
    ));
    run_streamed(
        "composer",
        &[
            "create-project",
            "laravel/laravel",
            project_dir.as_str(),
            &config.version,
            "--no-interaction",
        ],
        None,
        SCAFFOLD_TIMEOUT,
    )
    .await
    .context("Project scaffolding failed")?;

    let redis_package = composer_package_for_client(&config.redis_client);
    ctx.run_log.info(&format!(
        "Adding dependencies: {} and doctrine/dbal",
        redis_package
    ));
    run_streamed(
        "composer",
        &["require", &redis_package, "doctrine/dbal", "--no-interaction"],
        Some(&project_dir),
        REQUIRE_TIMEOUT,
    )
    .await
    .context("Dependency installation failed")?;

    rewrite_env_file(&project_dir, config, mariadb, redis)?;
    ctx.run_log
        .success(".env wired to the configured cache and database");

    if config.generate_api {
        generate_api(&project_dir, config, redis, ctx)?;
        ctx.run_log.success("Product API scaffold generated");
        notes.push("product API scaffold generated".to_string());
    }

    generate_serve_scripts(&project_dir, ctx)?;

    let mut outcome = ComponentOutcome::installed(Component::Laravel)
        .with_version(config.version.clone())
        .with_install_path(project_dir);
    for note in notes {
        outcome = outcome.with_note(note);
    }
    Ok(outcome)
}

/// Timestamped sibling name for the backup rename
fn backup_path(project_dir: &Utf8Path) -> Utf8PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    Utf8PathBuf::from(format!("{}-backup-{}", project_dir, timestamp))
}

/// Composer needs to exist before anything else; one auto-install attempt
async fn ensure_composer() -> Result<()> {
    if command_exists("composer") {
        return Ok(());
    }

    let pm = ensure_package_manager().await?;
    pm.install(composer_package(pm)).await?;

    if command_exists("composer") {
        Ok(())
    } else {
        Err(anyhow!("composer still unavailable after install attempt"))
    }
}

fn composer_package(pm: PackageManager) -> &'static str {
    match pm {
        PackageManager::Winget => "Composer.Composer",
        _ => "composer",
    }
}

/// Map the configured client library to its composer package
fn composer_package_for_client(client: &str) -> String {
    if client.contains('/') {
        return client.to_string();
    }
    match client {
        "predis" => "predis/predis".to_string(),
        other => format!("{}/{}", other, other),
    }
}

/// Rewrite the generated .env through the structured editor
fn rewrite_env_file(
    project_dir: &Utf8Path,
    config: &LaravelConfig,
    mariadb: &MariadbConfig,
    redis: &RedisConfig,
) -> Result<()> {
    let env_path = project_dir.join(".env");
    let content = std::fs::read_to_string(&env_path)
        .with_context(|| format!("Failed to read {}", env_path))?;

    let mut env = EnvFile::parse(&content);
    apply_env_settings(&mut env, config, mariadb, redis);

    std::fs::write(&env_path, env.to_string())
        .with_context(|| format!("Failed to write {}", env_path))?;
    Ok(())
}

/// Point the environment at the configured drivers and credentials, and
/// append the Redis client settings. Each key ends up on exactly one line.
pub fn apply_env_settings(
    env: &mut EnvFile,
    config: &LaravelConfig,
    mariadb: &MariadbConfig,
    redis: &RedisConfig,
) {
    env.set("CACHE_DRIVER", &config.cache_driver);
    env.set("SESSION_DRIVER", &config.cache_driver);
    env.set("DB_CONNECTION", &config.database_driver);
    env.set("DB_HOST", "127.0.0.1");
    env.set("DB_PORT", &mariadb.port.to_string());
    env.set("DB_DATABASE", &mariadb.database);
    env.set("DB_USERNAME", &mariadb.user);
    env.set("DB_PASSWORD", &mariadb.password);

    env.set("REDIS_CLIENT", &config.redis_client);
    env.set("REDIS_HOST", "127.0.0.1");
    env.set("REDIS_PORT", &redis.port.to_string());
}

/// Write the model, migration, controller, routes, seeder, diagnostic
/// page, and Postman collection
fn generate_api(
    project_dir: &Utf8Path,
    config: &LaravelConfig,
    redis: &RedisConfig,
    ctx: &ProvisionContext<'_>,
) -> Result<()> {
    let api_context = ApiScaffoldContext {
        project_name: config.project_name.clone(),
        cache_ttl: CACHE_TTL_SECONDS,
    };

    ctx.registry.render_to(
        "product_model.php",
        &api_context,
        &project_dir.join("app/Models/Product.php"),
    )?;

    let migration_name = format!(
        "{}_create_products_table.php",
        Local::now().format("%Y_%m_%d_%H%M%S")
    );
    ctx.registry.render_to(
        "products_migration.php",
        &api_context,
        &project_dir.join("database/migrations").join(migration_name),
    )?;

    ctx.registry.render_to(
        "product_controller.php",
        &api_context,
        &project_dir.join("app/Http/Controllers/ProductController.php"),
    )?;
    ctx.registry.render_to(
        "api_routes.php",
        &api_context,
        &project_dir.join("routes/api.php"),
    )?;
    ctx.registry.render_to(
        "product_seeder.php",
        &api_context,
        &project_dir.join("database/seeders/ProductSeeder.php"),
    )?;
    ctx.registry.render_to(
        "cache_status.php",
        &CacheStatusContext {
            redis_port: redis.port,
        },
        &project_dir.join("public/cache-status.php"),
    )?;

    let collection = PostmanCollectionBuilder::new(&config.project_name, "http://127.0.0.1:8000")
        .to_json()?;
    let collection_path = ctx.scripts_dir.join("postman_collection.json");
    if let Some(parent) = collection_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&collection_path, collection)
        .with_context(|| format!("Failed to write {}", collection_path))?;

    Ok(())
}

/// The launcher scripts are written on every run, even when the project
/// itself was kept
fn generate_serve_scripts(project_dir: &Utf8Path, ctx: &ProvisionContext<'_>) -> Result<()> {
    let context = ServeContext {
        project_dir: project_dir.to_string(),
    };
    ctx.registry.render_script_to(
        "serve_laravel.sh",
        &context,
        &ctx.scripts_dir.join("serve_laravel.sh"),
    )?;
    ctx.registry.render_to(
        "serve_laravel.ps1",
        &context,
        &ctx.scripts_dir.join("serve_laravel.ps1"),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LARAVEL_ENV_TEMPLATE: &str = "\
APP_NAME=Laravel
APP_ENV=local

DB_CONNECTION=sqlite
# DB_HOST=127.0.0.1
# DB_PORT=3306

CACHE_DRIVER=file
SESSION_DRIVER=file
QUEUE_CONNECTION=sync
";

    fn sample_configs() -> (LaravelConfig, MariadbConfig, RedisConfig) {
        let laravel = LaravelConfig {
            enabled: true,
            cache_driver: "redis".to_string(),
            database_driver: "mysql".to_string(),
            redis_client: "predis".to_string(),
            ..Default::default()
        };
        let mariadb = MariadbConfig {
            enabled: true,
            port: 3307,
            database: "shop".to_string(),
            user: "shop_user".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        };
        let redis = RedisConfig {
            enabled: true,
            port: 6380,
            ..Default::default()
        };
        (laravel, mariadb, redis)
    }

    #[test]
    fn test_env_rewrite_sets_each_key_exactly_once() {
        let (laravel, mariadb, redis) = sample_configs();
        let mut env = EnvFile::parse(LARAVEL_ENV_TEMPLATE);
        apply_env_settings(&mut env, &laravel, &mariadb, &redis);

        let out = env.to_string();
        assert_eq!(out.matches("CACHE_DRIVER=").count(), 1);
        assert_eq!(out.matches("DB_CONNECTION=").count(), 1);
        assert!(out.contains("CACHE_DRIVER=redis"));
        assert!(out.contains("DB_CONNECTION=mysql"));
        assert!(out.contains("DB_PORT=3307"));
        assert!(out.contains("DB_DATABASE=shop"));
        assert!(out.contains("REDIS_CLIENT=predis"));
        assert!(out.contains("REDIS_PORT=6380"));
    }

    #[test]
    fn test_env_rewrite_is_idempotent() {
        let (laravel, mariadb, redis) = sample_configs();
        let mut env = EnvFile::parse(LARAVEL_ENV_TEMPLATE);
        apply_env_settings(&mut env, &laravel, &mariadb, &redis);
        let first = env.to_string();

        let mut env = EnvFile::parse(&first);
        apply_env_settings(&mut env, &laravel, &mariadb, &redis);
        assert_eq!(env.to_string(), first);
    }

    #[test]
    fn test_composer_package_for_client() {
        assert_eq!(composer_package_for_client("predis"), "predis/predis");
        assert_eq!(
            composer_package_for_client("vendor/custom-client"),
            "vendor/custom-client"
        );
    }

    #[test]
    fn test_backup_path_is_timestamped_sibling() {
        let backup = backup_path(Utf8Path::new("/srv/projects/shop"));
        assert!(backup.as_str().starts_with("/srv/projects/shop-backup-"));
        assert_ne!(backup, Utf8PathBuf::from("/srv/projects/shop"));
    }
}
