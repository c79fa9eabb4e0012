//! MariaDB installer
//!
//! Detects an existing service, installs via the package manager when
//! absent, and unconditionally re-applies the idempotent database/user
//! bootstrap so config.json stays the source of truth for credentials.

use crate::command::{command_exists, probe_version, run_command};
use crate::package_manager::{ensure_package_manager, PackageManager};
use crate::service::ServiceManager;
use crate::sql::MariadbBootstrap;
use crate::ProvisionContext;
use anyhow::{Context, Result};
use devforge_artifacts::MariadbTestContext;
use devforge_core::types::{Component, ComponentOutcome, MariadbConfig};

#[cfg(windows)]
const SERVICE_CANDIDATES: &[&str] = &["MariaDB", "MySQL"];
#[cfg(not(windows))]
const SERVICE_CANDIDATES: &[&str] = &["mariadb", "mysql", "mysqld"];

/// Ensure MariaDB is installed, running, and bootstrapped
pub async fn ensure(
    config: &MariadbConfig,
    ctx: &ProvisionContext<'_>,
) -> Result<ComponentOutcome> {
    let manager = ServiceManager::detect();
    let service = detect_service(&manager).await;

    let present =
        service.is_some() || command_exists("mariadbd") || command_exists("mysqld");

    let fresh = if present {
        ctx.run_log.info("MariaDB installation detected");
        false
    } else {
        let pm = ensure_package_manager().await?;
        ctx.run_log
            .info(&format!("MariaDB not found; installing via {}", pm));
        pm.install(package_name(pm)).await?;
        true
    };

    if let Some(m) = &manager {
        let name = service.unwrap_or(default_service_name());
        m.start(name).await.context("Failed to start MariaDB service")?;
        ctx.run_log.info(&format!("Service {} is running", name));
    }

    // Re-run the bootstrap every time: CREATE ... IF NOT EXISTS semantics
    // make repeated execution safe and converge grants with the config
    run_bootstrap(config).await?;
    ctx.run_log.success(&format!(
        "Database {} and user {} bootstrapped",
        config.database, config.user
    ));

    generate_test_scripts(config, ctx)?;

    let version = probe_version(client_binary(), "--version").await;

    let mut outcome = if fresh {
        ComponentOutcome::installed(Component::Mariadb)
    } else {
        ComponentOutcome::already_present(Component::Mariadb)
    };
    if let Some(version) = version {
        outcome = outcome.with_version(version);
    }
    Ok(outcome.with_note(format!("database: {}", config.database)))
}

/// Whether any MariaDB/MySQL server is present on this machine
pub async fn is_installed() -> bool {
    let manager = ServiceManager::detect();
    detect_service(&manager).await.is_some()
        || command_exists("mariadbd")
        || command_exists("mysqld")
}

/// First registered service among the platform candidates
async fn detect_service(manager: &Option<ServiceManager>) -> Option<&'static str> {
    let manager = manager.as_ref()?;
    for candidate in SERVICE_CANDIDATES {
        if manager.exists(candidate).await {
            return Some(candidate);
        }
    }
    None
}

fn default_service_name() -> &'static str {
    SERVICE_CANDIDATES[0]
}

fn package_name(pm: PackageManager) -> &'static str {
    match pm {
        PackageManager::Chocolatey => "mariadb",
        PackageManager::Winget => "MariaDB.Server",
        PackageManager::Homebrew => "mariadb",
        PackageManager::Apt => "mariadb-server",
    }
}

/// Prefer the mariadb client when present, fall back to mysql
pub fn client_binary() -> &'static str {
    if command_exists("mariadb") {
        "mariadb"
    } else {
        "mysql"
    }
}

/// Execute the bootstrap script as root through the database client
async fn run_bootstrap(config: &MariadbConfig) -> Result<()> {
    let sql = MariadbBootstrap::new(config).render();
    let port = config.port.to_string();

    let mut args = vec![
        "--host",
        "127.0.0.1",
        "--port",
        port.as_str(),
        "--user",
        "root",
    ];

    let password_arg;
    if !config.root_password.is_empty() {
        password_arg = format!("--password={}", config.root_password);
        args.push(password_arg.as_str());
    }

    args.push("--execute");
    args.push(sql.as_str());

    run_command(client_binary(), &args)
        .await
        .context("Database bootstrap failed")?;
    Ok(())
}

/// Always regenerated connectivity test scripts
fn generate_test_scripts(config: &MariadbConfig, ctx: &ProvisionContext<'_>) -> Result<()> {
    let context = MariadbTestContext::from_config(config);
    ctx.registry.render_script_to(
        "test_mariadb.sh",
        &context,
        &ctx.scripts_dir.join("test_mariadb.sh"),
    )?;
    ctx.registry.render_to(
        "test_mariadb.ps1",
        &context,
        &ctx.scripts_dir.join("test_mariadb.ps1"),
    )?;
    Ok(())
}
