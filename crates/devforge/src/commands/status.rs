//! Status command
//!
//! Inspects the machine without touching the configuration: probes the
//! same locations the installers probe and reports what is already
//! there. Nothing is installed or modified.

use anyhow::Result;
use devforge_core::types::PhpConfig;
use devforge_installers::command::{command_exists, probe_version};
use devforge_installers::service::ServiceManager;
use devforge_installers::{mariadb, php, redis};
use serde::Serialize;

use crate::cli::StatusArgs;
use crate::report;

#[derive(Debug, Serialize)]
struct ComponentStatus {
    component: &'static str,
    detected: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

pub async fn run(args: StatusArgs) -> Result<()> {
    let spinner = (!args.json).then(|| report::spinner("Inspecting installed components..."));
    let statuses = inspect().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    report::header("Detected stack components");
    for status in &statuses {
        if status.detected {
            let version = status.version.as_deref().unwrap_or("version unknown");
            report::ok(&format!("{} ({})", status.component, version));
            if let Some(location) = &status.location {
                report::kv("location", location);
            }
        } else {
            report::note(&format!("{} not detected", status.component));
        }
    }

    Ok(())
}

async fn inspect() -> Vec<ComponentStatus> {
    let manager = ServiceManager::detect();

    // PHP probing uses default version paths; an explicit install_dir in
    // config.json only matters to the installer itself
    let php_dir = php::detect_install_dir(&PhpConfig::default());
    let php_version = match &php_dir {
        Some(dir) => probe_version(dir.join(php::PHP_BINARY).as_str(), "--version").await,
        None => None,
    };

    let redis_service = match &manager {
        Some(m) => m.exists(redis::SERVICE_NAME).await,
        None => false,
    };
    let redis_detected = redis_service || command_exists("redis-server");
    let redis_version = if redis_detected {
        probe_version("redis-server", "--version").await
    } else {
        None
    };

    let mariadb_detected = mariadb::is_installed().await;
    let mariadb_version = if mariadb_detected {
        probe_version(mariadb::client_binary(), "--version").await
    } else {
        None
    };

    let composer_detected = command_exists("composer");
    let composer_version = if composer_detected {
        probe_version("composer", "--version").await
    } else {
        None
    };

    vec![
        ComponentStatus {
            component: "PHP",
            detected: php_dir.is_some(),
            version: php_version,
            location: php_dir.map(|d| d.to_string()),
        },
        ComponentStatus {
            component: "Redis",
            detected: redis_detected,
            version: redis_version,
            location: redis_service.then(|| format!("service {}", redis::SERVICE_NAME)),
        },
        ComponentStatus {
            component: "MariaDB",
            detected: mariadb_detected,
            version: mariadb_version,
            location: None,
        },
        ComponentStatus {
            component: "Composer",
            detected: composer_detected,
            version: composer_version,
            location: None,
        },
    ]
}
