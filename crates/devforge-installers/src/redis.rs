//! Redis installer
//!
//! Detects an existing service registration; otherwise downloads the
//! packaged binary distribution, extracts it, renders the configuration
//! file, and registers/starts the background service. The connectivity
//! test script is regenerated on every run.

use crate::command::run_command;
use crate::service::ServiceManager;
use crate::ProvisionContext;
use anyhow::{anyhow, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use devforge_artifacts::{RedisConfContext, RedisTestContext, ServiceControlContext};
use devforge_core::types::{Component, ComponentOutcome, RedisConfig};
use tracing::debug;

/// Service name used for registration and the control scripts
pub const SERVICE_NAME: &str = "devforge-redis";

#[cfg(windows)]
const ARCHIVE_URL: &str =
    "https://github.com/tporadowski/redis/releases/download/v5.0.14.1/Redis-x64-5.0.14.1.zip";
#[cfg(windows)]
const REDIS_VERSION: &str = "5.0.14.1";

#[cfg(not(windows))]
const ARCHIVE_URL: &str =
    "https://packages.redis.io/redis-stack/redis-stack-server-7.2.0-v10.focal.x86_64.tar.gz";
#[cfg(not(windows))]
const REDIS_VERSION: &str = "7.2.0";

#[cfg(windows)]
const SERVER_BINARY: &str = "redis-server.exe";
#[cfg(not(windows))]
const SERVER_BINARY: &str = "redis-server";

/// Ensure Redis is installed, configured, and running
pub async fn ensure(config: &RedisConfig, ctx: &ProvisionContext<'_>) -> Result<ComponentOutcome> {
    let install_dir = resolve_install_dir(config)?;
    let manager = ServiceManager::detect();

    let registered = match &manager {
        Some(m) => m.exists(SERVICE_NAME).await,
        None => false,
    };

    let mut fresh = false;
    let mut notes = Vec::new();

    let server = if registered {
        ctx.run_log
            .info(&format!("Redis service {} already registered", SERVICE_NAME));
        find_server_binary(&install_dir)
    } else {
        let existing = find_server_binary(&install_dir);
        let server = match existing {
            Some(server) => {
                ctx.run_log
                    .info(&format!("Found Redis binaries at {}", install_dir));
                server
            }
            None => {
                ctx.run_log.info(&format!(
                    "Downloading Redis {} distribution to {}",
                    REDIS_VERSION, install_dir
                ));
                download_and_extract(ARCHIVE_URL, &install_dir).await?;
                fresh = true;
                find_server_binary(&install_dir)
                    .ok_or_else(|| anyhow!("redis-server not found in extracted archive"))?
            }
        };
        Some(server)
    };

    // The configuration file is regenerated every run so config.json edits
    // take effect on the next provision
    let conf_path = install_dir.join("redis.conf");
    ctx.registry.render_to(
        "redis.conf",
        &RedisConfContext::from_config(config),
        &conf_path,
    )?;
    ctx.run_log
        .success(&format!("Wrote Redis configuration: {}", conf_path));

    if !registered {
        let server = server
            .as_ref()
            .ok_or_else(|| anyhow!("redis-server binary unavailable"))?;

        match &manager {
            Some(m) => {
                m.register(
                    SERVICE_NAME,
                    server.as_str(),
                    &[conf_path.as_str()],
                    "Redis cache provisioned by devforge",
                )
                .await?;
                m.start(SERVICE_NAME).await?;
                ctx.run_log
                    .success(&format!("Service {} registered and started", SERVICE_NAME));
            }
            None => {
                // No service manager: run the server detached instead
                run_command(server.as_str(), &[conf_path.as_str(), "--daemonize", "yes"])
                    .await
                    .context("Failed to start redis-server directly")?;
                notes.push("started without service registration (no service manager)".to_string());
            }
        }
    }

    generate_scripts(config, ctx)?;

    let mut outcome = if fresh {
        ComponentOutcome::installed(Component::Redis)
    } else {
        ComponentOutcome::already_present(Component::Redis)
    }
    .with_version(REDIS_VERSION)
    .with_install_path(install_dir);

    for note in notes {
        outcome = outcome.with_note(note);
    }
    Ok(outcome)
}

/// Explicit install_dir, or ~/.devforge/redis
fn resolve_install_dir(config: &RedisConfig) -> Result<Utf8PathBuf> {
    if let Some(dir) = &config.install_dir {
        return Ok(dir.clone());
    }

    let home = devforge_core::get_home_dir()?;
    let home = Utf8PathBuf::from_path_buf(home)
        .map_err(|_| anyhow!("Home directory path is not valid UTF-8"))?;
    Ok(home.join(".devforge").join("redis"))
}

/// Recursively locate the server binary inside the extracted distribution
fn find_server_binary(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            if path.file_name().is_some_and(|n| n == SERVER_BINARY) {
                return Utf8PathBuf::from_path_buf(path).ok();
            }
        } else if path.is_dir() {
            subdirs.push(path);
        }
    }

    for sub in subdirs {
        if let Ok(sub) = Utf8PathBuf::from_path_buf(sub) {
            if let Some(found) = find_server_binary(&sub) {
                return Some(found);
            }
        }
    }
    None
}

/// Download the distribution archive and unpack it into `dest`
async fn download_and_extract(url: &str, dest: &Utf8Path) -> Result<()> {
    let data = download_file(url).await?;

    tokio::fs::create_dir_all(dest)
        .await
        .with_context(|| format!("Failed to create {}", dest))?;

    let dest = dest.to_owned();
    let is_zip = url.ends_with(".zip");

    tokio::task::spawn_blocking(move || -> Result<()> {
        use std::io::Cursor;

        if is_zip {
            let mut archive =
                zip::ZipArchive::new(Cursor::new(data)).context("Failed to open zip archive")?;
            archive
                .extract(dest.as_std_path())
                .context("Failed to extract zip archive")?;
        } else {
            let decoder = flate2::read::GzDecoder::new(Cursor::new(data));
            let mut archive = tar::Archive::new(decoder);
            archive
                .unpack(dest.as_std_path())
                .context("Failed to extract tarball")?;
        }
        Ok(())
    })
    .await
    .context("Extraction task failed")??;

    Ok(())
}

/// Download a file from a URL
async fn download_file(url: &str) -> Result<Vec<u8>> {
    debug!("Downloading {}", url);
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to download from: {}", url))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Download failed with status: {}",
            response.status()
        ));
    }

    let data = response
        .bytes()
        .await
        .context("Failed to read response bytes")?;

    Ok(data.to_vec())
}

/// Always regenerated: connectivity test and service-control scripts
fn generate_scripts(config: &RedisConfig, ctx: &ProvisionContext<'_>) -> Result<()> {
    let test_context = RedisTestContext { port: config.port };
    ctx.registry.render_script_to(
        "test_redis.sh",
        &test_context,
        &ctx.scripts_dir.join("test_redis.sh"),
    )?;
    ctx.registry.render_to(
        "test_redis.ps1",
        &test_context,
        &ctx.scripts_dir.join("test_redis.ps1"),
    )?;

    let control_context = ServiceControlContext {
        service_name: SERVICE_NAME.to_string(),
        display_name: "Redis".to_string(),
    };
    ctx.registry.render_script_to(
        "service_control.sh",
        &control_context,
        &ctx.scripts_dir.join("redis_service.sh"),
    )?;
    ctx.registry.render_to(
        "service_control.ps1",
        &control_context,
        &ctx.scripts_dir.join("redis_service.ps1"),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_install_dir_prefers_config() {
        let config = RedisConfig {
            install_dir: Some(Utf8PathBuf::from("/opt/redis")),
            ..Default::default()
        };
        assert_eq!(
            resolve_install_dir(&config).unwrap(),
            Utf8PathBuf::from("/opt/redis")
        );
    }

    #[test]
    fn test_resolve_install_dir_defaults_under_home() {
        let config = RedisConfig::default();
        let dir = resolve_install_dir(&config).unwrap();
        assert!(dir.as_str().ends_with(".devforge/redis"));
    }

    #[test]
    fn test_find_server_binary_searches_nested_dirs() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let nested = root.join("redis-stack-server-7.2.0").join("bin");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join(SERVER_BINARY), "").unwrap();

        let found = find_server_binary(&root).unwrap();
        assert!(found.as_str().ends_with(SERVER_BINARY));
    }

    #[test]
    fn test_find_server_binary_absent() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        assert!(find_server_binary(&root).is_none());
    }
}
