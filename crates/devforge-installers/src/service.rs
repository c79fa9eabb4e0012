//! Background service management
//!
//! Thin wrapper over the platform's service tool: `sc.exe` on Windows,
//! `systemctl` where systemd runs. Registration writes through a
//! temporary file moved into place with sudo when not running as root.

use crate::command::{command_exists, run_command};
use anyhow::{anyhow, Context, Result};
use tokio::process::Command;
use tracing::{debug, info};

/// Detected service manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceManager {
    Sc,
    Systemctl,
}

impl ServiceManager {
    /// Detect the platform's service tool
    pub fn detect() -> Option<ServiceManager> {
        #[cfg(windows)]
        {
            if command_exists("sc") {
                return Some(ServiceManager::Sc);
            }
        }
        if command_exists("systemctl") {
            return Some(ServiceManager::Systemctl);
        }
        None
    }

    /// Whether a service with this name is registered
    pub async fn exists(&self, service: &str) -> bool {
        let result = match self {
            ServiceManager::Sc => run_command("sc", &["query", service]).await,
            ServiceManager::Systemctl => run_command("systemctl", &["cat", service]).await,
        };
        result.is_ok()
    }

    /// Whether the service is currently running
    pub async fn is_running(&self, service: &str) -> bool {
        match self {
            ServiceManager::Sc => run_command("sc", &["query", service])
                .await
                .map(|out| out.stdout.contains("RUNNING"))
                .unwrap_or(false),
            ServiceManager::Systemctl => {
                run_command("systemctl", &["is-active", "--quiet", service])
                    .await
                    .is_ok()
            }
        }
    }

    /// Register a service that runs `exec` with `args`
    pub async fn register(&self, service: &str, exec: &str, args: &[&str], description: &str) -> Result<()> {
        info!("Registering service: {}", service);

        match self {
            ServiceManager::Sc => {
                let bin_path = if args.is_empty() {
                    exec.to_string()
                } else {
                    format!("{} {}", exec, args.join(" "))
                };
                // sc.exe is particular about the space after binPath=
                run_command(
                    "sc",
                    &["create", service, "binPath=", &bin_path, "start=", "auto"],
                )
                .await
                .map(|_| ())
                .context("sc create failed")
            }
            ServiceManager::Systemctl => {
                let unit = format!(
                    "[Unit]\nDescription={}\nAfter=network.target\n\n\
                     [Service]\nExecStart={} {}\nRestart=on-failure\n\n\
                     [Install]\nWantedBy=multi-user.target\n",
                    description,
                    exec,
                    args.join(" ")
                );
                let unit_path = format!("/etc/systemd/system/{}.service", service);
                write_file_with_sudo(&unit_path, unit.as_bytes()).await?;
                run_command("systemctl", &["daemon-reload"]).await?;
                run_command("systemctl", &["enable", service]).await?;
                Ok(())
            }
        }
    }

    /// Start the service
    pub async fn start(&self, service: &str) -> Result<()> {
        let result = match self {
            ServiceManager::Sc => run_command("sc", &["start", service]).await,
            ServiceManager::Systemctl => {
                run_sudo_aware("systemctl", &["start", service]).await
            }
        };

        match result {
            Ok(_) => Ok(()),
            // Starting an already-running service is not a failure
            Err(e) if self.is_running(service).await => {
                debug!("Service {} already running: {}", service, e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Stop the service
    pub async fn stop(&self, service: &str) -> Result<()> {
        match self {
            ServiceManager::Sc => run_command("sc", &["stop", service]).await.map(|_| ()),
            ServiceManager::Systemctl => run_sudo_aware("systemctl", &["stop", service])
                .await
                .map(|_| ()),
        }
    }
}

/// Check if sudo is needed (true when not running as root)
async fn needs_sudo() -> bool {
    let output = Command::new("whoami").output().await;

    match output {
        Ok(output) => {
            let user = String::from_utf8_lossy(&output.stdout);
            user.trim() != "root"
        }
        Err(_) => true,
    }
}

/// Run a command, prefixing sudo when not root
async fn run_sudo_aware(program: &str, args: &[&str]) -> Result<crate::command::CommandOutput> {
    if needs_sudo().await {
        let mut full = vec![program];
        full.extend_from_slice(args);
        run_command("sudo", &full).await
    } else {
        run_command(program, args).await
    }
}

/// Write a file into a root-owned location via temp file + sudo mv
async fn write_file_with_sudo(path: &str, data: &[u8]) -> Result<()> {
    let temp_path = format!("{}.tmp", path.replace('/', "_"));
    let temp_path = std::env::temp_dir().join(temp_path);

    tokio::fs::write(&temp_path, data)
        .await
        .context("Failed to write temporary file")?;

    let temp_str = temp_path
        .to_str()
        .ok_or_else(|| anyhow!("Temporary path is not valid UTF-8"))?;

    let result = run_sudo_aware("mv", &[temp_str, path]).await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&temp_path).await;
    }
    result.map(|_| ())
}
