//! Package manager detection and installation
//!
//! Picks the first available manager in platform preference order and
//! routes installs through it. When none is present, one bootstrap
//! attempt is made; a second failure aborts the calling installer.

use crate::command::{command_exists, run_streamed};
use anyhow::{anyhow, Result};
use std::time::Duration;
use tracing::{info, warn};

const INSTALL_TIMEOUT: Duration = Duration::from_secs(900);

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Chocolatey,
    Winget,
    Homebrew,
    Apt,
}

impl PackageManager {
    /// The executable probed on PATH
    pub fn command(&self) -> &'static str {
        match self {
            PackageManager::Chocolatey => "choco",
            PackageManager::Winget => "winget",
            PackageManager::Homebrew => "brew",
            PackageManager::Apt => "apt-get",
        }
    }

    /// Candidates for the current platform, preferred first
    pub fn candidates() -> &'static [PackageManager] {
        #[cfg(windows)]
        {
            &[PackageManager::Chocolatey, PackageManager::Winget]
        }
        #[cfg(target_os = "macos")]
        {
            &[PackageManager::Homebrew]
        }
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            &[PackageManager::Apt, PackageManager::Homebrew]
        }
    }

    /// First available manager on this machine
    pub fn detect() -> Option<PackageManager> {
        Self::candidates()
            .iter()
            .copied()
            .find(|pm| command_exists(pm.command()))
    }

    /// Install a package, blocking until the manager finishes
    pub async fn install(&self, package: &str) -> Result<()> {
        info!("Installing {} via {}", package, self.command());

        match self {
            PackageManager::Chocolatey => {
                run_streamed("choco", &["install", package, "-y"], None, INSTALL_TIMEOUT).await
            }
            PackageManager::Winget => {
                run_streamed(
                    "winget",
                    &[
                        "install",
                        "--id",
                        package,
                        "--silent",
                        "--accept-package-agreements",
                        "--accept-source-agreements",
                    ],
                    None,
                    INSTALL_TIMEOUT,
                )
                .await
            }
            PackageManager::Homebrew => {
                run_streamed("brew", &["install", package], None, INSTALL_TIMEOUT).await
            }
            PackageManager::Apt => {
                run_streamed(
                    "sudo",
                    &["apt-get", "install", "-y", package],
                    None,
                    INSTALL_TIMEOUT,
                )
                .await
            }
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command())
    }
}

/// Detect a package manager, bootstrapping the platform's preferred one
/// when none is found. At most one bootstrap attempt per call.
pub async fn ensure_package_manager() -> Result<PackageManager> {
    if let Some(pm) = PackageManager::detect() {
        return Ok(pm);
    }

    let preferred = PackageManager::candidates()
        .first()
        .copied()
        .ok_or_else(|| anyhow!("No package manager candidates for this platform"))?;

    warn!(
        "No package manager found; attempting to bootstrap {}",
        preferred.command()
    );
    bootstrap(preferred).await?;

    if command_exists(preferred.command()) {
        Ok(preferred)
    } else {
        Err(anyhow!(
            "{} still unavailable after bootstrap attempt",
            preferred.command()
        ))
    }
}

async fn bootstrap(pm: PackageManager) -> Result<()> {
    match pm {
        PackageManager::Chocolatey => {
            run_streamed(
                "powershell",
                &[
                    "-NoProfile",
                    "-ExecutionPolicy",
                    "Bypass",
                    "-Command",
                    "Set-ExecutionPolicy Bypass -Scope Process -Force; \
                     [System.Net.ServicePointManager]::SecurityProtocol = 3072; \
                     iex ((New-Object System.Net.WebClient).DownloadString('https://community.chocolatey.org/install.ps1'))",
                ],
                None,
                INSTALL_TIMEOUT,
            )
            .await
        }
        PackageManager::Homebrew => {
            run_streamed(
                "bash",
                &[
                    "-c",
                    "NONINTERACTIVE=1 /bin/bash -c \"$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)\"",
                ],
                None,
                INSTALL_TIMEOUT,
            )
            .await
        }
        // apt and winget ship with their platforms; nothing to bootstrap
        PackageManager::Apt | PackageManager::Winget => Err(anyhow!(
            "{} cannot be bootstrapped automatically",
            pm.command()
        )),
    }
}
