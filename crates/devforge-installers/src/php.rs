//! PHP installer
//!
//! Detects an existing interpreter by probing known install locations
//! (bundled stacks first, then package-manager paths, then PATH),
//! installs the pinned version when nothing is found, rewrites php.ini
//! through the structured editor, and generates the session-scoped
//! activation scripts.

use crate::command::probe_version;
use crate::ini::IniFile;
use crate::package_manager::{ensure_package_manager, PackageManager};
use crate::ProvisionContext;
use anyhow::{anyhow, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use devforge_artifacts::PhpActivationContext;
use devforge_core::types::{Component, ComponentOutcome, PhpConfig};
use tracing::debug;

/// Interpreter binary name probed for during detection
#[cfg(windows)]
pub const PHP_BINARY: &str = "php.exe";
#[cfg(not(windows))]
pub const PHP_BINARY: &str = "php";

/// Ensure PHP is installed and configured
pub async fn ensure(config: &PhpConfig, ctx: &ProvisionContext<'_>) -> Result<ComponentOutcome> {
    ctx.run_log.info("Checking for an existing PHP installation");

    let (install_dir, freshly_installed) = match detect_install_dir(config) {
        Some(dir) => {
            ctx.run_log
                .info(&format!("Found PHP installation at {}", dir));
            (dir, false)
        }
        None => {
            let pm = ensure_package_manager().await?;
            ctx.run_log.info(&format!(
                "PHP not found; installing {} via {}",
                config.version, pm
            ));
            pm.install(&package_name(pm, &config.version)).await?;

            let dir = detect_install_dir(config)
                .ok_or_else(|| anyhow!("PHP not detectable after package installation"))?;
            (dir, true)
        }
    };

    let ini_path = configure_ini(&install_dir, config)?;
    ctx.run_log.success(&format!(
        "Configured {} ({} extension(s) enabled)",
        ini_path,
        config.extensions.len()
    ));

    generate_activation_scripts(&install_dir, ctx)?;

    let version = probe_version(install_dir.join(PHP_BINARY).as_str(), "--version")
        .await
        .unwrap_or_else(|| config.version.clone());

    let outcome = if freshly_installed {
        ComponentOutcome::installed(Component::Php)
    } else {
        ComponentOutcome::already_present(Component::Php)
    };

    Ok(outcome
        .with_version(version)
        .with_install_path(install_dir)
        .with_note(format!("php.ini: {}", ini_path)))
}

/// Probe known install locations for a usable interpreter.
/// An explicit `install_dir` in the configuration wins over probing.
pub fn detect_install_dir(config: &PhpConfig) -> Option<Utf8PathBuf> {
    if let Some(dir) = &config.install_dir {
        if dir.join(PHP_BINARY).exists() {
            return Some(dir.clone());
        }
        return None;
    }

    for dir in probe_dirs(&config.version) {
        if dir.join(PHP_BINARY).exists() {
            debug!("PHP probe hit: {}", dir);
            return Some(dir);
        }
    }

    // Last resort: whatever PATH resolves
    which::which(PHP_BINARY)
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
        .and_then(|d| Utf8PathBuf::from_path_buf(d).ok())
}

/// Known install locations: bundled stacks before package-manager paths
fn probe_dirs(version: &str) -> Vec<Utf8PathBuf> {
    let compact = version.replace('.', "");
    #[cfg(windows)]
    {
        vec![
            Utf8PathBuf::from("C:/xampp/php"),
            Utf8PathBuf::from(format!("C:/tools/php{}", compact)),
            Utf8PathBuf::from("C:/tools/php"),
        ]
    }
    #[cfg(not(windows))]
    {
        let _ = compact;
        vec![
            Utf8PathBuf::from("/opt/lampp/bin"),
            Utf8PathBuf::from("/opt/homebrew/bin"),
            Utf8PathBuf::from("/usr/local/bin"),
            Utf8PathBuf::from("/usr/bin"),
        ]
    }
}

/// Package identifier per manager; apt and brew pin the version in the name
fn package_name(pm: PackageManager, version: &str) -> String {
    match pm {
        PackageManager::Chocolatey => "php".to_string(),
        PackageManager::Winget => "PHP.PHP".to_string(),
        PackageManager::Homebrew => format!("php@{}", version),
        PackageManager::Apt => format!("php{}", version),
    }
}

/// Rewrite the interpreter configuration in place.
/// Returns the path of the file that was written.
pub fn configure_ini(install_dir: &Utf8Path, config: &PhpConfig) -> Result<Utf8PathBuf> {
    let ini_path = locate_ini(install_dir, &config.version);

    let mut ini = if ini_path.exists() {
        let content = std::fs::read_to_string(&ini_path)
            .with_context(|| format!("Failed to read {}", ini_path))?;
        IniFile::parse(&content)
    } else {
        IniFile::default()
    };

    apply_ini_settings(&mut ini, config);

    std::fs::write(&ini_path, ini.to_string())
        .with_context(|| format!("Failed to write {}", ini_path))?;
    Ok(ini_path)
}

/// Apply the configured limits and extensions to a parsed ini document
pub fn apply_ini_settings(ini: &mut IniFile, config: &PhpConfig) {
    ini.set_directive("memory_limit", &config.memory_limit);
    ini.set_directive("max_execution_time", &config.max_execution_time.to_string());
    ini.set_directive("post_max_size", &config.post_max_size);
    ini.set_directive("upload_max_filesize", &config.upload_max_filesize);

    for extension in &config.extensions {
        ini.enable_extension(extension);
    }
}

/// Find the configuration file the interpreter will actually read.
/// Falls back to a fresh php.ini beside the binary, seeded from the
/// distribution template when one is present.
fn locate_ini(install_dir: &Utf8Path, version: &str) -> Utf8PathBuf {
    let mut candidates = vec![
        install_dir.join("php.ini"),
        install_dir.join("php.ini-development"),
        install_dir.join("php.ini-production"),
    ];
    #[cfg(not(windows))]
    candidates.push(Utf8PathBuf::from(format!("/etc/php/{}/cli/php.ini", version)));
    #[cfg(windows)]
    let _ = version;

    for candidate in &candidates {
        if candidate.exists() {
            // Distribution templates are copied into place as php.ini
            if candidate.file_name() != Some("php.ini") {
                let dest = install_dir.join("php.ini");
                if std::fs::copy(candidate, &dest).is_ok() {
                    return dest;
                }
            }
            return candidate.clone();
        }
    }

    install_dir.join("php.ini")
}

/// Generate the per-shell activation scripts into the scripts directory
fn generate_activation_scripts(install_dir: &Utf8Path, ctx: &ProvisionContext<'_>) -> Result<()> {
    let context = PhpActivationContext {
        php_dir: install_dir.to_string(),
    };

    ctx.registry.render_script_to(
        "activate_php.sh",
        &context,
        &ctx.scripts_dir.join("activate_php.sh"),
    )?;
    ctx.registry.render_to(
        "activate_php.ps1",
        &context,
        &ctx.scripts_dir.join("activate_php.ps1"),
    )?;

    Ok(())
}
