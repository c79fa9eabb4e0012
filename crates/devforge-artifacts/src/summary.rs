//! Regenerated provisioning summary
//!
//! `PROVISION.md` reflects the outcome of the latest run: one row per
//! component with its status, version, and install path. It is
//! overwritten wholesale each time.

use crate::generator::ArtifactRegistry;
use anyhow::{Context as _, Result};
use camino::Utf8Path;
use chrono::Local;
use devforge_core::types::ComponentOutcome;
use serde::Serialize;

/// Name of the regenerated documentation file
pub const SUMMARY_FILE_NAME: &str = "PROVISION.md";

#[derive(Debug, Serialize)]
struct SummaryRow {
    name: String,
    status: String,
    version: String,
    path: String,
}

#[derive(Debug, Serialize)]
struct SummaryContext {
    generated_at: String,
    rows: Vec<SummaryRow>,
    notes: Vec<String>,
    log_path: String,
}

/// Render the summary document for a finished run
pub fn render_summary(
    registry: &ArtifactRegistry,
    outcomes: &[ComponentOutcome],
    log_path: &Utf8Path,
) -> Result<String> {
    let rows = outcomes
        .iter()
        .map(|outcome| SummaryRow {
            name: outcome.component.display_name().to_string(),
            status: outcome.state.summary_label().to_string(),
            version: outcome.version.clone().unwrap_or_else(|| "-".to_string()),
            path: outcome
                .install_path
                .as_ref()
                .map(|p| format!("`{}`", p))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let notes = outcomes
        .iter()
        .flat_map(|outcome| {
            outcome
                .notes
                .iter()
                .map(|note| format!("{}: {}", outcome.component.display_name(), note))
        })
        .collect();

    let context = SummaryContext {
        generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        rows,
        notes,
        log_path: log_path.to_string(),
    };

    registry.render("provision_summary.md", &context)
}

/// Render and overwrite the summary file in `target_dir`
pub fn write_summary(
    registry: &ArtifactRegistry,
    target_dir: &Utf8Path,
    outcomes: &[ComponentOutcome],
    log_path: &Utf8Path,
) -> Result<()> {
    let content = render_summary(registry, outcomes, log_path)?;
    let dest = target_dir.join(SUMMARY_FILE_NAME);
    std::fs::create_dir_all(target_dir)
        .with_context(|| format!("Failed to create directory: {}", target_dir))?;
    std::fs::write(&dest, content).with_context(|| format!("Failed to write: {}", dest))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use devforge_core::types::{Component, ComponentOutcome};
    use tempfile::TempDir;

    fn sample_outcomes() -> Vec<ComponentOutcome> {
        vec![
            ComponentOutcome::already_present(Component::Php)
                .with_version("8.3")
                .with_install_path("/usr/bin"),
            ComponentOutcome::failed(Component::Redis, "archive download failed"),
            ComponentOutcome::skipped(Component::Mariadb),
            ComponentOutcome::skipped(Component::Laravel),
        ]
    }

    #[test]
    fn test_summary_rows() {
        let registry = ArtifactRegistry::new().unwrap();
        let content = render_summary(
            &registry,
            &sample_outcomes(),
            Utf8Path::new("logs/provision-20260805T120000Z.log"),
        )
        .unwrap();

        assert!(content.contains("| PHP | ✅ Installed | 8.3 |"));
        assert!(content.contains("| Redis | ❌ Failed | - |"));
        assert!(content.contains("| MariaDB | ⬜ Disabled | - |"));
        assert!(content.contains("| Laravel | ⬜ Disabled | - |"));
        assert!(content.contains("Redis: archive download failed"));
        assert!(content.contains("provision-20260805T120000Z.log"));
    }

    #[test]
    fn test_summary_without_notes_omits_section() {
        let registry = ArtifactRegistry::new().unwrap();
        let outcomes = vec![ComponentOutcome::skipped(Component::Php)];
        let content =
            render_summary(&registry, &outcomes, Utf8Path::new("logs/run.log")).unwrap();
        assert!(!content.contains("## Notes"));
    }

    #[test]
    fn test_write_summary_overwrites() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let registry = ArtifactRegistry::new().unwrap();

        write_summary(
            &registry,
            &dir,
            &sample_outcomes(),
            Utf8Path::new("logs/a.log"),
        )
        .unwrap();
        let first = std::fs::read_to_string(dir.join(SUMMARY_FILE_NAME)).unwrap();
        assert!(first.contains("❌ Failed"));

        let recovered = vec![ComponentOutcome::installed(Component::Redis).with_version("7.2.5")];
        write_summary(&registry, &dir, &recovered, Utf8Path::new("logs/b.log")).unwrap();
        let second = std::fs::read_to_string(dir.join(SUMMARY_FILE_NAME)).unwrap();
        assert!(second.contains("| Redis | ✅ Installed | 7.2.5 |"));
        assert!(!second.contains("❌ Failed"));
    }
}
