//! Plan-execution lifecycle tests
//!
//! These run fully offline: the PHP component is pointed at a temp
//! directory that already contains an interpreter stub, so no package
//! manager or network is ever touched, and disabled components must
//! leave no trace at all.

use camino::{Utf8Path, Utf8PathBuf};
use devforge_artifacts::{write_summary, ArtifactRegistry, SUMMARY_FILE_NAME};
use devforge_core::types::{ComponentState, StackConfig};
use devforge_core::RunLog;
use devforge_installers::{orchestrator, ProvisionContext};
use tempfile::TempDir;

#[cfg(windows)]
const PHP_BINARY: &str = "php.exe";
#[cfg(not(windows))]
const PHP_BINARY: &str = "php";

struct Fixture {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        Self { _temp: temp, root }
    }

    /// A directory that passes PHP detection without anything installed
    fn stub_php_dir(&self) -> Utf8PathBuf {
        let dir = self.root.join("php");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(PHP_BINARY), "").unwrap();
        std::fs::write(
            dir.join("php.ini"),
            "[PHP]\nmemory_limit = 128M\n;extension=mbstring\n;extension=curl\n",
        )
        .unwrap();
        dir
    }

    fn php_only_config(&self) -> StackConfig {
        let mut config = StackConfig::default();
        config.components.php.enabled = true;
        config.components.php.version = "8.3".to_string();
        config.components.php.extensions = vec!["mbstring".to_string(), "curl".to_string()];
        config.components.php.install_dir = Some(self.stub_php_dir());
        config
    }
}

async fn run(config: &StackConfig, fixture: &Fixture) -> Vec<devforge_core::types::ComponentOutcome> {
    let run_log = RunLog::open(&fixture.root.join("logs")).unwrap();
    let registry = ArtifactRegistry::new().unwrap();
    let ctx = ProvisionContext::new(&run_log, &registry, &config.paths, &fixture.root, true);
    orchestrator::run_plan(config, &ctx).await
}

#[tokio::test]
async fn php_only_run_configures_interpreter_and_skips_the_rest() {
    let fixture = Fixture::new();
    let config = fixture.php_only_config();

    let outcomes = run(&config, &fixture).await;
    assert_eq!(outcomes.len(), 4);

    let php = &outcomes[0];
    assert!(php.succeeded());
    assert_eq!(php.state, ComponentState::AlreadyPresent);
    assert_eq!(php.version.as_deref(), Some("8.3"));

    for outcome in &outcomes[1..] {
        assert_eq!(outcome.state, ComponentState::Skipped);
    }

    // The ini rewrite happened: limits set, extensions uncommented, no duplicates
    let ini = std::fs::read_to_string(fixture.root.join("php/php.ini")).unwrap();
    assert!(ini.contains("memory_limit = 256M"));
    assert!(ini.contains("extension=mbstring"));
    assert!(ini.contains("extension=curl"));
    assert!(!ini.contains(";extension=mbstring"));
    assert_eq!(ini.matches("extension=mbstring").count(), 1);

    // Activation scripts for both shells landed in the scripts dir
    let scripts = fixture.root.join("scripts");
    assert!(scripts.join("activate_php.sh").as_std_path().exists());
    assert!(scripts.join("activate_php.ps1").as_std_path().exists());
}

#[tokio::test]
async fn second_run_does_not_duplicate_extension_lines() {
    let fixture = Fixture::new();
    let config = fixture.php_only_config();

    run(&config, &fixture).await;
    run(&config, &fixture).await;

    let ini = std::fs::read_to_string(fixture.root.join("php/php.ini")).unwrap();
    assert_eq!(ini.matches("extension=mbstring").count(), 1);
    assert_eq!(ini.matches("extension=curl").count(), 1);
    assert_eq!(ini.matches("memory_limit").count(), 1);
}

#[tokio::test]
async fn disabled_components_are_never_invoked() {
    let fixture = Fixture::new();
    let config = StackConfig::default();

    let outcomes = run(&config, &fixture).await;
    assert!(outcomes
        .iter()
        .all(|o| o.state == ComponentState::Skipped));

    // No installer ran, so no generated artifacts exist
    assert!(!fixture.root.join("scripts").as_std_path().exists());
}

#[tokio::test]
async fn summary_reports_installed_and_disabled_components() {
    let fixture = Fixture::new();
    let config = fixture.php_only_config();

    let outcomes = run(&config, &fixture).await;

    let registry = ArtifactRegistry::new().unwrap();
    write_summary(
        &registry,
        &fixture.root,
        &outcomes,
        Utf8Path::new("logs/provision-test.log"),
    )
    .unwrap();

    let summary = std::fs::read_to_string(fixture.root.join(SUMMARY_FILE_NAME)).unwrap();
    assert!(summary.contains("| PHP | ✅ Installed | 8.3 |"));
    assert!(summary.contains("| Redis | ⬜ Disabled | - |"));
    assert!(summary.contains("| MariaDB | ⬜ Disabled | - |"));
    assert!(summary.contains("| Laravel | ⬜ Disabled | - |"));
}
