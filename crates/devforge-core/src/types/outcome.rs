//! Components, execution plan, and provisioning outcomes

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use super::ComponentsConfig;

/// The provisionable components, in no particular order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Php,
    Redis,
    Mariadb,
    Laravel,
}

impl Component {
    /// Fixed provisioning order. Laravel is last because its installer
    /// relies on the interpreter, cache, and database being functional.
    pub const PROVISION_ORDER: [Component; 4] = [
        Component::Php,
        Component::Redis,
        Component::Mariadb,
        Component::Laravel,
    ];

    /// Human-readable name used in the plan and summary
    pub fn display_name(&self) -> &'static str {
        match self {
            Component::Php => "PHP",
            Component::Redis => "Redis",
            Component::Mariadb => "MariaDB",
            Component::Laravel => "Laravel",
        }
    }

    /// Declared dependencies. Only advisory: a disabled or failed
    /// dependency produces a warning, never an abort.
    pub fn dependencies(&self) -> &'static [Component] {
        match self {
            Component::Laravel => &[Component::Php, Component::Redis, Component::Mariadb],
            _ => &[],
        }
    }

    /// Whether the component is enabled in the given configuration
    pub fn is_enabled(&self, components: &ComponentsConfig) -> bool {
        match self {
            Component::Php => components.php.enabled,
            Component::Redis => components.redis.enabled,
            Component::Mariadb => components.mariadb.enabled,
            Component::Laravel => components.laravel.enabled,
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for Component {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "php" => Ok(Component::Php),
            "redis" => Ok(Component::Redis),
            "mariadb" => Ok(Component::Mariadb),
            "laravel" => Ok(Component::Laravel),
            other => Err(format!(
                "unknown component: {} (expected php, redis, mariadb or laravel)",
                other
            )),
        }
    }
}

/// Resolve the execution plan: enabled components in provisioning order
pub fn build_plan(components: &ComponentsConfig) -> Vec<Component> {
    Component::PROVISION_ORDER
        .iter()
        .copied()
        .filter(|c| c.is_enabled(components))
        .collect()
}

/// Terminal state of one component after a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    /// Freshly installed and configured this run
    Installed,
    /// Detected before acting; configuration refreshed
    AlreadyPresent,
    /// Installer reported failure; partial state may remain
    Failed,
    /// Disabled in configuration; installer never invoked
    Skipped,
}

impl ComponentState {
    /// Status cell used in the regenerated summary
    pub fn summary_label(&self) -> &'static str {
        match self {
            ComponentState::Installed | ComponentState::AlreadyPresent => "✅ Installed",
            ComponentState::Failed => "❌ Failed",
            ComponentState::Skipped => "⬜ Disabled",
        }
    }
}

/// What one installer reports back to the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentOutcome {
    pub component: Component,
    pub state: ComponentState,

    /// Detected or installed version, when obtainable
    #[serde(default)]
    pub version: Option<String>,

    /// Where the component lives on disk
    #[serde(default)]
    pub install_path: Option<Utf8PathBuf>,

    /// Free-text notes surfaced in the summary
    #[serde(default)]
    pub notes: Vec<String>,
}

impl ComponentOutcome {
    pub fn installed(component: Component) -> Self {
        Self::new(component, ComponentState::Installed)
    }

    pub fn already_present(component: Component) -> Self {
        Self::new(component, ComponentState::AlreadyPresent)
    }

    pub fn failed(component: Component, note: impl Into<String>) -> Self {
        let mut outcome = Self::new(component, ComponentState::Failed);
        outcome.notes.push(note.into());
        outcome
    }

    pub fn skipped(component: Component) -> Self {
        Self::new(component, ComponentState::Skipped)
    }

    fn new(component: Component, state: ComponentState) -> Self {
        Self {
            component,
            state,
            version: None,
            install_path: None,
            notes: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_install_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.install_path = Some(path.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Failed is the only unsuccessful terminal state
    pub fn succeeded(&self) -> bool {
        self.state != ComponentState::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StackConfig;

    fn config_with(php: bool, redis: bool, mariadb: bool, laravel: bool) -> StackConfig {
        let mut config = StackConfig::default();
        config.components.php.enabled = php;
        config.components.redis.enabled = redis;
        config.components.mariadb.enabled = mariadb;
        config.components.laravel.enabled = laravel;
        config
    }

    #[test]
    fn test_plan_preserves_fixed_order() {
        let config = config_with(true, true, true, true);
        let plan = build_plan(&config.components);
        assert_eq!(
            plan,
            vec![
                Component::Php,
                Component::Redis,
                Component::Mariadb,
                Component::Laravel
            ]
        );
    }

    #[test]
    fn test_plan_excludes_disabled_components() {
        let config = config_with(true, false, false, true);
        let plan = build_plan(&config.components);
        assert_eq!(plan, vec![Component::Php, Component::Laravel]);
        assert!(!plan.contains(&Component::Redis));
    }

    #[test]
    fn test_plan_empty_when_nothing_enabled() {
        let config = config_with(false, false, false, false);
        assert!(build_plan(&config.components).is_empty());
    }

    #[test]
    fn test_laravel_dependencies() {
        let deps = Component::Laravel.dependencies();
        assert_eq!(deps.len(), 3);
        assert!(deps.contains(&Component::Mariadb));
        assert!(Component::Php.dependencies().is_empty());
    }

    #[test]
    fn test_component_from_str() {
        assert_eq!("php".parse::<Component>().unwrap(), Component::Php);
        assert_eq!("MariaDB".parse::<Component>().unwrap(), Component::Mariadb);
        assert!("nginx".parse::<Component>().is_err());
    }

    #[test]
    fn test_outcome_builders() {
        let outcome = ComponentOutcome::installed(Component::Php)
            .with_version("8.3")
            .with_install_path("/usr/bin")
            .with_note("configured 2 extensions");
        assert!(outcome.succeeded());
        assert_eq!(outcome.version.as_deref(), Some("8.3"));
        assert_eq!(outcome.notes.len(), 1);

        let failed = ComponentOutcome::failed(Component::Redis, "download failed");
        assert!(!failed.succeeded());
        assert_eq!(failed.state.summary_label(), "❌ Failed");
    }

    #[test]
    fn test_summary_labels() {
        assert_eq!(
            ComponentState::AlreadyPresent.summary_label(),
            "✅ Installed"
        );
        assert_eq!(ComponentState::Skipped.summary_label(), "⬜ Disabled");
    }
}
