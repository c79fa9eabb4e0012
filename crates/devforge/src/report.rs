//! Command-line reporting
//!
//! While installers run, [`RunLog`](devforge_core::RunLog) mirrors its
//! own leveled lines to the console; everything a command prints around
//! that - plans, summaries, detection results, hints - goes through
//! here so component rows look the same in every command.

use console::style;
use devforge_core::types::{Component, ComponentOutcome, ComponentState, ComponentsConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Underlined section header
pub fn header(title: &str) {
    println!("\n{}", style(title).bold().underlined());
}

/// Indented key-value detail line
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Positive result line, using the run log's success glyph so command
/// output and mirrored log lines read as one stream
pub fn ok(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Warning line, same glyph convention as the run log
pub fn warn(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Dim chrome line for hints, dry-run listings, and cancellations
pub fn note(msg: &str) {
    println!("{}", style(msg).dim());
}

/// Render the enabled/disabled plan for a provisioning run
pub fn plan(components: &ComponentsConfig) {
    header("Provisioning plan");
    for component in Component::PROVISION_ORDER {
        let label = if component.is_enabled(components) {
            "enabled"
        } else {
            "disabled"
        };
        kv(component.display_name(), label);
    }
}

/// Render the per-component summary of a finished run
pub fn summary(outcomes: &[ComponentOutcome]) {
    header("Provisioning summary");
    for outcome in outcomes {
        let name = outcome.component.display_name();
        let version = outcome.version.as_deref().unwrap_or("-");
        match outcome.state {
            ComponentState::Installed => ok(&format!("{} installed ({})", name, version)),
            ComponentState::AlreadyPresent => {
                ok(&format!("{} already present ({})", name, version))
            }
            ComponentState::Failed => {
                let reason = outcome.notes.first().map(String::as_str).unwrap_or("");
                eprintln!("{} {} failed: {}", style("✗").red().bold(), name, reason);
            }
            ComponentState::Skipped => note(&format!("{} disabled", name)),
        }
    }
}

/// Steady spinner shown while probing the machine
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}").expect("spinner template is valid"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
