//! Provision command

use anyhow::{anyhow, Result};
use camino::Utf8Path;
use devforge_artifacts::{write_summary, ArtifactRegistry, SUMMARY_FILE_NAME};
use devforge_core::types::{build_plan, Component, StackConfig};
use devforge_core::{LoadedConfig, RunLog};
use devforge_installers::{orchestrator, ProvisionContext};
use dialoguer::Confirm;

use crate::cli::ProvisionArgs;
use crate::report;

pub async fn run(args: ProvisionArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    // Bad configuration is fatal before any installer runs
    let loaded = LoadedConfig::load_and_validate(config_path)?;
    let mut config = loaded.config.clone();

    if !args.only.is_empty() {
        restrict_to(&mut config, &args.only)?;
    }

    report::plan(&config.components);

    let plan = build_plan(&config.components);
    if plan.is_empty() {
        report::warn("Nothing to do: every component is disabled");
        return Ok(());
    }

    if args.dry_run {
        report::note("Dry run - would provision, in order:");
        for component in &plan {
            report::note(&format!("  {}", component));
        }
        return Ok(());
    }

    if !args.yes {
        let proceed = Confirm::new()
            .with_prompt(format!("Provision {} component(s)?", plan.len()))
            .default(true)
            .interact()?;
        if !proceed {
            // User cancellation is a clean exit
            report::note("Cancelled");
            return Ok(());
        }
    }

    let run_log = RunLog::open(&loaded.working_dir.join("logs"))?;
    let registry = ArtifactRegistry::new()?;
    let ctx = ProvisionContext::new(
        &run_log,
        &registry,
        &config.paths,
        &loaded.working_dir,
        args.yes,
    );

    let outcomes = orchestrator::run_plan(&config, &ctx).await;

    write_summary(&registry, &loaded.working_dir, &outcomes, run_log.path())?;

    report::summary(&outcomes);
    report::kv("Run log", run_log.path().as_str());
    report::kv(
        "Summary",
        loaded.working_dir.join(SUMMARY_FILE_NAME).as_str(),
    );

    Ok(())
}

/// Disable every component not named in --only. The fixed provisioning
/// order still applies to whatever remains enabled.
fn restrict_to(config: &mut StackConfig, only: &[String]) -> Result<()> {
    let mut keep = Vec::with_capacity(only.len());
    for name in only {
        keep.push(name.parse::<Component>().map_err(|e| anyhow!(e))?);
    }

    let c = &mut config.components;
    c.php.enabled &= keep.contains(&Component::Php);
    c.redis.enabled &= keep.contains(&Component::Redis);
    c.mariadb.enabled &= keep.contains(&Component::Mariadb);
    c.laravel.enabled &= keep.contains(&Component::Laravel);
    Ok(())
}
