//! Plan execution
//!
//! Walks the fixed component order, skipping disabled components without
//! invoking their installers, converting installer errors into failed
//! outcomes, and warning when a component's declared dependency is
//! disabled or failed earlier. One component's failure never stops the
//! rest of the run.

use crate::{laravel, mariadb, php, redis, ProvisionContext};
use devforge_core::types::{Component, ComponentOutcome, StackConfig};

/// Run every enabled installer in provisioning order
pub async fn run_plan(config: &StackConfig, ctx: &ProvisionContext<'_>) -> Vec<ComponentOutcome> {
    let mut outcomes: Vec<ComponentOutcome> = Vec::new();

    for component in Component::PROVISION_ORDER {
        if !component.is_enabled(&config.components) {
            outcomes.push(ComponentOutcome::skipped(component));
            continue;
        }

        warn_on_unmet_dependencies(component, config, &outcomes, ctx);

        ctx.run_log
            .info(&format!("Provisioning {}", component.display_name()));

        let result = match component {
            Component::Php => php::ensure(&config.components.php, ctx).await,
            Component::Redis => redis::ensure(&config.components.redis, ctx).await,
            Component::Mariadb => mariadb::ensure(&config.components.mariadb, ctx).await,
            Component::Laravel => {
                laravel::ensure(
                    &config.components.laravel,
                    &config.components.mariadb,
                    &config.components.redis,
                    ctx,
                )
                .await
            }
        };

        let outcome = match result {
            Ok(outcome) => {
                ctx.run_log
                    .success(&format!("{} ready", component.display_name()));
                outcome
            }
            Err(e) => {
                let message = format!("{:#}", e);
                ctx.run_log
                    .error(&format!("{} failed: {}", component.display_name(), message));
                ComponentOutcome::failed(component, message)
            }
        };

        outcomes.push(outcome);
    }

    outcomes
}

/// Dependencies are advisory: log a warning and keep going
fn warn_on_unmet_dependencies(
    component: Component,
    config: &StackConfig,
    outcomes: &[ComponentOutcome],
    ctx: &ProvisionContext<'_>,
) {
    for dep in component.dependencies() {
        if !dep.is_enabled(&config.components) {
            ctx.run_log.warning(&format!(
                "{} expects {} but it is disabled; continuing anyway",
                component.display_name(),
                dep.display_name()
            ));
        } else if outcomes
            .iter()
            .any(|o| o.component == *dep && !o.succeeded())
        {
            ctx.run_log.warning(&format!(
                "{} expects {} but it failed earlier; continuing anyway",
                component.display_name(),
                dep.display_name()
            ));
        }
    }
}
