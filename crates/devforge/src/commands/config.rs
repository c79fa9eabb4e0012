//! Config command

use anyhow::{anyhow, Result};
use camino::Utf8Path;
use devforge_core::types::{build_plan, Component};
use devforge_core::{generate_default_config, LoadedConfig};

use crate::cli::{ConfigCommands, ConfigInitArgs, ConfigShowArgs, ConfigValidateArgs};
use crate::report;

pub async fn run(cmd: ConfigCommands, config_path: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Init(args) => init(args),
        ConfigCommands::Validate(args) => validate(args, config_path),
        ConfigCommands::Show(args) => show(args, config_path),
    }
}

fn init(args: ConfigInitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        return Err(anyhow!(
            "File {} already exists. Use --force to overwrite.",
            args.output
        ));
    }

    // Default the project name to the current directory's name
    let name = args.name.unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "laravel-app".to_string())
            .to_lowercase()
            .replace(' ', "-")
    });

    std::fs::write(&args.output, generate_default_config(&name))?;

    report::ok(&format!("Created {}", args.output));
    report::kv("Project name", &name);
    report::note("Edit the component sections, then run 'devforge provision'");

    Ok(())
}

fn validate(args: ConfigValidateArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let path = args.file.as_deref().or(config_path);
    let loaded = LoadedConfig::load_and_validate(path)?;

    report::ok(&format!("Configuration is valid: {}", loaded.config_path));

    let plan = build_plan(&loaded.config.components);
    let enabled = if plan.is_empty() {
        "none".to_string()
    } else {
        plan.iter()
            .map(|c| c.display_name())
            .collect::<Vec<_>>()
            .join(", ")
    };
    report::kv("Enabled components", &enabled);

    Ok(())
}

fn show(args: ConfigShowArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let loaded = LoadedConfig::load(config_path)?;

    if args.json {
        println!("{}", loaded.to_json()?);
        return Ok(());
    }

    let c = &loaded.config.components;

    report::header("Components");
    for component in Component::PROVISION_ORDER {
        let label = if component.is_enabled(c) {
            "enabled"
        } else {
            "disabled"
        };
        report::kv(component.display_name(), label);
    }

    report::header("PHP");
    report::kv("Version", &c.php.version);
    report::kv("Extensions", &c.php.extensions.join(", "));
    report::kv("Memory limit", &c.php.memory_limit);

    report::header("Redis");
    report::kv("Port", &c.redis.port.to_string());
    report::kv("Max memory", &c.redis.max_memory);
    report::kv("Eviction policy", &c.redis.eviction_policy.to_string());
    report::kv("Persistence", if c.redis.persistence { "on" } else { "off" });

    report::header("MariaDB");
    report::kv("Port", &c.mariadb.port.to_string());
    report::kv("Database", &c.mariadb.database);
    report::kv("User", &c.mariadb.user);

    report::header("Laravel");
    report::kv("Project", &c.laravel.project_name);
    report::kv("Version", &c.laravel.version);
    report::kv("Cache driver", &c.laravel.cache_driver);
    report::kv("Database driver", &c.laravel.database_driver);
    report::kv(
        "API scaffold",
        if c.laravel.generate_api { "yes" } else { "no" },
    );

    report::header("Paths");
    report::kv("Scripts dir", loaded.config.paths.scripts_dir.as_str());
    report::kv("Project root", loaded.config.paths.project_root.as_str());

    Ok(())
}
