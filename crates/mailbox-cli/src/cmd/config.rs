use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use mailbox_core::config::{ServiceConfig, WarnLevel};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the resolved configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(config_path: Option<&Path>, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    let config = ServiceConfig::load_or_default(config_path).context("failed to load config")?;
    match subcmd {
        ConfigSubcommand::Show => show(&config, json),
        ConfigSubcommand::Validate => validate(&config, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(config: &ServiceConfig, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(config);
    }
    let port = config
        .port
        .map(|p| p.to_string())
        .unwrap_or_else(|| "(unset)".to_string());
    print_table(
        &["KEY", "VALUE"],
        vec![
            vec!["version".into(), config.version.to_string()],
            vec!["port".into(), port],
            vec!["default_tenant".into(), config.default_tenant.clone()],
            vec!["tenant_header".into(), config.tenant_header.clone()],
            vec!["correlation_header".into(), config.correlation_header.clone()],
        ],
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(config: &ServiceConfig, json: bool) -> anyhow::Result<()> {
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
