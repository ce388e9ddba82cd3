use crate::output::{print_json, print_table};
use crate::station::Station;
use anyhow::Context;
use clap::Subcommand;
use wipflow_core::binding::{bind, Binding};
use wipflow_core::config::{ConfigWarning, WarnLevel};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate the config and bind it against the taxonomy snapshot
    Validate,

    /// Show what every binding key resolved to
    Bindings,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(station: &Station, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate => validate(station, json),
        ConfigSubcommand::Bindings => bindings(station, json),
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(station: &Station, json: bool) -> anyhow::Result<()> {
    let mut warnings = station.config.validate();

    let taxonomy = station.taxonomy()?;
    // Binding needs every well-known key; validate() reports the missing ones.
    if station.config.bindings.missing_keys().is_empty() {
        let table =
            bind(&taxonomy, &station.config.bindings).context("failed to bind taxonomy")?;
        warnings.extend(table.warnings().iter().map(|w| ConfigWarning {
            level: WarnLevel::Warning,
            message: w.clone(),
        }));
    }
    if station.config.workspace_id(&taxonomy).is_none() {
        warnings.push(ConfigWarning {
            level: WarnLevel::Error,
            message: "no workspace id in config or snapshot".to_string(),
        });
    }

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

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// bindings
// ---------------------------------------------------------------------------

fn bindings(station: &Station, json: bool) -> anyhow::Result<()> {
    let taxonomy = station.taxonomy()?;
    let table = bind(&taxonomy, &station.config.bindings).context("failed to bind taxonomy")?;

    if json {
        return print_json(&table);
    }

    let rows = table
        .iter()
        .map(|(key, binding)| {
            let value = match binding {
                Binding::Single(gid) => gid.clone(),
                Binding::List(gids) if gids.is_empty() => "(none)".to_string(),
                Binding::List(gids) => gids.join(", "),
                Binding::Missing => "(missing)".to_string(),
            };
            vec![key.to_string(), value]
        })
        .collect();
    print_table(&["KEY", "GID"], rows);
    Ok(())
}
