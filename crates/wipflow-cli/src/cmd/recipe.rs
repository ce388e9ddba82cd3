use crate::output::{print_batch, print_json, print_report, print_table};
use crate::station::Station;
use anyhow::Context;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use wipflow_core::engine;
use wipflow_core::recipe::Recipe;

#[derive(Subcommand)]
pub enum RecipeSubcommand {
    /// Parse a formula offline and show the actions it would run
    Check { formula: String },
}

/// Where a recipe comes from: a scanned formula or a recipe file.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct RecipeSource {
    /// Formula such as "TAG:Cleaned;MAIN:MOVE:Ready for Buyer"
    #[arg(long)]
    formula: Option<String>,
    /// JSON or YAML list of {kind, target, value}
    #[arg(long, value_name = "PATH")]
    recipe_file: Option<PathBuf>,
}

impl RecipeSource {
    pub fn load(&self) -> anyhow::Result<Recipe> {
        match (&self.formula, &self.recipe_file) {
            (Some(formula), _) => Recipe::parse(formula).context("invalid recipe formula"),
            (None, Some(path)) => Recipe::load(path)
                .with_context(|| format!("failed to load recipe {}", path.display())),
            (None, None) => anyhow::bail!("pass --formula or --recipe-file"),
        }
    }
}

pub fn run(subcmd: RecipeSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        RecipeSubcommand::Check { formula } => check(&formula, json),
    }
}

fn check(formula: &str, json: bool) -> anyhow::Result<()> {
    let recipe = Recipe::parse(formula).context("invalid recipe formula")?;
    if json {
        return print_json(&recipe);
    }
    let rows = recipe
        .actions()
        .iter()
        .enumerate()
        .map(|(i, a)| {
            vec![
                (i + 1).to_string(),
                a.effective_target().to_string(),
                a.kind.to_string(),
                a.value.clone(),
            ]
        })
        .collect();
    print_table(&["#", "TARGET", "ACTION", "VALUE"], rows);
    println!("\nFormula: {}", recipe.to_formula());
    Ok(())
}

/// `wipflow run`: one recipe against one WIP.
pub fn run_one(
    station: &Station,
    device: Option<&str>,
    wip: &str,
    recipe: &Recipe,
    json: bool,
) -> anyhow::Result<()> {
    let session = station.open(device)?;
    let report = engine::run_recipe(&session, wip, recipe)?;
    print_report(&report, json)
}

/// `wipflow cart`: one recipe against every task carrying the cart tag.
pub fn run_cart(
    station: &Station,
    device: Option<&str>,
    cart_tag: &str,
    recipe: &Recipe,
    json: bool,
) -> anyhow::Result<()> {
    let session = station.open(device)?;
    let batch = engine::move_cart(&session, cart_tag, recipe)
        .with_context(|| format!("move cart '{cart_tag}' failed"))?;
    print_batch(&batch, json)
}
