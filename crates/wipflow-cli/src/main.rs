mod cmd;
mod output;
mod root;
mod station;

use clap::{Parser, Subcommand};
use cmd::{
    cert::CertSubcommand, config::ConfigSubcommand, ops::Operation, recipe::RecipeSource,
    recipe::RecipeSubcommand,
};
use station::Station;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "wipflow",
    about = "Shop-floor task automation for Asana: tag, route, and annotate work items by WIP code",
    version,
    propagate_version = true
)]
struct Cli {
    /// Station config (default: wipflow.yaml in this or a parent directory)
    #[arg(long, global = true, env = "WIPFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Device label appended to every comment
    #[arg(long, global = true, env = "WIPFLOW_DEVICE")]
    device: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Op(Operation),

    /// Run a recipe against one WIP
    Run {
        wip: String,
        #[command(flatten)]
        source: RecipeSource,
    },

    /// Run a recipe against every WIP carrying a cart tag
    Cart {
        cart_tag: String,
        #[command(flatten)]
        source: RecipeSource,
    },

    /// Show the parent task and subtask a WIP resolves to
    Resolve { wip: String },

    /// Work with recipe formulas
    Recipe {
        #[command(subcommand)]
        subcommand: RecipeSubcommand,
    },

    /// Validate and inspect the station configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Calibration certificate helpers
    Cert {
        #[command(subcommand)]
        subcommand: CertSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let device = cli.device.as_deref();
    let json = cli.json;

    // Offline commands never load the config; recipes are parsed before it.
    let station = || Station::load(&root::resolve_config(cli.config.as_deref()));

    match cli.command {
        Commands::Recipe { subcommand } => cmd::recipe::run(subcommand, json),
        Commands::Cert { subcommand } => cmd::cert::run(subcommand, json),
        Commands::Config { subcommand } => cmd::config::run(&station()?, subcommand, json),
        Commands::Op(op) => cmd::ops::run(&station()?, device, op, json),
        Commands::Run { wip, source } => {
            let recipe = source.load()?;
            cmd::recipe::run_one(&station()?, device, &wip, &recipe, json)
        }
        Commands::Cart { cart_tag, source } => {
            let recipe = source.load()?;
            cmd::recipe::run_cart(&station()?, device, &cart_tag, &recipe, json)
        }
        Commands::Resolve { wip } => cmd::resolve::run(&station()?, device, &wip, json),
    }
}
