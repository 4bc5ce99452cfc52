//! `fishpass` command-line tool.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Upstream fish-passage propagation over stream networks.
#[derive(Parser)]
#[command(name = "fishpass")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Upstream fish-passage propagation over stream networks", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Propagate origin populations upstream and write the result table
    Run(commands::run::RunArgs),
    /// Build the network and print a structural summary
    Validate(commands::validate::ValidateArgs),
    /// Classify watersheds and print main stems and origins
    Classify(commands::classify::ClassifyArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Classify(args) => commands::classify::execute(args),
    }
}
