#![deny(missing_docs)]

//! # Blockgen CLI
//!
//! Builds block editor action/type models from registered API description sources.
//!
//! Supported Commands:
//! - `generate`: Fetch, build and export the model as JSON.
//! - `inspect`: Print a per-source summary.
//! - `serve`: Serve the model over HTTP.

use clap::{Parser, Subcommand};
use error::CliResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod error;
mod fetch;
mod generate;
mod inspect;
#[cfg(feature = "server")]
mod serve;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Block editor model generator")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the model of every source and write it as JSON.
    Generate(generate::GenerateArgs),
    /// Print a summary of every source.
    Inspect(inspect::InspectArgs),
    /// Serve the model over HTTP.
    #[cfg(feature = "server")]
    Serve(serve::ServeArgs),
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "blockgen=debug,blockgen_core=debug"
    } else {
        "blockgen=info,blockgen_core=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate(args) => generate::execute(args)?,
        Commands::Inspect(args) => inspect::execute(args)?,
        #[cfg(feature = "server")]
        Commands::Serve(args) => serve::execute(args)?,
    }

    Ok(())
}
