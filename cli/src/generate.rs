#![deny(missing_docs)]

//! # Generate Command
//!
//! Fetches and builds every configured source concurrently, registers the results in
//! configuration order and writes the exported model as JSON.
//!
//! A failing source never fails the command: it is logged and listed under `failures`.

use crate::config::{SourceArgs, SourceConfig};
use crate::error::CliResult;
use crate::fetch::fetch;
use blockgen_core::export::ModelDocument;
use blockgen_core::{build_source, ModelAggregator, SourceRegistry};
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub sources: SourceArgs,

    /// Output file for the JSON model (stdout when omitted).
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

/// Fetches and builds every source in parallel, then commits them in configuration order.
pub fn build_registry(config: &SourceConfig) -> SourceRegistry {
    if config.is_empty() {
        warn!("No sources configured, the model will be empty");
    }

    let work: Vec<(&String, &String)> = config.sources.iter().collect();
    let built: Vec<_> = work
        .par_iter()
        .map(|(key, location)| build_source(key, fetch(location)))
        .collect();

    let registry = SourceRegistry::new();
    for result in built {
        registry.commit(result);
    }
    registry
}

/// Runs the whole pipeline and exports the aggregate.
pub fn build_document(args: &SourceArgs) -> CliResult<ModelDocument> {
    let config = SourceConfig::load(args)?;
    let registry = build_registry(&config);
    let aggregator = ModelAggregator::new(&registry);
    info!(
        registered = aggregator.keys().len(),
        failed = aggregator.failed_keys().len(),
        "Model built"
    );
    Ok(ModelDocument::from_aggregator(&aggregator))
}

/// Executes the generate command.
pub fn execute(args: &GenerateArgs) -> CliResult<()> {
    let document = build_document(&args.sources)?;
    let json = document.to_json_pretty()?;

    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            info!(path = %path.display(), "Model written");
        }
        None => println!("{}", json),
    }
    Ok(())
}
