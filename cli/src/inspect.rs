#![deny(missing_docs)]

//! # Inspect Command
//!
//! Runs the same pipeline as `generate` and prints a human readable summary per source.

use crate::config::{SourceArgs, SourceConfig};
use crate::error::CliResult;
use crate::generate::build_registry;
use blockgen_core::ModelAggregator;
use std::fmt::Write;

/// Arguments for the inspect command.
#[derive(clap::Args, Debug, Clone)]
pub struct InspectArgs {
    #[clap(flatten)]
    pub sources: SourceArgs,

    /// List every action of each source.
    #[clap(long)]
    pub actions: bool,
}

/// Executes the inspect command.
pub fn execute(args: &InspectArgs) -> CliResult<()> {
    let config = SourceConfig::load(&args.sources)?;
    let aggregator = ModelAggregator::new(&build_registry(&config));
    print!("{}", render_summary(&aggregator, args.actions));
    Ok(())
}

/// Renders the summary text.
pub fn render_summary(aggregator: &ModelAggregator, with_actions: bool) -> String {
    let mut out = String::new();
    for view in aggregator.sources() {
        let types = view
            .referenced_types()
            .iter()
            .filter(|(_, record)| !record.is_builtin())
            .count();
        let _ = writeln!(
            out,
            "{}: {} actions, {} types ({})",
            view.key(),
            view.actions().len(),
            types,
            view.site().unwrap_or("no site")
        );

        if with_actions {
            for action in view.actions() {
                let _ = writeln!(
                    out,
                    "  [{}] {} {} {} -> {}",
                    action.controller,
                    action.name,
                    action.verb,
                    action.route,
                    view.type_of(action.return_type).name()
                );
            }
        }
    }

    for failure in aggregator.failures() {
        let _ = writeln!(
            out,
            "{}: FAILED ({:?}) {}",
            failure.key, failure.kind, failure.message
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockgen_core::{AppError, FetchedDocument, SourceRegistry};

    const HEALTH: &str = r##"
openapi: 3.0.0
servers: [{ url: "https://status.example.com" }]
paths:
  /health:
    get:
      operationId: getHealth
      responses:
        "200":
          content:
            application/json:
              schema: { $ref: "#/components/schemas/Health" }
components:
  schemas:
    Health:
      type: object
"##;

    #[test]
    fn test_render_summary() {
        let registry = SourceRegistry::new();
        registry.register("status", Ok(FetchedDocument::new("status.yaml", HEALTH)));
        registry.register("down", Err(AppError::Fetch("timed out".into())));

        let text = render_summary(&ModelAggregator::new(&registry), true);
        assert_eq!(
            text,
            "status: 1 actions, 1 types (https://status.example.com)\n\
             \x20 [health] get_health GET /health -> Health\n\
             down: FAILED (Fetch) Fetch Error: timed out\n"
        );
    }
}
