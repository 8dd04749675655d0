#![deny(missing_docs)]

//! # Source Configuration
//!
//! Reads the ordered `key -> location` map of sources from a YAML file and/or repeated
//! `--source key=location` flags. Flags override file entries with the same key in place.
//!
//! ```yaml
//! sources:
//!   petstore: https://petstore3.swagger.io/api/v3/openapi.json
//!   local: specs/local.yaml
//! ```
//!
//! Relative file locations in the YAML file are resolved against the file's directory.

use crate::error::{CliError, CliResult};
use crate::fetch::is_url;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Arguments selecting the sources of a run.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// YAML file listing the sources (`sources: {key: location}`).
    #[clap(long, env = "BLOCKGEN_SOURCES")]
    pub sources: Option<PathBuf>,

    /// Additional source as `key=location` (URL or file path). Repeatable.
    #[clap(long = "source", value_parser = parse_key_val)]
    pub source: Vec<(String, String)>,
}

/// Helper to parse "key=value" arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=location: no `=` found in `{}`", s))?;
    let (key, location) = (s[..pos].trim(), s[pos + 1..].trim());
    if key.is_empty() || location.is_empty() {
        return Err(format!("invalid KEY=location: empty key or location in `{}`", s));
    }
    Ok((key.to_string(), location.to_string()))
}

#[derive(Debug, Deserialize)]
struct SourcesFile {
    #[serde(default)]
    sources: IndexMap<String, String>,
}

/// The resolved, ordered source set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceConfig {
    /// Source key -> location, in configuration order.
    pub sources: IndexMap<String, String>,
}

impl SourceConfig {
    /// Merges the sources file (if any) with the `--source` flags.
    pub fn load(args: &SourceArgs) -> CliResult<Self> {
        let mut sources = match &args.sources {
            Some(path) => read_sources_file(path)?,
            None => IndexMap::new(),
        };
        for (key, location) in &args.source {
            sources.insert(key.clone(), location.clone());
        }
        debug!(count = sources.len(), "Source configuration loaded");
        Ok(Self { sources })
    }

    /// True when no source is configured.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

fn read_sources_file(path: &Path) -> CliResult<IndexMap<String, String>> {
    let text = fs::read_to_string(path).map_err(|e| {
        CliError::Config(format!("Failed to read sources file {:?}: {}", path, e))
    })?;
    let file: SourcesFile = serde_yaml::from_str(&text).map_err(|e| {
        CliError::Config(format!("Failed to parse sources file {:?}: {}", path, e))
    })?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(file
        .sources
        .into_iter()
        .map(|(key, location)| {
            let location = resolve_location(base, &location);
            (key, location)
        })
        .collect())
}

fn resolve_location(base: &Path, location: &str) -> String {
    if is_url(location) || Path::new(location).is_absolute() {
        return location.to_string();
    }
    base.join(location).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("pets=https://example.com/openapi.json?v=2").unwrap(),
            ("pets".into(), "https://example.com/openapi.json?v=2".into())
        );
        assert!(parse_key_val("pets").is_err());
        assert!(parse_key_val("=x").is_err());
        assert!(parse_key_val("x=").is_err());
    }

    #[test]
    fn test_file_then_flags_override_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.yaml");
        fs::write(
            &path,
            "sources:\n  pets: https://pets.example.com/openapi.json\n  local: specs/local.yaml\n",
        )
        .unwrap();

        let args = SourceArgs {
            sources: Some(path),
            source: vec![
                ("pets".into(), "https://mirror.example.com/openapi.json".into()),
                ("extra".into(), "/abs/extra.yaml".into()),
            ],
        };
        let config = SourceConfig::load(&args).unwrap();

        let entries: Vec<_> = config
            .sources
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("pets", "https://mirror.example.com/openapi.json".to_string()),
                (
                    "local",
                    dir.path()
                        .join("specs/local.yaml")
                        .to_string_lossy()
                        .into_owned()
                ),
                ("extra", "/abs/extra.yaml".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_sources_is_empty() {
        let config = SourceConfig::load(&SourceArgs::default()).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let args = SourceArgs {
            sources: Some(PathBuf::from("/definitely/not/here.yaml")),
            source: vec![],
        };
        assert!(matches!(
            SourceConfig::load(&args),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.yaml");
        fs::write(&path, "sources: [not, a, map]\n").unwrap();
        let args = SourceArgs {
            sources: Some(path),
            source: vec![],
        };
        assert!(matches!(
            SourceConfig::load(&args),
            Err(CliError::Config(_))
        ));
    }
}
