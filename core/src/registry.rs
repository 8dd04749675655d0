#![deny(missing_docs)]

//! # Source Registry
//!
//! Maps a source key to its own independently built catalog and action list.
//!
//! Building a source (parse, declare, resolve, extract) needs no shared state, so callers may
//! build many sources concurrently with [`build_source`] and then [`SourceRegistry::commit`]
//! the results. Entries are replaced whole under a write lock; readers clone `Arc`s out of a
//! consistent snapshot. A failing source is recorded and logged here and never surfaces as an
//! error past this boundary.

use crate::error::{AppError, AppResult};
use crate::model::{build_model, Action, TypeCatalog};
use crate::oas::{parse_api_description, ApiDescription};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};
use url::Url;

/// A description document as retrieved by the fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    /// Where the document was read from (URL or file path).
    pub location: String,
    /// Raw JSON or YAML text.
    pub body: String,
}

impl FetchedDocument {
    /// Creates a fetched document.
    pub fn new(location: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            body: body.into(),
        }
    }
}

/// Cause category of a failed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The document could not be retrieved.
    Fetch,
    /// The document does not fit the description grammar.
    Parse,
    /// Anything else.
    Other,
}

impl From<&AppError> for FailureKind {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::Io(_) | AppError::Fetch(_) => FailureKind::Fetch,
            AppError::Parse(_) => FailureKind::Parse,
            AppError::General(_) => FailureKind::Other,
        }
    }
}

/// A failed registration, tagged with its source key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    /// Source key.
    pub key: String,
    /// Cause category.
    pub kind: FailureKind,
    /// Human readable cause.
    pub message: String,
}

impl SourceFailure {
    /// Tags `err` with the source key.
    pub fn from_error(key: &str, err: &AppError) -> Self {
        Self {
            key: key.to_string(),
            kind: FailureKind::from(err),
            message: err.to_string(),
        }
    }
}

/// One successfully registered source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntry {
    /// Source key.
    pub key: String,
    /// Location the document came from; `None` for in-process descriptions.
    pub location: Option<String>,
    /// Base URL the generated actions call, when one can be determined.
    pub site: Option<String>,
    /// Fully resolved types of this source.
    pub catalog: TypeCatalog,
    /// Actions in document order.
    pub actions: Vec<Action>,
}

impl SourceEntry {
    /// Short summary used in registration outcomes and listings.
    pub fn summary(&self) -> SourceSummary {
        SourceSummary {
            key: self.key.clone(),
            site: self.site.clone(),
            types: self.catalog.declared().count(),
            actions: self.actions.len(),
        }
    }
}

/// Counts describing a registered source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    /// Source key.
    pub key: String,
    /// Base URL, if any.
    pub site: Option<String>,
    /// Number of named types declared by the document.
    pub types: usize,
    /// Number of actions.
    pub actions: usize,
}

/// Result of a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The source was built and stored.
    Registered(SourceSummary),
    /// The source failed and is absent from the registry.
    Failed(SourceFailure),
}

impl RegistrationOutcome {
    /// Whether the source was stored.
    pub fn is_registered(&self) -> bool {
        matches!(self, RegistrationOutcome::Registered(_))
    }
}

/// Builds a source from a fetch result without touching any registry.
pub fn build_source(
    key: &str,
    fetched: AppResult<FetchedDocument>,
) -> Result<SourceEntry, SourceFailure> {
    let fetched = fetched.map_err(|e| SourceFailure::from_error(key, &e))?;
    let description =
        parse_api_description(&fetched.body).map_err(|e| SourceFailure::from_error(key, &e))?;
    Ok(build_entry(key, Some(&fetched.location), &description))
}

/// Builds a source from an already adapted description.
pub fn build_entry(key: &str, location: Option<&str>, description: &ApiDescription) -> SourceEntry {
    let (catalog, actions) = build_model(description);
    SourceEntry {
        key: key.to_string(),
        location: location.map(str::to_string),
        site: select_site(location, &description.servers),
        catalog,
        actions,
    }
}

/// Picks the base URL of a source.
///
/// For an HTTP location: the first server whose URL (resolved against the location) starts
/// with the location's scheme and authority, else that scheme and authority. Otherwise the
/// first absolute HTTP server, if any.
pub fn select_site(location: Option<&str>, servers: &[String]) -> Option<String> {
    let origin_url = location
        .and_then(|l| Url::parse(l).ok())
        .filter(|u| matches!(u.scheme(), "http" | "https"));

    let Some(origin_url) = origin_url else {
        return servers
            .iter()
            .filter_map(|s| Url::parse(s).ok())
            .find(|u| matches!(u.scheme(), "http" | "https"))
            .map(|u| trim_slash(u.as_str()));
    };

    let origin = origin_url.origin().ascii_serialization();
    servers
        .iter()
        .filter_map(|s| origin_url.join(s).ok())
        .map(|u| trim_slash(u.as_str()))
        .find(|u| u.starts_with(&origin))
        .or(Some(origin))
}

fn trim_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// A consistent view of the registry at one instant.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    /// Registered sources in registration order.
    pub entries: Vec<Arc<SourceEntry>>,
    /// Last failure of every failed key, in failure order.
    pub failures: Vec<SourceFailure>,
}

#[derive(Debug, Default)]
struct RegistryState {
    entries: IndexMap<String, Arc<SourceEntry>>,
    failures: IndexMap<String, SourceFailure>,
}

/// Thread-safe store of the registered sources.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    state: RwLock<RegistryState>,
}

impl SourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and stores the source `key` from a fetch result.
    ///
    /// Fetch and parse failures are recorded against the key instead of being returned.
    pub fn register(&self, key: &str, fetched: AppResult<FetchedDocument>) -> RegistrationOutcome {
        self.commit(build_source(key, fetched))
    }

    /// Builds and stores the source `key` from an in-process description.
    pub fn register_description(
        &self,
        key: &str,
        description: &ApiDescription,
    ) -> RegistrationOutcome {
        self.commit(Ok(build_entry(key, None, description)))
    }

    /// Stores a source built elsewhere (e.g. on a worker thread).
    ///
    /// Success replaces any previous entry of the key in place; failure removes it.
    pub fn commit(&self, built: Result<SourceEntry, SourceFailure>) -> RegistrationOutcome {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match built {
            Ok(entry) => {
                let summary = entry.summary();
                state.failures.shift_remove(&entry.key);
                state.entries.insert(entry.key.clone(), Arc::new(entry));
                info!(
                    source = %summary.key,
                    site = summary.site.as_deref().unwrap_or("-"),
                    types = summary.types,
                    actions = summary.actions,
                    "Source registered"
                );
                RegistrationOutcome::Registered(summary)
            }
            Err(failure) => {
                state.entries.shift_remove(&failure.key);
                state.failures.shift_remove(&failure.key);
                state.failures.insert(failure.key.clone(), failure.clone());
                warn!(
                    source = %failure.key,
                    kind = ?failure.kind,
                    error = %failure.message,
                    "Source failed, excluded from the model"
                );
                RegistrationOutcome::Failed(failure)
            }
        }
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> Vec<String> {
        self.read().entries.keys().cloned().collect()
    }

    /// The entry of `key`, if registered.
    pub fn get(&self, key: &str) -> Option<Arc<SourceEntry>> {
        self.read().entries.get(key).cloned()
    }

    /// Last failure of every failed key.
    pub fn failures(&self) -> Vec<SourceFailure> {
        self.read().failures.values().cloned().collect()
    }

    /// Keys whose last registration failed.
    pub fn failed_keys(&self) -> Vec<String> {
        self.read().failures.keys().cloned().collect()
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// True when no source is registered.
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Entries and failures taken under a single read lock.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.read();
        RegistrySnapshot {
            entries: state.entries.values().cloned().collect(),
            failures: state.failures.values().cloned().collect(),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETS: &str = r##"
openapi: 3.0.0
servers:
  - url: /v2
paths:
  /pets:
    get:
      responses:
        "200":
          content:
            application/json:
              schema: { $ref: "#/components/schemas/Pet" }
components:
  schemas:
    Pet:
      type: object
      properties:
        name: { type: string }
"##;

    fn fetched(body: &str) -> AppResult<FetchedDocument> {
        Ok(FetchedDocument::new("https://pets.example.com/openapi.yaml", body))
    }

    fn refused() -> AppResult<FetchedDocument> {
        Err(AppError::Fetch(
            "https://down.example.com/openapi.yaml: Connection refused".into(),
        ))
    }

    #[test]
    fn test_register_success() {
        let registry = SourceRegistry::new();
        let outcome = registry.register("pets", fetched(PETS));

        assert_eq!(
            outcome,
            RegistrationOutcome::Registered(SourceSummary {
                key: "pets".into(),
                site: Some("https://pets.example.com/v2".into()),
                types: 1,
                actions: 1,
            })
        );
        assert_eq!(registry.keys(), vec!["pets"]);
        let entry = registry.get("pets").unwrap();
        assert_eq!(entry.actions[0].route, "/pets");
        assert!(registry.failures().is_empty());
    }

    #[test]
    fn test_fetch_failure_is_isolated() {
        let registry = SourceRegistry::new();
        registry.register("pets", fetched(PETS));
        let outcome = registry.register("down", refused());

        match outcome {
            RegistrationOutcome::Failed(failure) => {
                assert_eq!(failure.key, "down");
                assert_eq!(failure.kind, FailureKind::Fetch);
                assert!(failure.message.contains("Connection refused"));
            }
            other => panic!("Expected failure, got {:?}", other),
        }
        assert_eq!(registry.keys(), vec!["pets"]);
        assert!(registry.get("down").is_none());
        assert_eq!(registry.failed_keys(), vec!["down"]);
    }

    #[test]
    fn test_parse_failure_is_tagged() {
        let registry = SourceRegistry::new();
        let outcome = registry.register("broken", fetched("paths: {}\n"));
        match outcome {
            RegistrationOutcome::Failed(failure) => assert_eq!(failure.kind, FailureKind::Parse),
            other => panic!("Expected failure, got {:?}", other),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reregistration_replaces_in_place() {
        let registry = SourceRegistry::new();
        registry.register("a", fetched(PETS));
        registry.register("b", fetched(PETS));
        let before = registry.get("a").unwrap();

        registry.register("a", fetched(PETS));
        assert_eq!(registry.keys(), vec!["a", "b"]);
        let after = registry.get("a").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(*before, *after);
    }

    #[test]
    fn test_failed_reregistration_removes_entry() {
        let registry = SourceRegistry::new();
        registry.register("a", fetched(PETS));
        registry.register("a", refused());
        assert!(registry.keys().is_empty());
        assert_eq!(registry.failed_keys(), vec!["a"]);

        registry.register("a", fetched(PETS));
        assert_eq!(registry.keys(), vec!["a"]);
        assert!(registry.failures().is_empty());
    }

    #[test]
    fn test_register_description_has_no_location() {
        let registry = SourceRegistry::new();
        let desc = ApiDescription {
            servers: vec!["http://localhost:8080/api/".into()],
            ..ApiDescription::default()
        };
        registry.register_description("local", &desc);
        let entry = registry.get("local").unwrap();
        assert_eq!(entry.location, None);
        assert_eq!(entry.site.as_deref(), Some("http://localhost:8080/api"));
        assert!(entry.actions.is_empty());
    }

    #[test]
    fn test_concurrent_build_then_ordered_commit() {
        let registry = SourceRegistry::new();
        let keys = ["one", "two", "three", "four"];

        let built: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = keys
                .iter()
                .map(|key| scope.spawn(move || build_source(key, fetched(PETS))))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for result in built {
            registry.commit(result);
        }

        assert_eq!(registry.keys(), keys);
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.entries.len(), 4);
        assert!(snapshot.failures.is_empty());
    }

    #[test]
    fn test_select_site() {
        let servers = vec![
            "https://other.example.com/api".to_string(),
            "/v1/".to_string(),
        ];
        assert_eq!(
            select_site(Some("https://api.example.com/docs/openapi.json"), &servers),
            Some("https://api.example.com/v1".into())
        );
        assert_eq!(
            select_site(Some("https://api.example.com:8443/openapi.json"), &[]),
            Some("https://api.example.com:8443".into())
        );
        assert_eq!(
            select_site(Some("./specs/petstore.yaml"), &servers),
            Some("https://other.example.com/api".into())
        );
        assert_eq!(select_site(Some("/tmp/petstore.yaml"), &["/v1".into()]), None);
        assert_eq!(select_site(None, &[]), None);
    }
}
