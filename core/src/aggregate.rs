#![deny(missing_docs)]

//! # Model Aggregator
//!
//! Read-only projection of a registry snapshot for the downstream renderer.
//!
//! Every action and type handed out is tagged with the key of the source that produced it.
//! Handles stay meaningful only against that source's catalog, available through
//! [`SourceView::catalog`].

use crate::model::{Action, TypeCatalog, TypeHandle, TypeRecord};
use crate::registry::{RegistrySnapshot, SourceEntry, SourceFailure, SourceRegistry};
use std::collections::HashSet;
use std::sync::Arc;

/// An action tagged with its source key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyedAction<'a> {
    /// Producing source.
    pub key: &'a str,
    /// The action.
    pub action: &'a Action,
}

/// A type tagged with its source key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyedType<'a> {
    /// Producing source.
    pub key: &'a str,
    /// Handle in that source's catalog.
    pub handle: TypeHandle,
    /// The type.
    pub record: &'a TypeRecord,
}

/// One registered source seen through the aggregator.
#[derive(Debug, Clone, Copy)]
pub struct SourceView<'a> {
    entry: &'a SourceEntry,
}

impl<'a> SourceView<'a> {
    /// Source key.
    pub fn key(&self) -> &'a str {
        &self.entry.key
    }

    /// Base URL of the source, if any.
    pub fn site(&self) -> Option<&'a str> {
        self.entry.site.as_deref()
    }

    /// The catalog every handle of this source refers to.
    pub fn catalog(&self) -> &'a TypeCatalog {
        &self.entry.catalog
    }

    /// Actions in document order.
    pub fn actions(&self) -> &'a [Action] {
        &self.entry.actions
    }

    /// Resolves a handle of this source.
    pub fn type_of(&self, handle: TypeHandle) -> &'a TypeRecord {
        self.entry.catalog.get(handle)
    }

    /// Types the renderer needs, in catalog order.
    ///
    /// Every declared type, plus the builtins (and the sentinel) that an action or a
    /// property actually refers to.
    pub fn referenced_types(&self) -> Vec<(TypeHandle, &'a TypeRecord)> {
        let catalog = &self.entry.catalog;
        let mut used = HashSet::new();
        for action in &self.entry.actions {
            used.insert(action.return_type);
            used.extend(action.params.values().map(|p| p.ty));
        }
        for (_, record) in catalog.declared() {
            used.extend(record.properties().iter().map(|p| p.ty()));
        }

        catalog
            .iter()
            .filter(|(handle, record)| !record.is_builtin() || used.contains(handle))
            .collect()
    }
}

/// Facade over a consistent registry snapshot.
#[derive(Debug, Clone, Default)]
pub struct ModelAggregator {
    entries: Vec<Arc<SourceEntry>>,
    failures: Vec<SourceFailure>,
}

impl ModelAggregator {
    /// Takes a snapshot of `registry`; later registrations are not observed.
    pub fn new(registry: &SourceRegistry) -> Self {
        Self::from_snapshot(registry.snapshot())
    }

    /// Wraps an existing snapshot.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            entries: snapshot.entries,
            failures: snapshot.failures,
        }
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    /// Keys that failed, in failure order.
    pub fn failed_keys(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.key.as_str()).collect()
    }

    /// Failures with their causes.
    pub fn failures(&self) -> &[SourceFailure] {
        &self.failures
    }

    /// The view of `key`, if registered.
    pub fn source(&self, key: &str) -> Option<SourceView<'_>> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|entry| SourceView { entry })
    }

    /// All sources in registration order.
    pub fn sources(&self) -> impl Iterator<Item = SourceView<'_>> {
        self.entries.iter().map(|entry| SourceView { entry })
    }

    /// Actions of `key`; empty for an unknown key.
    pub fn actions_for(&self, key: &str) -> Vec<KeyedAction<'_>> {
        self.source(key).map(keyed_actions).unwrap_or_default()
    }

    /// Actions of every source, grouped by source in registration order.
    pub fn all_actions(&self) -> Vec<KeyedAction<'_>> {
        self.sources().flat_map(keyed_actions).collect()
    }

    /// Referenced types of `key`; empty for an unknown key.
    pub fn types_for(&self, key: &str) -> Vec<KeyedType<'_>> {
        self.source(key).map(keyed_types).unwrap_or_default()
    }

    /// Referenced types of every source; types of different sources are never merged.
    pub fn all_types(&self) -> Vec<KeyedType<'_>> {
        self.sources().flat_map(keyed_types).collect()
    }
}

fn keyed_actions(view: SourceView<'_>) -> Vec<KeyedAction<'_>> {
    view.actions()
        .iter()
        .map(|action| KeyedAction {
            key: view.key(),
            action,
        })
        .collect()
}

fn keyed_types(view: SourceView<'_>) -> Vec<KeyedType<'_>> {
    view.referenced_types()
        .into_iter()
        .map(|(handle, record)| KeyedType {
            key: view.key(),
            handle,
            record,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::registry::FetchedDocument;

    const SHOP: &str = r##"
openapi: 3.0.0
paths:
  /orders/{id}:
    get:
      parameters:
        - { name: id, in: path, schema: { type: integer } }
      responses:
        "200":
          content:
            application/json:
              schema: { $ref: "#/components/schemas/Order" }
  /orders:
    post:
      requestBody:
        content:
          application/json:
            schema: { $ref: "#/components/schemas/Order" }
      responses:
        "200":
          content:
            application/json:
              schema: { type: object }
components:
  schemas:
    Order:
      type: object
      properties:
        total: { type: number }
    Unused:
      type: object
"##;

    fn registry() -> SourceRegistry {
        let registry = SourceRegistry::new();
        registry.register("shop", Ok(FetchedDocument::new("shop.yaml", SHOP)));
        registry.register("down", Err(AppError::Fetch("Connection refused".into())));
        registry.register("copy", Ok(FetchedDocument::new("copy.yaml", SHOP)));
        registry
    }

    #[test]
    fn test_keys_and_failures() {
        let aggregator = ModelAggregator::new(&registry());
        assert_eq!(aggregator.keys(), vec!["shop", "copy"]);
        assert_eq!(aggregator.failed_keys(), vec!["down"]);
        assert!(aggregator.source("down").is_none());
    }

    #[test]
    fn test_actions_are_tagged_with_key() {
        let aggregator = ModelAggregator::new(&registry());
        let shop = aggregator.actions_for("shop");
        assert_eq!(shop.len(), 2);
        assert!(shop.iter().all(|a| a.key == "shop"));

        let all = aggregator.all_actions();
        let keys: Vec<_> = all.iter().map(|a| (a.key, a.action.verb.as_str())).collect();
        assert_eq!(
            keys,
            vec![("shop", "GET"), ("shop", "POST"), ("copy", "GET"), ("copy", "POST")]
        );
        assert!(aggregator.actions_for("missing").is_empty());
    }

    #[test]
    fn test_referenced_types() {
        let aggregator = ModelAggregator::new(&registry());
        let ids: Vec<_> = aggregator
            .types_for("shop")
            .iter()
            .map(|t| t.record.id())
            .collect();
        // Sentinel (object response), number (property), integer (path param), then
        // the declared schemas.
        assert_eq!(
            ids,
            vec![
                "unknown",
                "integer",
                "number",
                "#/components/schemas/Order",
                "#/components/schemas/Unused"
            ]
        );
        assert_eq!(aggregator.all_types().len(), 2 * ids.len());
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_registrations() {
        let registry = registry();
        let aggregator = ModelAggregator::new(&registry);
        registry.register("late", Ok(FetchedDocument::new("late.yaml", SHOP)));
        assert_eq!(aggregator.keys(), vec!["shop", "copy"]);
    }

    #[test]
    fn test_empty_registry_yields_empty_model() {
        let aggregator = ModelAggregator::new(&SourceRegistry::new());
        assert!(aggregator.keys().is_empty());
        assert!(aggregator.all_actions().is_empty());
        assert!(aggregator.all_types().is_empty());
    }
}
