#![deny(missing_docs)]

//! # Model Module
//!
//! Turns an [`ApiDescription`] into the typed model of one source.
//!
//! - **catalog**: Type arena with the unknown sentinel and builtin primitives (pass 1).
//! - **resolver**: Attaches property types once every schema is declared (pass 2).
//! - **actions**: One typed action per (route, verb).
//! - **naming**: Action and controller name derivation.

pub mod actions;
pub mod catalog;
pub mod naming;
pub mod resolver;

pub use actions::{extract_actions, Action, ActionParam, BindingKind};
pub use catalog::{Property, TypeCatalog, TypeHandle, TypeKind, TypeRecord, UNKNOWN_TYPE_ID};

use crate::oas::models::ApiDescription;
use resolver::resolve_properties;
use tracing::debug;

/// Builds the fully resolved catalog of a description.
pub fn build_catalog(description: &ApiDescription) -> TypeCatalog {
    let mut catalog = TypeCatalog::new();
    catalog.declare_schemas(&description.schemas);
    let unresolved = resolve_properties(&mut catalog);
    debug!(
        types = catalog.declared().count(),
        unresolved, "Type catalog built"
    );
    catalog
}

/// Builds the catalog, then the actions, of a description.
pub fn build_model(description: &ApiDescription) -> (TypeCatalog, Vec<Action>) {
    let catalog = build_catalog(description);
    let actions = extract_actions(description, &catalog);
    (catalog, actions)
}
