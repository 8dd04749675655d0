#![deny(missing_docs)]

//! # Blockgen Core
//!
//! Discovery-to-model pipeline: API descriptions in, per-source action/type models out.
//!
//! Each source goes through the same strictly sequential steps:
//! document adapter (`oas`) -> type declaration -> property resolution -> action extraction.
//! Sources are independent; the [`SourceRegistry`] isolates their failures and the
//! [`ModelAggregator`] serves them to renderers.

/// Shared error types.
pub mod error;

/// OpenAPI (OAS) document adapter.
pub mod oas;

/// Type catalog, resolver and action extraction.
pub mod model;

/// Per-source storage with failure isolation.
pub mod registry;

/// Read-only aggregate views.
pub mod aggregate;

/// Serializable model export.
pub mod export;

pub use aggregate::{KeyedAction, KeyedType, ModelAggregator, SourceView};
pub use error::{AppError, AppResult};
pub use export::ModelDocument;
pub use model::{
    build_catalog, build_model, extract_actions, Action, ActionParam, BindingKind, TypeCatalog,
    TypeHandle, TypeKind, TypeRecord,
};
pub use oas::{from_utoipa, parse_api_description, ApiDescription};
pub use registry::{
    build_source, FailureKind, FetchedDocument, RegistrationOutcome, SourceEntry, SourceFailure,
    SourceRegistry, SourceSummary,
};
