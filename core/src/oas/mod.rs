#![deny(missing_docs)]

//! # OpenAPI Adapter Module
//!
//! - **models**: Normalized description handed to the model builder.
//! - **shims**: Lenient deserialization layer for OpenAPI 3.x / Swagger 2.0.
//! - **document**: Shim -> description conversion, plus the `utoipa` adapter.
//! - **ref_utils**: `$ref` -> identifier helpers.

pub mod document;
pub mod models;
pub mod ref_utils;
pub mod shims;

pub use document::{description_from_value, from_utoipa, parse_api_description};
pub use models::{
    ApiDescription, OperationDecl, ParameterDecl, PropertyDecl, SchemaDecl, SchemaRef,
};
