#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Helpers turning `$ref` strings into catalog identifiers and component names.
//!
//! Only local references (`#/...`) are understood. External documents are never fetched;
//! a reference into another document keeps its raw text as identifier, which the catalog
//! will not find.

use percent_encoding::percent_decode_str;

const SCHEMA_ID_PREFIX: &str = "#/components/schemas/";

/// Catalog identifier of the named schema `name`.
///
/// OAS 3.x `components/schemas` and Swagger 2.0 `definitions` share this namespace.
pub fn schema_id(name: &str) -> String {
    format!("{}{}", SCHEMA_ID_PREFIX, name)
}

/// Converts a schema `$ref` into a catalog identifier.
///
/// - `#/components/schemas/User` -> `#/components/schemas/User`
/// - `#/definitions/User` -> `#/components/schemas/User`
/// - anything else is returned unchanged.
pub fn schema_id_from_ref(ref_str: &str) -> String {
    match local_segments(ref_str).as_deref() {
        Some(["components", "schemas", name]) | Some(["definitions", name]) => {
            schema_id(&decode_pointer_segment(name))
        }
        _ => ref_str.to_string(),
    }
}

/// Extracts a component name from a local `$ref`.
///
/// Accepts both `#/components/{section}/{name}` and the Swagger 2.0 top-level
/// `#/{section}/{name}` form.
pub fn extract_component_name(ref_str: &str, section: &str) -> Option<String> {
    let segments = local_segments(ref_str)?;
    let name = match segments.as_slice() {
        ["components", s, name] if *s == section => name,
        [s, name] if *s == section => name,
        _ => return None,
    };

    let decoded = decode_pointer_segment(name);
    if decoded.is_empty() {
        None
    } else {
        Some(decoded)
    }
}

/// Decodes a JSON Pointer segment (handles `~1` and `~0`, then percent encoding).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

fn local_segments(ref_str: &str) -> Option<Vec<&str>> {
    let pointer = ref_str.strip_prefix("#/")?;
    Some(pointer.split('/').collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_id_from_oas3_ref() {
        assert_eq!(
            schema_id_from_ref("#/components/schemas/User"),
            "#/components/schemas/User"
        );
    }

    #[test]
    fn test_schema_id_from_swagger_ref() {
        assert_eq!(
            schema_id_from_ref("#/definitions/User"),
            "#/components/schemas/User"
        );
    }

    #[test]
    fn test_schema_id_external_ref_untouched() {
        let ext = "other.yaml#/components/schemas/User";
        assert_eq!(schema_id_from_ref(ext), ext);
    }

    #[test]
    fn test_schema_id_decodes_segments() {
        assert_eq!(
            schema_id_from_ref("#/components/schemas/User%20Profile~1details"),
            "#/components/schemas/User Profile/details"
        );
    }

    #[test]
    fn test_extract_component_name() {
        assert_eq!(
            extract_component_name("#/components/parameters/Limit", "parameters").as_deref(),
            Some("Limit")
        );
        assert_eq!(
            extract_component_name("#/parameters/Limit", "parameters").as_deref(),
            Some("Limit")
        );
        assert!(extract_component_name("#/components/responses/Limit", "parameters").is_none());
        assert!(extract_component_name("#/components/parameters/", "parameters").is_none());
    }
}
