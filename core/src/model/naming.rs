#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Helper functions for deriving block-safe action and controller names from routes and
//! Operation IDs.

use regex::Regex;
use std::sync::LazyLock;

/// Controller used when a route has no literal segment (e.g. `/` or `/{id}`).
pub const DEFAULT_CONTROLLER: &str = "default";

static PLACEHOLDER: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}"));

/// Leading segments that carry no grouping meaning: `api` and versions like `v2` or `v1.1`.
static ROUTE_PREFIX: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?i)^(api|v\d+(\.\d+)*)$"));

/// Converts a mixed-case string (CamelCase or camelCase) to snake_case.
/// Separators other than ASCII alphanumerics become `_`.
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 && !result.ends_with('_') {
                result.push('_');
            }
            for lc in c.to_lowercase() {
                result.push(lc);
            }
        } else if c.is_ascii_alphanumeric() {
            result.push(c);
        } else if !result.is_empty() && !result.ends_with('_') {
            result.push('_');
        }
    }
    result.trim_end_matches('_').to_string()
}

/// Derives an action name from the HTTP Method and URL path when `operationId` is missing.
///
/// e.g. `GET /users/{id}` -> `get_users_id`
pub fn derive_action_name(method: &str, path: &str) -> String {
    let clean_path = path.replace(['{', '}'], "").replace(['/', '-', '.'], "_");
    format!(
        "{}_{}",
        method.to_lowercase(),
        clean_path.trim_start_matches('_')
    )
    .trim_end_matches('_')
    .to_string()
}

/// Derives the grouping name of a route without tags.
///
/// Leading `api` and version segments are skipped and the next literal segment is used.
/// A route made only of such prefixes falls back to its last literal segment.
///
/// e.g. `/widgets/{id}/parts` -> `widgets`, `/api/v1/things/{id}` -> `things`,
/// `/{id}` -> `default`
pub fn derive_controller_name(path: &str) -> String {
    let stripped = strip_placeholders(path);
    let literals: Vec<&str> = stripped
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();

    literals
        .iter()
        .find(|segment| !is_route_prefix(segment))
        .or_else(|| literals.last())
        .map_or_else(|| DEFAULT_CONTROLLER.to_string(), |s| s.to_string())
}

fn is_route_prefix(segment: &str) -> bool {
    ROUTE_PREFIX
        .as_ref()
        .is_ok_and(|re| re.is_match(segment))
}

fn strip_placeholders(path: &str) -> String {
    match PLACEHOLDER.as_ref() {
        Ok(re) => re.replace_all(path, "").into_owned(),
        Err(_) => path.to_string(),
    }
}
