#![deny(missing_docs)]

//! # Fetch
//!
//! Retrieves a description document from an HTTP(S) URL or the filesystem.
//! One attempt per source; every failure becomes [`AppError::Fetch`].

use blockgen_core::{AppError, AppResult, FetchedDocument};
use std::fs;
use tracing::debug;

/// Whether `location` is fetched over HTTP.
pub fn is_url(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Fetches the document at `location`.
pub fn fetch(location: &str) -> AppResult<FetchedDocument> {
    debug!(location, "Fetching description");
    let body = if is_url(location) {
        fetch_url(location)?
    } else {
        fs::read_to_string(location)
            .map_err(|e| AppError::Fetch(format!("{}: {}", location, e)))?
    };
    Ok(FetchedDocument::new(location, body))
}

#[cfg(feature = "client")]
fn fetch_url(url: &str) -> AppResult<String> {
    let mut response = ureq::get(url)
        .call()
        .map_err(|e| AppError::Fetch(format!("{}: {}", url, e)))?;
    response
        .body_mut()
        .read_to_string()
        .map_err(|e| AppError::Fetch(format!("{}: {}", url, e)))
}

#[cfg(not(feature = "client"))]
fn fetch_url(url: &str) -> AppResult<String> {
    Err(AppError::Fetch(format!(
        "{}: built without the `client` feature",
        url
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/openapi.json"));
        assert!(is_url("HTTP://example.com/openapi.json"));
        assert!(!is_url("specs/openapi.yaml"));
        assert!(!is_url("/tmp/http://weird"));
    }

    #[test]
    fn test_fetch_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openapi.yaml");
        fs::write(&path, "openapi: 3.0.0\npaths: {}\n").unwrap();

        let location = path.to_string_lossy().into_owned();
        let doc = fetch(&location).unwrap();
        assert_eq!(doc.location, location);
        assert!(doc.body.starts_with("openapi: 3.0.0"));
    }

    #[test]
    fn test_missing_file_is_fetch_error() {
        let res = fetch("/definitely/not/here.yaml");
        assert!(matches!(res, Err(AppError::Fetch(msg)) if msg.contains("/definitely/not/here.yaml")));
    }

    #[cfg(feature = "client")]
    #[test]
    fn test_connection_refused_is_fetch_error() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let res = fetch(&format!("http://127.0.0.1:{}/openapi.json", port));
        assert!(matches!(res, Err(AppError::Fetch(_))));
    }
}
