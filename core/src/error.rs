//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// String errors default to `General`; fetch and parse failures are created explicitly
/// so the registry can tell them apart.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The description could not be retrieved (unreachable, non-2xx, unreadable).
    #[from(ignore)]
    #[display("Fetch Error: {_0}")]
    Fetch(String),

    /// The description does not fit the OpenAPI / Swagger grammar we extract from.
    #[from(ignore)]
    #[display("Parse Error: {_0}")]
    Parse(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
