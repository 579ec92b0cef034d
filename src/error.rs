//! Error types for the object storage client.

use thiserror::Error;

/// Unified error type for all client operations.
///
/// Remote error statuses (4xx/5xx) are not represented here: they come back
/// to the caller inside a [`Response`](crate::Response) for inspection.
#[derive(Error, Debug)]
pub enum OfsError {
    /// A container argument contained a path separator.
    #[error("Invalid container name {0:?}: must pass a container name, not a path")]
    InvalidContainer(String),

    /// An upload destination looked like a file path rather than a directory.
    #[error("Invalid put path {0:?}: must be a directory, not a file")]
    InvalidPutPath(String),

    /// A configured base URL is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Credentials failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The token endpoint rejected the credentials or returned no token.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The HTTP exchange itself failed (connect, TLS, timeout, ...).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A local file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A successful listing response was not a JSON array of object records.
    #[error("Malformed listing: {0}")]
    MalformedListing(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OfsError>;
