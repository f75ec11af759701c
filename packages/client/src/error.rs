//! Error types for the portal client.

use thiserror::Error;

/// Main error type for portal API calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Login was rejected by the portal.
    #[error("Login failed: {message} ({status})")]
    Login { message: String, status: u16 },

    /// The portal signalled a failure (non-200 status).
    #[error("{message} ({status})")]
    Api { message: String, status: u16 },

    /// HTTP 200 but the response envelope carried `success = false`.
    ///
    /// The portal is not supposed to do this; kept distinct from [`ClientError::Api`]
    /// so callers can tell a protocol breach apart from an ordinary rejection.
    #[error("Protocol violation: status 200 without success")]
    ProtocolViolation,

    /// Transport-level failure (connection, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be decoded into the expected shape.
    #[error("Unexpected response from portal: {0}")]
    InvalidResponse(String),

    /// Local file could not be read for upload.
    #[error("Failed to read upload file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for portal client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
