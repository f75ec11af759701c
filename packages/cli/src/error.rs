//! Error types for the CLI.
//!
//! Conditions the operator can recover from at a prompt (mistyped tax id,
//! out-of-range selection, empty lookup) never become errors; everything
//! here aborts the command and is rendered as a one-line message.

use thiserror::Error;

/// Main error type for CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Portal call failed.
    #[error(transparent)]
    Client(#[from] fhc_client::ClientError),

    /// No stored bearer token.
    #[error("Not logged in. Run `fhc login` first")]
    NotLoggedIn,

    /// The account has no contract at all.
    #[error("No contract available on this account")]
    NoContract,

    /// The account's contract is not in the ACTIVE state.
    #[error("Contract is not active (state: {0})")]
    ContractInactive(String),

    /// The contract does not grant the capability a command needs.
    #[error("{0} is not available on this contract")]
    FeatureUnavailable(String),

    /// Receipt file type cannot be turned into model content.
    #[error("Unsupported file type or cannot decode: {0}")]
    UnsupportedFileType(String),

    /// Receipt file exists but could not be read or rendered.
    #[error("Failed to process receipt {path}: {message}")]
    ReceiptRead { path: String, message: String },

    /// The completion model's reply was not parseable as a receipt record.
    #[error("Model reply is not a valid receipt record: {0}")]
    MalformedModelOutput(String),

    /// Date groups do not reveal where the year is.
    #[error("Cannot determine year position in date '{0}'")]
    AmbiguousDate(String),

    #[error("No service found matching '{0}'")]
    NoServiceMatch(String),

    #[error("No person found matching '{0}'")]
    NoPersonMatch(String),

    /// The operator cancelled an interactive prompt.
    #[error("Cancelled: {0}")]
    SelectionCancelled(String),

    /// Completion endpoint failure (transport, status or reply shape).
    #[error("Completion request failed: {0}")]
    Llm(String),

    /// Configuration problem (missing key, unparseable config file).
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_unavailable_display() {
        let err = CliError::FeatureUnavailable("Refund submission".to_string());
        assert_eq!(
            err.to_string(),
            "Refund submission is not available on this contract"
        );
    }

    #[test]
    fn test_client_error_is_transparent() {
        let err = CliError::from(fhc_client::ClientError::Api {
            message: "boom".to_string(),
            status: 500,
        });
        assert_eq!(err.to_string(), "boom (500)");
    }

    #[test]
    fn test_ambiguous_date_display() {
        let err = CliError::AmbiguousDate("11/10/25".to_string());
        assert!(err.to_string().contains("11/10/25"));
    }
}
