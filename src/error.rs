//! Error types and handling for the Packmind CLI
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Packmind CLI operations
#[derive(Error, Diagnostic, Debug)]
pub enum PackmindError {
    // Configuration errors
    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(
        code(packmind::config::parse_failed),
        help("Fix the packmind.json file or delete it to continue")
    )]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(
        code(packmind::config::invalid),
        help("Expected a JSON object of the form {{ \"packages\": {{ ... }} }}")
    )]
    ConfigInvalid { message: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(packmind::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    // Authentication errors
    #[error("Not logged in")]
    #[diagnostic(
        code(packmind::auth::not_logged_in),
        help("Set PACKMIND_API_KEY to the API key from your Packmind organization settings")
    )]
    NotLoggedIn,

    #[error("Invalid API key: {reason}")]
    #[diagnostic(
        code(packmind::auth::invalid_api_key),
        help("Copy a fresh API key from your Packmind organization settings")
    )]
    InvalidApiKey { reason: String },

    // Network / API errors
    #[error("Packmind server is not accessible at {host}")]
    #[diagnostic(
        code(packmind::api::unreachable),
        help("Check your network connection or the server URL")
    )]
    ServerUnreachable { host: String },

    #[error("{message}")]
    #[diagnostic(
        code(packmind::api::not_found),
        help(
            "Check that the package slug is correctly spelled and exists in your organization, \
             or remove it from packmind.json"
        )
    )]
    NotFound { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(packmind::api::validation),
        help("Check the command syntax and that every package slug is valid")
    )]
    Validation { message: String },

    #[error("API request failed: {message}")]
    #[diagnostic(code(packmind::api::request_failed))]
    ApiRequestFailed { message: String },

    // Git errors
    #[error("Not in a git repository")]
    #[diagnostic(
        code(packmind::git::not_in_repo),
        help("This command requires a git repository with a remote configured")
    )]
    NotInGitRepository,

    #[error("Git operation failed: {message}")]
    #[diagnostic(code(packmind::git::operation_failed))]
    GitOperationFailed { message: String },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(packmind::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(packmind::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(packmind::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for PackmindError {
    fn from(err: std::io::Error) -> Self {
        PackmindError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PackmindError {
    fn from(err: serde_json::Error) -> Self {
        PackmindError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for PackmindError {
    fn from(err: git2::Error) -> Self {
        PackmindError::GitOperationFailed {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, PackmindError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PackmindError::NotFound {
            message: "Package 'backend' not found".to_string(),
        };
        assert_eq!(err.to_string(), "Package 'backend' not found");
    }

    #[test]
    fn test_error_code() {
        let err = PackmindError::NotLoggedIn;
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("packmind::auth::not_logged_in".to_string())
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PackmindError = io_err.into();
        assert!(matches!(err, PackmindError::IoError { .. }));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("not json");
        let err: PackmindError = parse_result.unwrap_err().into();
        assert!(matches!(err, PackmindError::ConfigParseFailed { .. }));
    }

    #[test]
    fn test_git_error_conversion() {
        let git_err = git2::Error::from_str("git error");
        let err: PackmindError = git_err.into();
        assert!(matches!(err, PackmindError::GitOperationFailed { .. }));
    }

    #[test]
    fn test_server_unreachable_message() {
        let err = PackmindError::ServerUnreachable {
            host: "https://app.packmind.com".to_string(),
        };
        assert!(err.to_string().contains("not accessible"));
        assert!(err.to_string().contains("app.packmind.com"));
    }
}
