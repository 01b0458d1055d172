//! Command helper utilities

use std::path::PathBuf;

use crate::auth;
use crate::error::{PackmindError, Result};
use crate::gateway::HttpGateway;

/// Resolve the directory commands operate on
pub fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|err| PackmindError::IoError {
        message: format!("Failed to get current directory: {err}"),
    })
}

/// Build the API gateway from stored credentials
pub fn gateway() -> Result<HttpGateway> {
    Ok(HttpGateway::new(auth::load()?))
}

/// Singular or plural noun for a count
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        plural.to_string()
    }
}

/// `Installing 2 commands, 1 standard...` style parts for a sync result
pub fn installing_parts(result: &crate::domain::FileOperationResult) -> String {
    let mut parts = Vec::new();
    if result.recipes_count > 0 {
        parts.push(format!("{} commands", result.recipes_count));
    }
    if result.standards_count > 0 {
        parts.push(format!("{} standards", result.standards_count));
    }
    if result.skills_count > 0 {
        parts.push(format!("{} skills", result.skills_count));
    }
    if parts.is_empty() {
        "artifacts".to_string()
    } else {
        parts.join(", ")
    }
}
