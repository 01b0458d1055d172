//! API credentials
//!
//! An API key is a base64-encoded JSON document `{"host": ..., "jwt": ...}`.
//! The organization id is read out of the JWT payload locally; the key
//! itself is sent as a bearer token.

use std::env;
use std::fs;
use std::path::PathBuf;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::Deserialize;

use crate::error::{PackmindError, Result};

/// Environment variable taking precedence over the stored credentials
pub const API_KEY_ENV: &str = "PACKMIND_API_KEY";

/// Decoded credentials ready for API calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    /// Server base URL, e.g. `https://app.packmind.com`
    pub host: String,
    /// Organization the JWT was issued for
    pub organization_id: String,
    /// The raw key, sent as the bearer token
    pub api_key: String,
}

#[derive(Deserialize)]
struct KeyDocument {
    host: String,
    jwt: String,
}

#[derive(Deserialize)]
struct JwtPayload {
    organization: JwtOrganization,
}

#[derive(Deserialize)]
struct JwtOrganization {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredentials {
    api_key: String,
}

/// Load credentials from the environment or the stored credentials file
///
/// `PACKMIND_API_KEY` wins when set. Absent both, the user is not logged in.
pub fn load() -> Result<ApiCredentials> {
    if let Ok(key) = env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            return decode(key.trim());
        }
    }

    let path = credentials_path().ok_or(PackmindError::NotLoggedIn)?;
    let content = fs::read_to_string(&path).map_err(|_| PackmindError::NotLoggedIn)?;
    let stored: StoredCredentials =
        serde_json::from_str(&content).map_err(|err| PackmindError::InvalidApiKey {
            reason: format!("stored credentials are malformed: {err}"),
        })?;

    decode(&stored.api_key)
}

/// Location of the stored credentials file
pub fn credentials_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("packmind").join("credentials.json"))
}

/// Decode an API key into usable credentials
pub fn decode(api_key: &str) -> Result<ApiCredentials> {
    let decoded = decode_base64(api_key).ok_or_else(|| PackmindError::InvalidApiKey {
        reason: "the key is not valid base64".to_string(),
    })?;

    let document: KeyDocument =
        serde_json::from_slice(&decoded).map_err(|_| PackmindError::InvalidApiKey {
            reason: "the key does not decode to a host and token".to_string(),
        })?;

    let organization_id = organization_id_from_jwt(&document.jwt)?;

    Ok(ApiCredentials {
        host: document.host.trim_end_matches('/').to_string(),
        organization_id,
        api_key: api_key.to_string(),
    })
}

/// Extract the organization id from the JWT payload without verifying the
/// signature; the server re-validates every request
fn organization_id_from_jwt(jwt: &str) -> Result<String> {
    let payload_part = jwt
        .split('.')
        .nth(1)
        .ok_or_else(|| PackmindError::InvalidApiKey {
            reason: "the embedded token is not a JWT".to_string(),
        })?;

    let payload = decode_base64(payload_part).ok_or_else(|| PackmindError::InvalidApiKey {
        reason: "the JWT payload is not valid base64".to_string(),
    })?;

    let parsed: JwtPayload =
        serde_json::from_slice(&payload).map_err(|_| PackmindError::InvalidApiKey {
            reason: "the JWT payload carries no organization".to_string(),
        })?;

    Ok(parsed.organization.id)
}

/// Decode base64 in either standard or URL-safe alphabet, padded or not
fn decode_base64(input: &str) -> Option<Vec<u8>> {
    let trimmed = input.trim_end_matches('=');
    STANDARD
        .decode(input)
        .ok()
        .or_else(|| URL_SAFE_NO_PAD.decode(trimmed).ok())
}
