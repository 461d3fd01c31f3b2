//! Service-account credential loading.
//!
//! # Security
//! - The private key is held as a `SecretString` and never logged
//! - Error messages name the file and the bad field, never field contents

use std::fs;
use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::database::types::ClientError;

/// Token endpoint used when the key file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// On-disk layout of a service-account key file. Unknown fields are ignored.
#[derive(Deserialize)]
struct KeyFile {
    #[serde(rename = "type")]
    key_type: Option<String>,
    project_id: Option<String>,
    private_key_id: Option<String>,
    private_key: Option<String>,
    client_email: Option<String>,
    client_id: Option<String>,
    token_uri: Option<String>,
}

/// A parsed service-account key.
#[derive(Debug)]
pub struct ServiceAccountKey {
    project_id: String,
    private_key_id: String,
    private_key: SecretString,
    client_email: String,
    client_id: Option<String>,
    token_uri: String,
}

impl ServiceAccountKey {
    /// Read and parse a key file.
    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        let content = fs::read_to_string(path).map_err(|e| malformed(path, e.to_string()))?;
        Self::from_json(&content).map_err(|reason| malformed(path, reason))
    }

    /// Parse key JSON. The error is a human-readable reason.
    pub fn from_json(content: &str) -> Result<Self, String> {
        let raw: KeyFile =
            serde_json::from_str(content).map_err(|e| format!("invalid JSON: {}", e))?;

        let key_type = required(raw.key_type, "type")?;
        if key_type != SERVICE_ACCOUNT_TYPE {
            return Err(format!(
                "expected type \"{}\", found \"{}\"",
                SERVICE_ACCOUNT_TYPE, key_type
            ));
        }

        let private_key = required(raw.private_key, "private_key")?;
        if !private_key.trim_start().starts_with("-----BEGIN") {
            return Err("private_key is not a PEM block".to_string());
        }

        Ok(Self {
            project_id: required(raw.project_id, "project_id")?,
            private_key_id: required(raw.private_key_id, "private_key_id")?,
            private_key: SecretString::from(private_key),
            client_email: required(raw.client_email, "client_email")?,
            client_id: raw.client_id.filter(|id| !id.trim().is_empty()),
            token_uri: raw
                .token_uri
                .filter(|uri| !uri.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn private_key_id(&self) -> &str {
        &self.private_key_id
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    /// The PEM private key. Only hand this to the SDK.
    pub fn expose_private_key(&self) -> &str {
        self.private_key.expose_secret()
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(format!("missing field \"{}\"", field)),
    }
}

fn malformed(path: &Path, reason: String) -> ClientError {
    ClientError::MalformedCredentials {
        path: path.to_path_buf(),
        reason,
    }
}
