//! Authentication descriptors carried by a request.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Credentials attached to a request.
///
/// In JSON the variant is selected by a `"type"` tag, e.g.
/// `{"type": "basic", "username": "u", "password": "p"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Auth {
    #[default]
    None,
    Basic { username: String, password: String },
    Digest { username: String, password: String },
    Ssl(SslAuth),
}

impl Auth {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn digest(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth::Digest {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Client certificate authentication (mutual TLS).
///
/// All paths point at PEM files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SslAuth {
    pub cert_file: String,
    pub cert_key_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert_file: Option<String>,
}

impl SslAuth {
    pub fn new(cert_file: impl Into<String>, cert_key_file: impl Into<String>) -> Self {
        Self {
            cert_file: cert_file.into(),
            cert_key_file: cert_key_file.into(),
            ca_cert_file: None,
        }
    }

    pub fn with_ca_cert_file(mut self, path: impl Into<String>) -> Self {
        self.ca_cert_file = Some(path.into());
        self
    }
}

/// Username/password scheme handed to an engine's auth-type setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Basic,
    Digest,
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthType::Basic => write!(f, "basic"),
            AuthType::Digest => write!(f, "digest"),
        }
    }
}
