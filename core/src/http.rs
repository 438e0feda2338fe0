//! Neutral HTTP request and response values.
//!
//! # Design
//! These types describe a request and its response as plain data, independent
//! of any engine. The adapter reads an `HttpRequest` field by field and
//! forwards only the fields that are set; engines never see `HttpRequest`
//! directly.
//!
//! Optional fields are `Option` so that "never specified" stays distinct from
//! "specified as the default value".

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::Auth;
use crate::error::AdapterError;

/// Header name to value mapping. Ordering carries no meaning.
pub type Headers = BTreeMap<String, String>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by the caller and handed to `Adapter` by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    #[serde(deserialize_with = "non_empty_url")]
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    /// Written as a string in JSON when it is valid UTF-8, as a byte array otherwise.
    #[serde(default, with = "body_repr", skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<u8>>,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Connection establishment timeout, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_timeout: Option<u64>,
    /// Response read timeout, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<u64>,
    #[serde(default)]
    pub auth: Auth,
}

impl HttpRequest {
    /// Create a GET request for `url` with every optional field unset.
    ///
    /// Fails with `AdapterError::InvalidRequest` when `url` is empty.
    pub fn new(url: impl Into<String>) -> Result<Self, AdapterError> {
        let url = url.into();
        check_url(&url)?;
        Ok(Self {
            url,
            method: HttpMethod::Get,
            body: None,
            headers: Headers::new(),
            proxy: None,
            open_timeout: None,
            read_timeout: None,
            auth: Auth::None,
        })
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_open_timeout(mut self, secs: u64) -> Self {
        self.open_timeout = Some(secs);
        self
    }

    pub fn with_read_timeout(mut self, secs: u64) -> Self {
        self.read_timeout = Some(secs);
        self
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }
}

fn check_url(url: &str) -> Result<(), AdapterError> {
    if url.is_empty() {
        return Err(AdapterError::InvalidRequest("url must not be empty"));
    }
    Ok(())
}

fn non_empty_url<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let url = String::deserialize(deserializer)?;
    check_url(&url).map_err(serde::de::Error::custom)?;
    Ok(url)
}

mod body_repr {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Body {
        Text(String),
        Bytes(Vec<u8>),
    }

    pub fn serialize<S>(body: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match body.as_deref().map(std::str::from_utf8) {
            None => serializer.serialize_none(),
            Some(Ok(text)) => serializer.serialize_str(text),
            Some(Err(_)) => body.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Body>::deserialize(deserializer)?.map(|body| match body {
            Body::Text(text) => text.into_bytes(),
            Body::Bytes(bytes) => bytes,
        }))
    }
}

/// An HTTP response as read back from an engine.
///
/// `headers` is the raw header block exactly as the engine reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub code: u16,
    pub headers: String,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn body_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn is_error(&self) -> bool {
        self.code >= 400
    }
}
