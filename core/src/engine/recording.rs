//! A scripted engine that records every call made on it.
//!
//! # Design
//! Engines are created fresh per adapter call, so the recorded calls live in a
//! shared `CallLog` rather than in the engine. A factory closure clones the
//! log into every engine it hands out, and the caller inspects the log after
//! the adapter returns.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::auth::AuthType;
use crate::engine::Engine;
use crate::error::RecordedFailure;
use crate::http::Headers;

/// One call made on a `RecordingEngine`, with its argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetUrl(String),
    SetHeaders(Headers),
    SetVerbose(bool),
    SetProxyUrl(String),
    SetConnectTimeout(u64),
    SetTimeout(u64),
    SetHttpAuthTypes(AuthType),
    SetUsername(String),
    SetPassword(String),
    SetCert(String),
    SetCertKey(String),
    SetCacert(String),
    SetSslVerifyPeer(bool),
    HttpGet,
    HttpPost(Vec<u8>),
    HttpPut(Vec<u8>),
    HttpDelete,
    HttpHead,
}

impl Call {
    /// The engine method this call went through, e.g. `"set_proxy_url"`.
    pub fn name(&self) -> &'static str {
        match self {
            Call::SetUrl(_) => "set_url",
            Call::SetHeaders(_) => "set_headers",
            Call::SetVerbose(_) => "set_verbose",
            Call::SetProxyUrl(_) => "set_proxy_url",
            Call::SetConnectTimeout(_) => "set_connect_timeout",
            Call::SetTimeout(_) => "set_timeout",
            Call::SetHttpAuthTypes(_) => "set_http_auth_types",
            Call::SetUsername(_) => "set_username",
            Call::SetPassword(_) => "set_password",
            Call::SetCert(_) => "set_cert",
            Call::SetCertKey(_) => "set_cert_key",
            Call::SetCacert(_) => "set_cacert",
            Call::SetSslVerifyPeer(_) => "set_ssl_verify_peer",
            Call::HttpGet => "http_get",
            Call::HttpPost(_) => "http_post",
            Call::HttpPut(_) => "http_put",
            Call::HttpDelete => "http_delete",
            Call::HttpHead => "http_head",
        }
    }
}

/// Calls shared between a test and every engine a factory hands out.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Call>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, call: Call) {
        self.lock().push(call);
    }

    /// Snapshot of every call recorded so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().clone()
    }

    /// Number of recorded calls that went through the engine method `name`.
    pub fn count(&self, name: &str) -> usize {
        self.lock().iter().filter(|call| call.name() == name).count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Engine that returns a canned response and records what it was told.
#[derive(Debug, Clone)]
pub struct RecordingEngine {
    log: CallLog,
    code: u16,
    header_str: String,
    body: Vec<u8>,
    failure: Option<(&'static str, String)>,
    performed: bool,
}

impl RecordingEngine {
    /// An engine that answers every verb with `200`, no headers and no body.
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            code: 200,
            header_str: String::new(),
            body: Vec::new(),
            failure: None,
            performed: false,
        }
    }

    pub fn with_response(
        mut self,
        code: u16,
        header_str: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.code = code;
        self.header_str = header_str.into();
        self.body = body.into();
        self
    }

    /// Fail with `message` when the engine method `name` is called.
    ///
    /// The failing call is still recorded.
    pub fn failing_at(mut self, name: &'static str, message: impl Into<String>) -> Self {
        self.failure = Some((name, message.into()));
        self
    }

    fn record(&mut self, call: Call) -> Result<(), RecordedFailure> {
        let name = call.name();
        self.log.push(call);
        match &self.failure {
            Some((failing, message)) if *failing == name => Err(RecordedFailure(message.clone())),
            _ => Ok(()),
        }
    }

    fn perform(&mut self, call: Call) -> Result<(), RecordedFailure> {
        self.record(call)?;
        self.performed = true;
        Ok(())
    }
}

impl Engine for RecordingEngine {
    type Error = RecordedFailure;

    fn set_url(&mut self, url: &str) -> Result<(), Self::Error> {
        self.record(Call::SetUrl(url.to_string()))
    }

    fn set_headers(&mut self, headers: &Headers) -> Result<(), Self::Error> {
        self.record(Call::SetHeaders(headers.clone()))
    }

    fn set_verbose(&mut self, verbose: bool) -> Result<(), Self::Error> {
        self.record(Call::SetVerbose(verbose))
    }

    fn set_proxy_url(&mut self, proxy: &str) -> Result<(), Self::Error> {
        self.record(Call::SetProxyUrl(proxy.to_string()))
    }

    fn set_connect_timeout(&mut self, secs: u64) -> Result<(), Self::Error> {
        self.record(Call::SetConnectTimeout(secs))
    }

    fn set_timeout(&mut self, secs: u64) -> Result<(), Self::Error> {
        self.record(Call::SetTimeout(secs))
    }

    fn set_http_auth_types(&mut self, auth_type: AuthType) -> Result<(), Self::Error> {
        self.record(Call::SetHttpAuthTypes(auth_type))
    }

    fn set_username(&mut self, username: &str) -> Result<(), Self::Error> {
        self.record(Call::SetUsername(username.to_string()))
    }

    fn set_password(&mut self, password: &str) -> Result<(), Self::Error> {
        self.record(Call::SetPassword(password.to_string()))
    }

    fn set_cert(&mut self, path: &str) -> Result<(), Self::Error> {
        self.record(Call::SetCert(path.to_string()))
    }

    fn set_cert_key(&mut self, path: &str) -> Result<(), Self::Error> {
        self.record(Call::SetCertKey(path.to_string()))
    }

    fn set_cacert(&mut self, path: &str) -> Result<(), Self::Error> {
        self.record(Call::SetCacert(path.to_string()))
    }

    fn set_ssl_verify_peer(&mut self, verify: bool) -> Result<(), Self::Error> {
        self.record(Call::SetSslVerifyPeer(verify))
    }

    fn http_get(&mut self) -> Result<(), Self::Error> {
        self.perform(Call::HttpGet)
    }

    fn http_post(&mut self, body: &[u8]) -> Result<(), Self::Error> {
        self.perform(Call::HttpPost(body.to_vec()))
    }

    fn http_put(&mut self, body: &[u8]) -> Result<(), Self::Error> {
        self.perform(Call::HttpPut(body.to_vec()))
    }

    fn http_delete(&mut self) -> Result<(), Self::Error> {
        self.perform(Call::HttpDelete)
    }

    fn http_head(&mut self) -> Result<(), Self::Error> {
        self.perform(Call::HttpHead)
    }

    fn response_code(&self) -> u16 {
        if self.performed {
            self.code
        } else {
            0
        }
    }

    fn header_str(&self) -> &str {
        if self.performed {
            &self.header_str
        } else {
            ""
        }
    }

    fn body(&self) -> &[u8] {
        if self.performed {
            &self.body
        } else {
            &[]
        }
    }
}
