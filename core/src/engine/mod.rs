//! The capability interface an HTTP engine exposes to the adapter.
//!
//! An engine is configured through individual setters, performs one verb, and
//! then reports the status code, the raw header block and the body. The
//! adapter only ever calls the optional setters for fields the caller set, so
//! an engine may treat "setter called" and "setter never called" differently.

pub mod recording;
pub mod ureq_engine;

use crate::auth::AuthType;
use crate::http::Headers;

pub use self::recording::{Call, CallLog, RecordingEngine};
pub use self::ureq_engine::UreqEngine;

/// A configurable, single-use HTTP engine.
pub trait Engine {
    /// The error type returned by the engine for a failed setting or call.
    type Error: std::error::Error + Send + Sync + 'static;

    fn set_url(&mut self, url: &str) -> Result<(), Self::Error>;

    fn set_headers(&mut self, headers: &Headers) -> Result<(), Self::Error>;

    /// Enables or disables diagnostic output.
    fn set_verbose(&mut self, verbose: bool) -> Result<(), Self::Error>;

    fn set_proxy_url(&mut self, proxy: &str) -> Result<(), Self::Error>;

    /// Connection establishment timeout, in seconds.
    fn set_connect_timeout(&mut self, secs: u64) -> Result<(), Self::Error>;

    /// Overall request timeout, in seconds.
    fn set_timeout(&mut self, secs: u64) -> Result<(), Self::Error>;

    fn set_http_auth_types(&mut self, auth_type: AuthType) -> Result<(), Self::Error>;

    fn set_username(&mut self, username: &str) -> Result<(), Self::Error>;

    fn set_password(&mut self, password: &str) -> Result<(), Self::Error>;

    /// Path to the client certificate (PEM).
    fn set_cert(&mut self, path: &str) -> Result<(), Self::Error>;

    /// Path to the client certificate's private key (PEM).
    fn set_cert_key(&mut self, path: &str) -> Result<(), Self::Error>;

    /// Path to a CA bundle (PEM) used to verify the server.
    fn set_cacert(&mut self, path: &str) -> Result<(), Self::Error>;

    fn set_ssl_verify_peer(&mut self, verify: bool) -> Result<(), Self::Error>;

    fn http_get(&mut self) -> Result<(), Self::Error>;

    fn http_post(&mut self, body: &[u8]) -> Result<(), Self::Error>;

    fn http_put(&mut self, body: &[u8]) -> Result<(), Self::Error>;

    fn http_delete(&mut self) -> Result<(), Self::Error>;

    fn http_head(&mut self) -> Result<(), Self::Error>;

    /// Status code of the last performed call.
    fn response_code(&self) -> u16;

    /// Raw response header block of the last performed call.
    fn header_str(&self) -> &str;

    /// Raw response body of the last performed call.
    fn body(&self) -> &[u8];
}

/// Hands out a fresh engine for each adapter call.
pub trait EngineFactory {
    type Engine: Engine;

    fn engine(&self) -> Self::Engine;
}

impl<F, E> EngineFactory for F
where
    F: Fn() -> E,
    E: Engine,
{
    type Engine = E;

    fn engine(&self) -> E {
        self()
    }
}
