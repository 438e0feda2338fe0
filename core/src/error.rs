//! Error types for the adapter and its engines.
//!
//! # Design
//! The adapter does not interpret engine failures. Whatever an engine returns
//! from a setter or a verb is boxed into `AdapterError::Transport` and handed
//! back to the caller unchanged, so callers can still downcast to the engine's
//! own error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::auth::AuthType;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `Adapter` operations and `HttpRequest::new`.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The engine failed while being configured or while performing the call.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The request value itself could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),
}

impl AdapterError {
    pub(crate) fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AdapterError::Transport(Box::new(err))
    }

    /// The engine error behind a `Transport` failure, if it is of type `E`.
    pub fn transport_source<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            AdapterError::Transport(source) => source.downcast_ref::<E>(),
            AdapterError::InvalidRequest(_) => None,
        }
    }
}

/// Errors raised by `UreqEngine`.
#[derive(Debug, Error)]
pub enum UreqEngineError {
    #[error(transparent)]
    Ureq(#[from] ureq::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} authentication is not supported by ureq")]
    UnsupportedAuth(AuthType),

    #[error("no private key found in {}", .0.display())]
    NoPrivateKey(PathBuf),

    #[error("no url set before performing the request")]
    MissingUrl,
}

/// Failure scripted into a `RecordingEngine`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RecordedFailure(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_keeps_the_engine_error() {
        let err = AdapterError::transport(RecordedFailure("connection refused".to_string()));
        assert_eq!(err.to_string(), "transport error: connection refused");
        let source = err.transport_source::<RecordedFailure>().unwrap();
        assert_eq!(source.0, "connection refused");
    }

    #[test]
    fn unsupported_auth_names_the_scheme() {
        let err = UreqEngineError::UnsupportedAuth(AuthType::Digest);
        assert_eq!(err.to_string(), "digest authentication is not supported by ureq");
    }
}
