//! Request adapter over pluggable HTTP engines.
//!
//! # Overview
//! Takes a neutral `HttpRequest`, configures an `Engine` with the equivalent
//! settings, performs the verb and normalizes the result into an
//! `HttpResponse`. The adapter itself never touches the network; engines do.
//!
//! # Design
//! - `Adapter` is stateless. It holds an `EngineFactory` and uses a fresh
//!   engine per call.
//! - Unset optional request fields are never forwarded to the engine.
//! - `UreqEngine` performs real calls; `RecordingEngine` records what the
//!   adapter told it and answers with a canned response.
//! - Engine failures come back as `AdapterError::Transport`, unchanged.

pub mod adapter;
pub mod auth;
pub mod engine;
pub mod error;
pub mod http;

pub use adapter::Adapter;
pub use auth::{Auth, AuthType, SslAuth};
pub use engine::{Call, CallLog, Engine, EngineFactory, RecordingEngine, UreqEngine};
pub use error::{AdapterError, BoxError, RecordedFailure, UreqEngineError};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse};
