//! Maps an `HttpRequest` onto an `Engine` and reads the result back.
//!
//! # Design
//! `Adapter` holds only an engine factory and carries no state between calls.
//! Every operation takes a fresh engine, configures it from the request,
//! performs exactly one verb and builds a new `HttpResponse` from what the
//! engine reports. Optional request fields that are unset are skipped
//! entirely, never forwarded as a default.

use crate::auth::{Auth, AuthType};
use crate::engine::{Engine, EngineFactory, UreqEngine};
use crate::error::AdapterError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Synchronous request adapter over an engine factory.
#[derive(Debug, Clone)]
pub struct Adapter<F> {
    factory: F,
}

impl Adapter<fn() -> UreqEngine> {
    /// An adapter performing real HTTP calls through `UreqEngine`.
    pub fn ureq() -> Self {
        Self::new(UreqEngine::new as fn() -> UreqEngine)
    }
}

impl<F: EngineFactory> Adapter<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    pub fn get(&self, request: &HttpRequest) -> Result<HttpResponse, AdapterError> {
        self.perform(HttpMethod::Get, request)
    }

    pub fn post(&self, request: &HttpRequest) -> Result<HttpResponse, AdapterError> {
        self.perform(HttpMethod::Post, request)
    }

    pub fn put(&self, request: &HttpRequest) -> Result<HttpResponse, AdapterError> {
        self.perform(HttpMethod::Put, request)
    }

    pub fn delete(&self, request: &HttpRequest) -> Result<HttpResponse, AdapterError> {
        self.perform(HttpMethod::Delete, request)
    }

    pub fn head(&self, request: &HttpRequest) -> Result<HttpResponse, AdapterError> {
        self.perform(HttpMethod::Head, request)
    }

    /// Perform `request` with the verb named by `request.method`.
    pub fn request(&self, request: &HttpRequest) -> Result<HttpResponse, AdapterError> {
        self.perform(request.method, request)
    }

    fn perform(
        &self,
        method: HttpMethod,
        request: &HttpRequest,
    ) -> Result<HttpResponse, AdapterError> {
        tracing::debug!(method = method.as_str(), url = %request.url, "performing request");

        let mut engine = self.factory.engine();
        configure(&mut engine, request).map_err(AdapterError::transport)?;
        invoke(&mut engine, method, request).map_err(AdapterError::transport)?;

        let response = HttpResponse {
            code: engine.response_code(),
            headers: engine.header_str().to_string(),
            body: engine.body().to_vec(),
        };
        tracing::debug!(code = response.code, "request completed");
        Ok(response)
    }
}

fn configure<E: Engine>(engine: &mut E, request: &HttpRequest) -> Result<(), E::Error> {
    engine.set_url(&request.url)?;
    engine.set_headers(&request.headers)?;
    engine.set_verbose(false)?;

    if let Some(proxy) = &request.proxy {
        tracing::trace!(%proxy, "setting proxy");
        engine.set_proxy_url(proxy)?;
    }
    if let Some(secs) = request.open_timeout {
        tracing::trace!(secs, "setting connect timeout");
        engine.set_connect_timeout(secs)?;
    }
    if let Some(secs) = request.read_timeout {
        tracing::trace!(secs, "setting read timeout");
        engine.set_timeout(secs)?;
    }

    match &request.auth {
        Auth::None => {}
        Auth::Basic { username, password } => {
            set_credentials(engine, AuthType::Basic, username, password)?;
        }
        Auth::Digest { username, password } => {
            set_credentials(engine, AuthType::Digest, username, password)?;
        }
        Auth::Ssl(ssl) => {
            tracing::trace!(cert = %ssl.cert_file, "setting client certificate");
            engine.set_cert_key(&ssl.cert_key_file)?;
            engine.set_cert(&ssl.cert_file)?;
            // Client certificates always come with server verification.
            engine.set_ssl_verify_peer(true)?;
            if let Some(ca_cert) = &ssl.ca_cert_file {
                engine.set_cacert(ca_cert)?;
            }
        }
    }
    Ok(())
}

fn set_credentials<E: Engine>(
    engine: &mut E,
    auth_type: AuthType,
    username: &str,
    password: &str,
) -> Result<(), E::Error> {
    tracing::trace!(%auth_type, "setting credentials");
    engine.set_http_auth_types(auth_type)?;
    engine.set_username(username)?;
    engine.set_password(password)
}

fn invoke<E: Engine>(
    engine: &mut E,
    method: HttpMethod,
    request: &HttpRequest,
) -> Result<(), E::Error> {
    let body = request.body.as_deref().unwrap_or_default();
    match method {
        HttpMethod::Get => engine.http_get(),
        HttpMethod::Post => engine.http_post(body),
        HttpMethod::Put => engine.http_put(body),
        HttpMethod::Delete => engine.http_delete(),
        HttpMethod::Head => engine.http_head(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SslAuth;
    use crate::engine::{Call, CallLog, RecordingEngine};
    use crate::error::RecordedFailure;
    use crate::http::Headers;

    const XML: &str = r#"<?xml version="1.0"?><root><ok>true</ok></root>"#;

    fn basic_request() -> HttpRequest {
        HttpRequest::new("http://example.com").unwrap()
    }

    fn adapter(log: &CallLog) -> Adapter<impl Fn() -> RecordingEngine> {
        let log = log.clone();
        Adapter::new(move || RecordingEngine::new(log.clone()).with_response(200, "", XML))
    }

    fn calls_for(request: &HttpRequest) -> Vec<Call> {
        let log = CallLog::new();
        adapter(&log).get(request).unwrap();
        log.calls()
    }

    // --- verbs ---

    #[test]
    fn get_returns_engine_response() {
        let log = CallLog::new();
        let response = adapter(&log).get(&basic_request()).unwrap();
        assert_eq!(response.code, 200);
        assert_eq!(response.headers, "");
        assert_eq!(response.body_str(), XML);
        assert_eq!(log.count("http_get"), 1);
    }

    #[test]
    fn post_returns_engine_response() {
        let log = CallLog::new();
        let response = adapter(&log).post(&basic_request()).unwrap();
        assert_eq!(response.body_str(), XML);
        assert_eq!(log.count("http_post"), 1);
    }

    #[test]
    fn post_sends_the_request_body() {
        let log = CallLog::new();
        let request = basic_request().with_body("xml=hi&name=123");
        adapter(&log).post(&request).unwrap();
        assert!(log.calls().contains(&Call::HttpPost(b"xml=hi&name=123".to_vec())));
    }

    #[test]
    fn put_sends_the_request_body() {
        let log = CallLog::new();
        let request = basic_request().with_body("xml=hi&name=123");
        let response = adapter(&log).put(&request).unwrap();
        assert_eq!(response.body_str(), XML);
        assert!(log.calls().contains(&Call::HttpPut(b"xml=hi&name=123".to_vec())));
    }

    #[test]
    fn head_returns_engine_response() {
        let log = CallLog::new();
        let response = adapter(&log).head(&basic_request()).unwrap();
        assert_eq!(response.code, 200);
        assert_eq!(log.count("http_head"), 1);
    }

    #[test]
    fn delete_returns_engine_response() {
        let log = CallLog::new();
        let adapter = Adapter::new({
            let log = log.clone();
            move || RecordingEngine::new(log.clone()).with_response(200, "", "")
        });
        let response = adapter.delete(&basic_request()).unwrap();
        assert_eq!(response.code, 200);
        assert!(response.body.is_empty());
        assert_eq!(log.count("http_delete"), 1);
    }

    #[test]
    fn raw_headers_are_passed_through() {
        let log = CallLog::new();
        let raw = "HTTP/1.1 201 Created\r\nContent-Type: text/xml\r\n\r\n";
        let adapter = Adapter::new({
            let log = log.clone();
            move || RecordingEngine::new(log.clone()).with_response(201, raw, XML)
        });
        let response = adapter.put(&basic_request()).unwrap();
        assert_eq!(response.code, 201);
        assert_eq!(response.headers, raw);
    }

    #[test]
    fn request_dispatches_on_method() {
        let log = CallLog::new();
        let request = basic_request().with_method(HttpMethod::Put).with_body("a=b");
        adapter(&log).request(&request).unwrap();
        assert_eq!(log.calls().last(), Some(&Call::HttpPut(b"a=b".to_vec())));
    }

    #[test]
    fn verbs_without_payload_ignore_the_body() {
        let log = CallLog::new();
        let request = basic_request().with_body("ignored");
        adapter(&log).delete(&request).unwrap();
        assert_eq!(log.calls().last(), Some(&Call::HttpDelete));
    }

    #[test]
    fn repeated_calls_are_independent() {
        let log = CallLog::new();
        let adapter = adapter(&log);
        let request = basic_request().with_proxy("http://proxy.example.com");
        let first = adapter.get(&request).unwrap();
        let first_calls = log.calls();
        log.clear();
        let second = adapter.get(&request).unwrap();
        assert_eq!(first, second);
        assert_eq!(first_calls, log.calls());
    }

    // --- settings ---

    #[test]
    fn url_is_always_set() {
        let calls = calls_for(&basic_request());
        assert_eq!(calls[0], Call::SetUrl("http://example.com".to_string()));
    }

    #[test]
    fn proxy_is_not_set_if_not_specified() {
        let calls = calls_for(&basic_request());
        assert!(!calls.iter().any(|call| matches!(call, Call::SetProxyUrl(_))));
    }

    #[test]
    fn proxy_is_set_if_specified() {
        let calls = calls_for(&basic_request().with_proxy("http://proxy.example.com"));
        assert!(calls.contains(&Call::SetProxyUrl("http://proxy.example.com".to_string())));
    }

    #[test]
    fn timeout_is_not_set_if_not_specified() {
        let calls = calls_for(&basic_request());
        assert!(!calls.iter().any(|call| matches!(call, Call::SetTimeout(_))));
    }

    #[test]
    fn timeout_is_set_from_read_timeout() {
        let calls = calls_for(&basic_request().with_read_timeout(30));
        assert!(calls.contains(&Call::SetTimeout(30)));
        assert!(!calls.iter().any(|call| matches!(call, Call::SetConnectTimeout(_))));
    }

    #[test]
    fn connect_timeout_is_not_set_if_not_specified() {
        let calls = calls_for(&basic_request());
        assert!(!calls.iter().any(|call| matches!(call, Call::SetConnectTimeout(_))));
    }

    #[test]
    fn connect_timeout_is_set_from_open_timeout() {
        let calls = calls_for(&basic_request().with_open_timeout(30));
        assert!(calls.contains(&Call::SetConnectTimeout(30)));
        assert!(!calls.iter().any(|call| matches!(call, Call::SetTimeout(_))));
    }

    #[test]
    fn headers_are_always_set_once() {
        let log = CallLog::new();
        adapter(&log).get(&basic_request()).unwrap();
        assert_eq!(log.count("set_headers"), 1);
        assert!(log.calls().contains(&Call::SetHeaders(Headers::new())));
    }

    #[test]
    fn headers_are_forwarded() {
        let calls = calls_for(&basic_request().with_header("SOAPAction", "urn:find"));
        let mut expected = Headers::new();
        expected.insert("SOAPAction".to_string(), "urn:find".to_string());
        assert!(calls.contains(&Call::SetHeaders(expected)));
    }

    #[test]
    fn verbose_is_always_disabled() {
        let calls = calls_for(&basic_request());
        assert!(calls.contains(&Call::SetVerbose(false)));
        assert!(!calls.contains(&Call::SetVerbose(true)));
    }

    #[test]
    fn no_auth_makes_no_auth_calls() {
        let calls = calls_for(&basic_request());
        assert_eq!(
            calls,
            vec![
                Call::SetUrl("http://example.com".to_string()),
                Call::SetHeaders(Headers::new()),
                Call::SetVerbose(false),
                Call::HttpGet,
            ]
        );
    }

    #[test]
    fn basic_auth_sets_type_and_credentials() {
        let calls = calls_for(&basic_request().with_auth(Auth::basic("username", "password")));
        assert!(calls.contains(&Call::SetHttpAuthTypes(AuthType::Basic)));
        assert!(calls.contains(&Call::SetUsername("username".to_string())));
        assert!(calls.contains(&Call::SetPassword("password".to_string())));
    }

    #[test]
    fn digest_auth_sets_type_and_credentials() {
        let calls = calls_for(&basic_request().with_auth(Auth::digest("username", "password")));
        assert!(calls.contains(&Call::SetHttpAuthTypes(AuthType::Digest)));
        assert!(calls.contains(&Call::SetUsername("username".to_string())));
        assert!(calls.contains(&Call::SetPassword("password".to_string())));
    }

    #[test]
    fn ssl_auth_sets_cert_key_cert_and_verify_peer() {
        let ssl = SslAuth::new("fixtures/client_cert.pem", "fixtures/client_key.pem");
        let calls = calls_for(&basic_request().with_auth(Auth::Ssl(ssl)));
        assert!(calls.contains(&Call::SetCertKey("fixtures/client_key.pem".to_string())));
        assert!(calls.contains(&Call::SetCert("fixtures/client_cert.pem".to_string())));
        assert!(calls.contains(&Call::SetSslVerifyPeer(true)));
        assert!(!calls.iter().any(|call| matches!(call, Call::SetCacert(_))));
    }

    #[test]
    fn ssl_auth_sets_cacert_if_specified() {
        let ssl = SslAuth::new("fixtures/client_cert.pem", "fixtures/client_key.pem")
            .with_ca_cert_file("fixtures/ca_cert.pem");
        let calls = calls_for(&basic_request().with_auth(Auth::Ssl(ssl)));
        assert!(calls.contains(&Call::SetCacert("fixtures/ca_cert.pem".to_string())));
    }

    // --- errors ---

    #[test]
    fn engine_failure_during_call_is_a_transport_error() {
        let log = CallLog::new();
        let adapter = Adapter::new({
            let log = log.clone();
            move || RecordingEngine::new(log.clone()).failing_at("http_get", "connection refused")
        });
        let err = adapter.get(&basic_request()).unwrap_err();
        assert!(matches!(err, AdapterError::Transport(_)));
        assert_eq!(
            err.transport_source::<RecordedFailure>(),
            Some(&RecordedFailure("connection refused".to_string()))
        );
    }

    #[test]
    fn engine_failure_during_configuration_stops_the_call() {
        let log = CallLog::new();
        let adapter = Adapter::new({
            let log = log.clone();
            move || RecordingEngine::new(log.clone()).failing_at("set_proxy_url", "bad proxy")
        });
        let request = basic_request().with_proxy("::not-a-proxy::");
        let err = adapter.get(&request).unwrap_err();
        assert_eq!(err.to_string(), "transport error: bad proxy");
        assert_eq!(log.count("http_get"), 0);
    }
}
