//! Engine backed by the `ureq` blocking HTTP client.
//!
//! # Design
//! Setters only accumulate settings. The `ureq::Agent` is built when a verb is
//! performed, so a setting that was never called leaves the matching agent
//! option at ureq's own default. Status codes are returned as data
//! (`http_status_as_error(false)`); only transport failures become errors.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ureq::http::Response;
use ureq::tls::{self, Certificate, ClientCert, PemItem, PrivateKey, RootCerts, TlsConfig};
use ureq::{Agent, Body, Proxy, RequestBuilder};

use crate::auth::AuthType;
use crate::engine::Engine;
use crate::error::UreqEngineError;
use crate::http::{Headers, HttpMethod};

/// Engine that performs real HTTP calls through `ureq`.
#[derive(Debug, Default)]
pub struct UreqEngine {
    url: Option<String>,
    headers: Headers,
    verbose: bool,
    proxy: Option<Proxy>,
    connect_timeout: Option<u64>,
    timeout: Option<u64>,
    auth_type: Option<AuthType>,
    username: Option<String>,
    password: Option<String>,
    cert: Option<PathBuf>,
    cert_key: Option<PathBuf>,
    cacert: Option<PathBuf>,
    verify_peer: Option<bool>,
    code: u16,
    header_str: String,
    body: Vec<u8>,
}

impl UreqEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn agent(&self) -> Result<Agent, UreqEngineError> {
        let mut config = Agent::config_builder().http_status_as_error(false);
        if let Some(proxy) = &self.proxy {
            config = config.proxy(Some(proxy.clone()));
        }
        if let Some(secs) = self.timeout {
            config = config.timeout_global(Some(Duration::from_secs(secs)));
        }
        if let Some(secs) = self.connect_timeout {
            config = config.timeout_connect(Some(Duration::from_secs(secs)));
        }
        if let Some(tls_config) = self.tls_config()? {
            config = config.tls_config(tls_config);
        }
        Ok(config.build().new_agent())
    }

    fn tls_config(&self) -> Result<Option<TlsConfig>, UreqEngineError> {
        if self.cert.is_none() && self.cacert.is_none() && self.verify_peer.is_none() {
            return Ok(None);
        }
        let mut builder = TlsConfig::builder();
        if let Some(cert) = &self.cert {
            let chain = read_certificates(cert)?;
            let key_path = self.cert_key.as_deref().unwrap_or(cert);
            let key = read_private_key(key_path)?;
            builder = builder.client_cert(Some(ClientCert::new_with_certs(&chain, key)));
        }
        if let Some(cacert) = &self.cacert {
            let roots = read_certificates(cacert)?;
            builder = builder.root_certs(RootCerts::new_with_certs(&roots));
        }
        if self.verify_peer == Some(false) {
            builder = builder.disable_verification(true);
        }
        Ok(Some(builder.build()))
    }

    fn authorization(&self) -> Option<String> {
        match self.auth_type {
            Some(AuthType::Basic) => {
                let username = self.username.as_deref().unwrap_or_default();
                let password = self.password.as_deref().unwrap_or_default();
                let credentials = STANDARD.encode(format!("{username}:{password}"));
                Some(format!("Basic {credentials}"))
            }
            _ => None,
        }
    }

    fn prepare<B>(&self, mut builder: RequestBuilder<B>) -> RequestBuilder<B> {
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(authorization) = self.authorization() {
            builder = builder.header("Authorization", authorization);
        }
        builder
    }

    fn perform(&mut self, method: HttpMethod, body: Option<&[u8]>) -> Result<(), UreqEngineError> {
        let url = self.url.clone().ok_or(UreqEngineError::MissingUrl)?;
        let agent = self.agent()?;
        if self.verbose {
            tracing::debug!(method = method.as_str(), %url, "sending request");
        }

        let result = match method {
            HttpMethod::Get => self.prepare(agent.get(&url)).call(),
            HttpMethod::Head => self.prepare(agent.head(&url)).call(),
            HttpMethod::Delete => self.prepare(agent.delete(&url)).call(),
            HttpMethod::Post => self.prepare(agent.post(&url)).send(body.unwrap_or_default()),
            HttpMethod::Put => self.prepare(agent.put(&url)).send(body.unwrap_or_default()),
        };
        let mut response = result?;

        self.code = response.status().as_u16();
        self.header_str = render_header_block(&response);
        self.body = response.body_mut().read_to_vec()?;
        if self.verbose {
            tracing::debug!(code = self.code, bytes = self.body.len(), "received response");
        }
        Ok(())
    }
}

/// Render the status line and headers the way they arrived on the wire.
fn render_header_block(response: &Response<Body>) -> String {
    let mut block = format!("{:?} {}\r\n", response.version(), response.status());
    for (name, value) in response.headers() {
        block.push_str(name.as_str());
        block.push_str(": ");
        block.push_str(&String::from_utf8_lossy(value.as_bytes()));
        block.push_str("\r\n");
    }
    block.push_str("\r\n");
    block
}

fn read_pem(path: &Path) -> Result<Vec<u8>, UreqEngineError> {
    fs::read(path).map_err(|source| UreqEngineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_certificates(path: &Path) -> Result<Vec<Certificate<'static>>, UreqEngineError> {
    let pem = read_pem(path)?;
    let mut certs = Vec::new();
    for item in tls::parse_pem(&pem) {
        if let PemItem::Certificate(cert) = item? {
            certs.push(cert.to_owned());
        }
    }
    Ok(certs)
}

fn read_private_key(path: &Path) -> Result<PrivateKey<'static>, UreqEngineError> {
    let pem = read_pem(path)?;
    for item in tls::parse_pem(&pem) {
        if let PemItem::PrivateKey(key) = item? {
            return Ok(key.to_owned());
        }
    }
    Err(UreqEngineError::NoPrivateKey(path.to_path_buf()))
}

impl Engine for UreqEngine {
    type Error = UreqEngineError;

    fn set_url(&mut self, url: &str) -> Result<(), Self::Error> {
        self.url = Some(url.to_string());
        Ok(())
    }

    fn set_headers(&mut self, headers: &Headers) -> Result<(), Self::Error> {
        self.headers = headers.clone();
        Ok(())
    }

    fn set_verbose(&mut self, verbose: bool) -> Result<(), Self::Error> {
        self.verbose = verbose;
        Ok(())
    }

    fn set_proxy_url(&mut self, proxy: &str) -> Result<(), Self::Error> {
        self.proxy = Some(Proxy::new(proxy)?);
        Ok(())
    }

    fn set_connect_timeout(&mut self, secs: u64) -> Result<(), Self::Error> {
        self.connect_timeout = Some(secs);
        Ok(())
    }

    fn set_timeout(&mut self, secs: u64) -> Result<(), Self::Error> {
        self.timeout = Some(secs);
        Ok(())
    }

    fn set_http_auth_types(&mut self, auth_type: AuthType) -> Result<(), Self::Error> {
        match auth_type {
            AuthType::Basic => {
                self.auth_type = Some(auth_type);
                Ok(())
            }
            AuthType::Digest => Err(UreqEngineError::UnsupportedAuth(auth_type)),
        }
    }

    fn set_username(&mut self, username: &str) -> Result<(), Self::Error> {
        self.username = Some(username.to_string());
        Ok(())
    }

    fn set_password(&mut self, password: &str) -> Result<(), Self::Error> {
        self.password = Some(password.to_string());
        Ok(())
    }

    fn set_cert(&mut self, path: &str) -> Result<(), Self::Error> {
        self.cert = Some(PathBuf::from(path));
        Ok(())
    }

    fn set_cert_key(&mut self, path: &str) -> Result<(), Self::Error> {
        self.cert_key = Some(PathBuf::from(path));
        Ok(())
    }

    fn set_cacert(&mut self, path: &str) -> Result<(), Self::Error> {
        self.cacert = Some(PathBuf::from(path));
        Ok(())
    }

    fn set_ssl_verify_peer(&mut self, verify: bool) -> Result<(), Self::Error> {
        self.verify_peer = Some(verify);
        Ok(())
    }

    fn http_get(&mut self) -> Result<(), Self::Error> {
        self.perform(HttpMethod::Get, None)
    }

    fn http_post(&mut self, body: &[u8]) -> Result<(), Self::Error> {
        self.perform(HttpMethod::Post, Some(body))
    }

    fn http_put(&mut self, body: &[u8]) -> Result<(), Self::Error> {
        self.perform(HttpMethod::Put, Some(body))
    }

    fn http_delete(&mut self) -> Result<(), Self::Error> {
        self.perform(HttpMethod::Delete, None)
    }

    fn http_head(&mut self) -> Result<(), Self::Error> {
        self.perform(HttpMethod::Head, None)
    }

    fn response_code(&self) -> u16 {
        self.code
    }

    fn header_str(&self) -> &str {
        &self.header_str
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}
