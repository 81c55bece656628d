// crates/pid-sync-registrar/src/client.rs
// ============================================================================
// Module: Registrar REST Client
// Description: RegistrarProbe backed by `GET {api_url}/dois/{pid}`.
// Purpose: Map registrar JSON documents onto core registrar records.
// Dependencies: base64, pid-sync-core, reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! One endpoint answers all three probe questions:
//! - HTTP 404 means the registrar does not know the PID.
//! - `data.attributes.state`: `draft` is reserved; `registered` and
//!   `findable` are registered.
//! - `data.attributes.url` is the resolution target.
//! - `data.attributes.xml` is the base64-encoded metadata document.
//!
//! Requests use a bounded timeout, redirects are disabled, response bodies
//! are size limited, and cleartext HTTP is refused unless explicitly allowed.
//! A timeout surfaces as [`RegistrarError::Transport`], which the diagnostic
//! builder treats as a degraded probe.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pid_sync_core::Pid;
use pid_sync_core::PidStatus;
use pid_sync_core::RegistrarError;
use pid_sync_core::RegistrarProbe;
use pid_sync_core::RegistrarResolution;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use url::Url;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the registrar client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistrarClientConfig {
    /// Base URL of the registrar REST API.
    pub api_url: String,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
    /// Optional basic-auth user name.
    pub username: Option<String>,
    /// Optional basic-auth password.
    pub password: Option<String>,
}

impl Default for RegistrarClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.test.datacite.org".to_string(),
            allow_http: false,
            timeout_ms: 5_000,
            max_response_bytes: 4 * 1024 * 1024,
            user_agent: concat!("pid-sync/", env!("CARGO_PKG_VERSION")).to_string(),
            username: None,
            password: None,
        }
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Registrar JSON document envelope.
#[derive(Debug, Deserialize)]
struct DoiDocument {
    /// Document data section.
    data: DoiData,
}

/// Registrar JSON data section.
#[derive(Debug, Deserialize)]
struct DoiData {
    /// Identifier attributes.
    attributes: DoiAttributes,
}

/// Registrar identifier attributes used by the probe.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DoiAttributes {
    /// Lifecycle state label.
    state: Option<String>,
    /// Resolution target.
    url: Option<String>,
    /// Base64-encoded metadata document.
    xml: Option<String>,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Registrar probe over the REST JSON API.
pub struct RegistrarClient {
    /// Client configuration.
    config: RegistrarClientConfig,
    /// Validated API base URL.
    base_url: Url,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl RegistrarClient {
    /// Creates a registrar client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrarError::Invalid`] when the API URL is malformed or
    /// uses a refused scheme, or when the HTTP client cannot be created.
    pub fn new(config: RegistrarClientConfig) -> Result<Self, RegistrarError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|err| RegistrarError::Invalid(format!("invalid api url: {err}")))?;
        match base_url.scheme() {
            "https" => {}
            "http" if config.allow_http => {}
            other => {
                return Err(RegistrarError::Invalid(format!("unsupported url scheme: {other}")));
            }
        }
        if base_url.cannot_be_a_base() {
            return Err(RegistrarError::Invalid("api url cannot be a base".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|_| RegistrarError::Invalid("http client build failed".to_string()))?;
        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Returns the document URL for `pid`.
    fn document_url(&self, pid: &Pid) -> Result<Url, RegistrarError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RegistrarError::Invalid("api url cannot be a base".to_string()))?
            .pop_if_empty()
            .push("dois")
            .extend(pid.as_str().split('/'));
        Ok(url)
    }

    /// Fetches the registrar document for `pid`; `None` on HTTP 404.
    fn fetch_document(&self, pid: &Pid) -> Result<Option<DoiAttributes>, RegistrarError> {
        let url = self.document_url(pid)?;
        let mut request = self.client.get(url).header("accept", "application/vnd.api+json");
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_ref());
        }
        let mut response =
            request.send().map_err(|err| RegistrarError::Transport(describe_transport(&err)))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RegistrarError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unexpected status").to_string(),
            });
        }
        let body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        let document: DoiDocument = serde_json::from_slice(&body)
            .map_err(|err| RegistrarError::Invalid(format!("malformed registrar json: {err}")))?;
        Ok(Some(document.data.attributes))
    }
}

impl RegistrarProbe for RegistrarClient {
    fn exists(&self, pid: &Pid) -> Result<bool, RegistrarError> {
        Ok(self.fetch_document(pid)?.is_some())
    }

    fn fetch_metadata(&self, pid: &Pid) -> Result<Option<String>, RegistrarError> {
        let Some(attributes) = self.fetch_document(pid)? else {
            return Ok(None);
        };
        attributes.xml.as_deref().map(decode_metadata).transpose()
    }

    fn resolve_status(&self, pid: &Pid) -> Result<RegistrarResolution, RegistrarError> {
        let attributes =
            self.fetch_document(pid)?.ok_or_else(|| RegistrarError::NotFound(pid.to_string()))?;
        let state = attributes
            .state
            .as_deref()
            .ok_or_else(|| RegistrarError::Invalid("registrar state missing".to_string()))?;
        Ok(RegistrarResolution {
            status: map_state(state)?,
            target: attributes.url,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a registrar state label onto a PID status.
fn map_state(state: &str) -> Result<PidStatus, RegistrarError> {
    match state {
        "draft" => Ok(PidStatus::Reserved),
        "registered" | "findable" => Ok(PidStatus::Registered),
        other => Err(RegistrarError::Invalid(format!("unknown registrar state: {other}"))),
    }
}

/// Decodes a base64 metadata document into UTF-8 text.
fn decode_metadata(encoded: &str) -> Result<String, RegistrarError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|err| RegistrarError::Invalid(format!("metadata is not base64: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|_| RegistrarError::Invalid("metadata is not utf-8".to_string()))
}

/// Describes a transport failure without echoing credentials.
fn describe_transport(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "registrar request timed out".to_string()
    } else if err.is_connect() {
        "registrar connection failed".to_string()
    } else {
        "registrar request failed".to_string()
    }
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut reqwest::blocking::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, RegistrarError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| RegistrarError::Invalid("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(RegistrarError::Invalid("registrar response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    let limit = max_bytes_u64.saturating_add(1);
    let mut handle = response.take(limit);
    handle
        .read_to_end(&mut buf)
        .map_err(|_| RegistrarError::Transport("failed to read response".to_string()))?;
    if buf.len() > max_bytes {
        return Err(RegistrarError::Invalid("registrar response exceeds size limit".to_string()));
    }
    Ok(buf)
}
