//! HTTP client for the verification server.
//!
//! One captured frame becomes one `POST` of `{"image": "<base64>"}` to the
//! configured endpoint. The client never retries and never returns an error
//! from [`Verifier::verify`]: every failure is classified into a
//! [`VerifyError`] and folded into a [`VerificationOutcome`] whose
//! `subject_label` says what went wrong.
//!
//! # Failure Classification
//!
//! | Condition | `transport_succeeded` | `subject_label` |
//! |-----------|-----------------------|-----------------|
//! | link down (no I/O attempted) | `false` | `No WiFi` |
//! | connect, timeout or body read failure | `false` | `Connection failed` |
//! | non-2xx status | `false` | `HTTP <code>` |
//! | 2xx, body not a JSON object | `false` | `Parse error` |
//! | 2xx, JSON object | `true` | `name` or `Unknown` |
//!
//! # Response Defaults
//!
//! Each field of a decoded object falls back to its own default when it is
//! absent or has the wrong type: `authorized = false`, `name = "Unknown"`,
//! `confidence = 0.0`.

#![allow(async_fn_in_trait)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use doorlock_core::constants::LABEL_UNKNOWN_SUBJECT;
use doorlock_core::{LinkState, ServerConfig, VerificationOutcome};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Something that turns an encoded frame into an access decision.
///
/// Implementations must not fail: every problem is reported through the
/// returned outcome. The caller passes the current link state so that no I/O
/// is attempted while the link is down.
pub trait Verifier {
    /// Verify one frame.
    async fn verify(&self, link: LinkState, image: &[u8]) -> VerificationOutcome;
}

/// Why a verification attempt produced no decision.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The link was down; no request was sent.
    #[error("Link not connected")]
    NoLink,

    /// The request could not be sent or the response could not be read.
    #[error("Connection failed: {0}")]
    Connection(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server returned HTTP {0}")]
    Status(u16),

    /// The server answered 2xx with a body of the wrong shape.
    #[error("Malformed response: {0}")]
    Parse(String),
}

impl VerifyError {
    /// The short diagnostic shown for this failure.
    pub fn reason(&self) -> String {
        self.to_outcome().subject_label
    }

    /// The failed outcome this error stands for.
    pub fn to_outcome(&self) -> VerificationOutcome {
        match self {
            Self::NoLink => VerificationOutcome::no_link(),
            Self::Connection(_) => VerificationOutcome::connection_failed(),
            Self::Status(code) => VerificationOutcome::http_status(*code),
            Self::Parse(_) => VerificationOutcome::parse_error(),
        }
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Base64 (standard alphabet, padded) of the JPEG bytes.
    pub image: String,
}

impl VerificationRequest {
    pub fn encode(image: &[u8]) -> Self {
        Self {
            image: STANDARD.encode(image),
        }
    }
}

/// Decoded response body with per-field defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResponse {
    pub authorized: bool,
    pub name: String,
    pub confidence: f64,
}

impl Default for VerificationResponse {
    fn default() -> Self {
        Self {
            authorized: false,
            name: LABEL_UNKNOWN_SUBJECT.to_string(),
            confidence: 0.0,
        }
    }
}

impl VerificationResponse {
    /// Decode a response body.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Parse`] if the body is not JSON or not a JSON
    /// object. Missing or mistyped fields are not errors.
    pub fn from_body(body: &str) -> Result<Self, VerifyError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| VerifyError::Parse(e.to_string()))?;

        match value {
            Value::Object(fields) => Ok(Self::merge(&fields)),
            other => Err(VerifyError::Parse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Take each field from `fields` when present with the right type,
    /// otherwise keep the default.
    fn merge(fields: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            authorized: fields
                .get("authorized")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.authorized),
            name: fields
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(defaults.name),
            confidence: fields
                .get("confidence")
                .and_then(Value::as_f64)
                .unwrap_or(defaults.confidence),
        }
    }

    pub fn into_outcome(self) -> VerificationOutcome {
        VerificationOutcome::decision(self.authorized, self.name, self.confidence as f32)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// HTTP client for the verification endpoint.
///
/// # Example
///
/// ```no_run
/// use doorlock_core::{LinkState, ServerConfig};
/// use doorlock_network::{VerificationClient, Verifier};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = VerificationClient::new(&ServerConfig::default())?;
/// let outcome = client.verify(LinkState::Connected, &[0xFF, 0xD8]).await;
///
/// if outcome.is_grant() {
///     println!("Welcome, {}", outcome.subject_label);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VerificationClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl VerificationClient {
    /// Build a client for the endpoint described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Connection`] if the HTTP client cannot be built.
    pub fn new(config: &ServerConfig) -> Result<Self, VerifyError> {
        Self::with_url(config.verify_url(), config.request_timeout())
    }

    /// Build a client for an explicit endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Connection`] if the HTTP client cannot be built.
    pub fn with_url(url: impl Into<String>, timeout: Duration) -> Result<Self, VerifyError> {
        let url = url.into();
        debug!("Creating verification client for {}", url);

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http, url, timeout })
    }

    /// Endpoint this client posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Bound on each request, connect through body.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one attempt, surfacing the failure class as an error.
    ///
    /// # Errors
    ///
    /// Returns the [`VerifyError`] describing why no decision was obtained.
    pub async fn try_verify(
        &self,
        link: LinkState,
        image: &[u8],
    ) -> Result<VerificationOutcome, VerifyError> {
        if !link.is_connected() {
            return Err(VerifyError::NoLink);
        }

        let request = VerificationRequest::encode(image);
        debug!(
            bytes = image.len(),
            encoded = request.image.len(),
            "Posting frame to {}",
            self.url
        );

        let response = self.http.post(&self.url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!(status = status.as_u16(), body = %body, "Verification response");

        Ok(VerificationResponse::from_body(&body)?.into_outcome())
    }
}

impl Verifier for VerificationClient {
    async fn verify(&self, link: LinkState, image: &[u8]) -> VerificationOutcome {
        match self.try_verify(link, image).await {
            Ok(outcome) => {
                info!(
                    authorized = outcome.authorized,
                    confidence = outcome.confidence,
                    "Server identified {}",
                    outcome.subject_label
                );
                outcome
            }
            Err(VerifyError::NoLink) => {
                warn!("Skipping verification: link not connected");
                VerifyError::NoLink.to_outcome()
            }
            Err(VerifyError::Connection(e)) if e.is_timeout() => {
                warn!("Verification timeout after {}ms", self.timeout.as_millis());
                VerificationOutcome::connection_failed()
            }
            Err(e) => {
                warn!("Verification failed: {}", e);
                e.to_outcome()
            }
        }
    }
}
