//! Verification Authority
//!
//! The external oracle that corroborates risk reports. The registry only ever
//! asks it to open a verification request and keeps the returned handle; how
//! the authority resolves the request is its own business.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::VerificationConfig;
use crate::error::LedgerError;

#[derive(Error, Debug)]
pub enum AuthorityError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("authority returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait VerificationAuthority: Send + Sync {
    /// Open a verification request for `key`, returning the authority's request id.
    async fn request_verification(&self, key: &str) -> Result<String, AuthorityError>;

    fn describe(&self) -> String;
}

#[derive(Debug, Serialize)]
struct VerificationRequest<'a> {
    key: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerificationResponse {
    request_id: String,
}

/// Authority reached over HTTP at a single configured endpoint.
pub struct HttpVerificationAuthority {
    endpoint: String,
    http_client: Client,
}

impl HttpVerificationAuthority {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AuthorityError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn requests_url(&self) -> String {
        format!("{}/verification-requests", self.endpoint)
    }
}

#[async_trait]
impl VerificationAuthority for HttpVerificationAuthority {
    async fn request_verification(&self, key: &str) -> Result<String, AuthorityError> {
        debug!("Requesting verification of {} from {}", key, self.endpoint);

        let response = self
            .http_client
            .post(self.requests_url())
            .json(&VerificationRequest { key })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AuthorityError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: VerificationResponse = serde_json::from_str(&body)
            .map_err(|e| AuthorityError::Malformed(e.to_string()))?;
        if parsed.request_id.is_empty() {
            return Err(AuthorityError::Malformed("empty request_id".to_string()));
        }

        Ok(parsed.request_id)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

/// Local stand-in that accepts every request without a network call.
#[derive(Debug, Default)]
pub struct SimulatedAuthority;

#[async_trait]
impl VerificationAuthority for SimulatedAuthority {
    async fn request_verification(&self, _key: &str) -> Result<String, AuthorityError> {
        Ok(format!("sim-{}", Uuid::new_v4()))
    }

    fn describe(&self) -> String {
        "simulated".to_string()
    }
}

pub fn authority_from_config(
    config: &VerificationConfig,
) -> Result<Arc<dyn VerificationAuthority>, LedgerError> {
    if config.simulate {
        info!("Using simulated verification authority");
        return Ok(Arc::new(SimulatedAuthority));
    }

    let endpoint = config.endpoint.as_deref().ok_or_else(|| {
        LedgerError::ConfigError(
            "verification.endpoint is required unless verification.simulate is set".to_string(),
        )
    })?;

    let authority = HttpVerificationAuthority::new(endpoint, config.timeout())
        .map_err(|e| LedgerError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
    info!("Using verification authority at {}", endpoint);
    Ok(Arc::new(authority))
}
