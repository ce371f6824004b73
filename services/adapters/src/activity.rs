//! Activity-flag endpoint client
//!
//! `POST {base}/{pool_id}` marks a pool active once its rewards cross the
//! configured threshold. A 409 means the precondition no longer holds and is
//! reported as a normal outcome, not an error.

use crate::error::ActivityError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationResponse {
    /// 2xx with the server's message
    Activated { message: String },
    /// 409: already active or a concurrent update won
    Conflict { message: String },
}

#[async_trait]
pub trait ActivityEndpoint: Send + Sync {
    async fn mark_active(&self, pool_id: &str) -> Result<ActivationResponse, ActivityError>;
}

/// Map an HTTP status and body onto the endpoint's contract
pub fn classify_response(status: u16, body: String) -> Result<ActivationResponse, ActivityError> {
    match status {
        200..=299 => Ok(ActivationResponse::Activated { message: body }),
        409 => Ok(ActivationResponse::Conflict { message: body }),
        _ => Err(ActivityError::Status { status, body }),
    }
}

pub struct HttpActivityClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpActivityClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ActivityError> {
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| ActivityError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl ActivityEndpoint for HttpActivityClient {
    async fn mark_active(&self, pool_id: &str) -> Result<ActivationResponse, ActivityError> {
        let url = self
            .base_url
            .join(pool_id)
            .map_err(|e| ActivityError::InvalidUrl {
                url: pool_id.to_string(),
                reason: e.to_string(),
            })?;

        let response = self.http.post(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        debug!("Activity endpoint answered {} for pool {}", status, pool_id);

        classify_response(status, body)
    }
}
