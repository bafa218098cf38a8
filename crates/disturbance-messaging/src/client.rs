//! Async HTTP client wrapping the messaging service's batch endpoint.

use std::time::Duration;

use disturbance_core::transport::{MessageTransport, OutboundMessage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Connection settings for the messaging service.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
  pub base_url: String,
  /// Bearer token; omitted requests go out unauthenticated.
  #[serde(default)]
  pub token:    Option<String>,
}

/// The batch request body: `POST {base_url}/messages`.
#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
  messages: &'a [OutboundMessage],
}

/// Async HTTP client for the messaging service.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct MessagingClient {
  client: Client,
  config: MessagingConfig,
}

impl MessagingClient {
  pub fn new(config: MessagingConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!("{}/messages", self.config.base_url.trim_end_matches('/'))
  }
}

impl MessageTransport for MessagingClient {
  type Error = Error;

  /// `POST /messages` with the whole batch; no retries, no partial
  /// delivery.
  async fn send(&self, messages: &[OutboundMessage]) -> Result<()> {
    debug!(count = messages.len(), url = %self.url(), "posting message batch");

    let mut req = self
      .client
      .post(self.url())
      .json(&MessageRequest { messages });
    if let Some(token) = &self.config.token {
      req = req.bearer_auth(token);
    }

    let resp = req.send().await?;
    if !resp.status().is_success() {
      return Err(Error::Status(resp.status()));
    }
    Ok(())
  }
}
