//! The `MessageTransport` trait — the seam to the external messaging
//! service that turns rendered messages into email/SMS deliveries.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sender identity attached to every outbound message, taken from the
/// per-category template configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sender {
  pub email_name:    String,
  pub email_address: String,
  pub sms_name:      String,
}

/// One rendered message addressed to a party. The messaging service
/// resolves the party id to actual email/SMS endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
  pub sender:   Sender,
  pub party_id: Uuid,
  pub subject:  String,
  pub message:  String,
}

/// Abstraction over the outbound messaging service.
///
/// One call delivers one batch; there is no partial success — the whole
/// batch is accepted or the call fails. No retries happen at this level.
pub trait MessageTransport: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send<'a>(
    &'a self,
    messages: &'a [OutboundMessage],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
