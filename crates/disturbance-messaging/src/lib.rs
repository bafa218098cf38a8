//! HTTP transport to the external messaging service.
//!
//! Implements [`disturbance_core::transport::MessageTransport`] over the
//! messaging service's batch REST endpoint.

mod client;

pub mod error;

pub use client::{MessagingClient, MessagingConfig};
pub use error::{Error, Result};
