//! JSON REST API for the disturbance service.
//!
//! Exposes an axum [`Router`] backed by any
//! [`disturbance_core::store::DisturbanceStore`] and
//! [`disturbance_core::transport::MessageTransport`]. Auth, TLS, and
//! transport concerns are the caller's responsibility.

pub mod disturbances;
pub mod error;
pub mod feedback;
pub mod validate;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use disturbance_core::{
  DisturbanceService, store::DisturbanceStore, template::MessageConfig,
  transport::MessageTransport,
};
use disturbance_messaging::MessagingConfig;
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub messaging:  MessagingConfig,
  /// Per-category notification templates (`[message.template.<category>]`).
  #[serde(default)]
  pub message:    MessageConfig,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, T>(service: Arc<DisturbanceService<S, T>>) -> Router<()>
where
  S: DisturbanceStore + 'static,
  T: MessageTransport + 'static,
{
  Router::new()
    // Disturbances
    .route("/disturbances", post(disturbances::create::<S, T>))
    .route(
      "/disturbances/affecteds/{party_id}",
      get(disturbances::list_by_party::<S, T>),
    )
    .route(
      "/disturbances/{category}/{disturbance_id}",
      get(disturbances::get_one::<S, T>)
        .patch(disturbances::update::<S, T>)
        .delete(disturbances::delete::<S, T>),
    )
    // Subscriptions
    .route(
      "/disturbances/{category}/{disturbance_id}/feedback",
      post(feedback::create::<S, T>),
    )
    .route("/feedback", post(feedback::create_global::<S, T>))
    .route("/feedback/{party_id}", delete(feedback::delete_global::<S, T>))
    .with_state(service)
}

#[cfg(test)]
mod tests;
