//! Error types for `disturbance-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::disturbance::Category;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no disturbance found for category: {category} and id: {disturbance_id}")]
  DisturbanceNotFound {
    category:       Category,
    disturbance_id: String,
  },

  #[error("a disturbance already exists for category: {category} and id: {disturbance_id}")]
  DisturbanceAlreadyExists {
    category:       Category,
    disturbance_id: String,
  },

  #[error(
    "the disturbance for category: {category} and id: {disturbance_id} is closed, no updates are allowed"
  )]
  DisturbanceClosed {
    category:       Category,
    disturbance_id: String,
  },

  #[error(
    "a subscription already exists for category: {category}, id: {disturbance_id} and party: {party_id}"
  )]
  SubscriptionAlreadyExists {
    category:       Category,
    disturbance_id: String,
    party_id:       Uuid,
  },

  #[error("a global subscription already exists for party: {0}")]
  GlobalSubscriptionAlreadyExists(Uuid),

  #[error("no global subscription found for party: {0}")]
  GlobalSubscriptionNotFound(Uuid),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("message transport error: {0}")]
  Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
