//! Subscription records — who gets notified about what.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::disturbance::Category;

/// A per-disturbance subscription: "notify this party about this
/// disturbance". Seeded from global subscriptions when a disturbance is
/// created, or created explicitly through the feedback endpoint. At most
/// one row per `(category, disturbance_id, party_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
  pub category:       Category,
  pub disturbance_id: String,
  pub party_id:       Uuid,
  pub created:        DateTime<Utc>,
}

/// A standing subscription: "notify this party about all future
/// disturbances in any category". At most one row per party. Consulted
/// read-only when a disturbance is created, to seed [`Subscription`]
/// rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSubscription {
  pub party_id: Uuid,
  pub created:  DateTime<Utc>,
}
