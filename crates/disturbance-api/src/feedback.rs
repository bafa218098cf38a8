//! Handlers for the subscription ("feedback") endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/disturbances/:category/:id/feedback` | Subscribe to one disturbance |
//! | `POST`   | `/feedback` | Subscribe to all future disturbances |
//! | `DELETE` | `/feedback/:partyId` | Drop the global subscription |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use disturbance_core::{
  DisturbanceService, disturbance::Category, store::DisturbanceStore,
  transport::MessageTransport,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackBody {
  pub party_id: Uuid,
}

/// `POST /disturbances/:category/:id/feedback`
pub async fn create<S, T>(
  State(service): State<Arc<DisturbanceService<S, T>>>,
  Path((category, disturbance_id)): Path<(Category, String)>,
  Json(body): Json<FeedbackBody>,
) -> Result<StatusCode, ApiError>
where
  S: DisturbanceStore,
  T: MessageTransport,
{
  service.create_subscription(category, &disturbance_id, body.party_id).await?;
  Ok(StatusCode::CREATED)
}

/// `POST /feedback`
pub async fn create_global<S, T>(
  State(service): State<Arc<DisturbanceService<S, T>>>,
  Json(body): Json<FeedbackBody>,
) -> Result<StatusCode, ApiError>
where
  S: DisturbanceStore,
  T: MessageTransport,
{
  service.create_global_subscription(body.party_id).await?;
  Ok(StatusCode::CREATED)
}

/// `DELETE /feedback/:partyId`
pub async fn delete_global<S, T>(
  State(service): State<Arc<DisturbanceService<S, T>>>,
  Path(party_id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: DisturbanceStore,
  T: MessageTransport,
{
  service.delete_global_subscription(party_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
