//! Handlers for `/disturbances` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/disturbances` | 409 if the key is taken |
//! | `GET`    | `/disturbances/affecteds/:partyId` | Optional `?category=` / `?status=` (comma-separated) |
//! | `GET`    | `/disturbances/:category/:id` | 404 if not found |
//! | `PATCH`  | `/disturbances/:category/:id` | 409 if closed |
//! | `DELETE` | `/disturbances/:category/:id` | Soft delete |

use std::{str::FromStr, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use disturbance_core::{
  DisturbanceService,
  disturbance::{Category, Disturbance, NewDisturbance, Status},
  patch::DisturbancePatch,
  store::DisturbanceStore,
  transport::MessageTransport,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  validate::{validate_new, validate_patch},
};

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /disturbances`
pub async fn create<S, T>(
  State(service): State<Arc<DisturbanceService<S, T>>>,
  Json(body): Json<NewDisturbance>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DisturbanceStore,
  T: MessageTransport,
{
  validate_new(&body)?;
  let created = service.create_disturbance(body).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

// ─── List by party ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FindParams {
  pub category: Option<String>,
  pub status:   Option<String>,
}

/// Parse a comma-separated filter value (`?category=ELECTRICITY,WATER`).
fn parse_filter<V>(raw: Option<&str>, field: &str) -> Result<Vec<V>, ApiError>
where
  V: FromStr,
  V::Err: std::fmt::Display,
{
  raw
    .map(|list| list.split(','))
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|value| !value.is_empty())
    .map(|value| {
      value
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid {field}: {e}")))
    })
    .collect()
}

/// `GET /disturbances/affecteds/:partyId[?category=..][&status=..]`
pub async fn list_by_party<S, T>(
  State(service): State<Arc<DisturbanceService<S, T>>>,
  Path(party_id): Path<Uuid>,
  Query(params): Query<FindParams>,
) -> Result<Json<Vec<Disturbance>>, ApiError>
where
  S: DisturbanceStore,
  T: MessageTransport,
{
  let categories: Vec<Category> = parse_filter(params.category.as_deref(), "category")?;
  let statuses: Vec<Status> = parse_filter(params.status.as_deref(), "status")?;

  let disturbances =
    service.find_by_party_id(party_id, &categories, &statuses).await?;
  Ok(Json(disturbances))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /disturbances/:category/:id`
pub async fn get_one<S, T>(
  State(service): State<Arc<DisturbanceService<S, T>>>,
  Path((category, disturbance_id)): Path<(Category, String)>,
) -> Result<Json<Disturbance>, ApiError>
where
  S: DisturbanceStore,
  T: MessageTransport,
{
  let disturbance = service.get_disturbance(category, &disturbance_id).await?;
  Ok(Json(disturbance))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PATCH /disturbances/:category/:id`
pub async fn update<S, T>(
  State(service): State<Arc<DisturbanceService<S, T>>>,
  Path((category, disturbance_id)): Path<(Category, String)>,
  Json(patch): Json<DisturbancePatch>,
) -> Result<Json<Disturbance>, ApiError>
where
  S: DisturbanceStore,
  T: MessageTransport,
{
  validate_patch(&patch)?;
  let updated = service.update_disturbance(category, &disturbance_id, patch).await?;
  Ok(Json(updated))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /disturbances/:category/:id`
pub async fn delete<S, T>(
  State(service): State<Arc<DisturbanceService<S, T>>>,
  Path((category, disturbance_id)): Path<(Category, String)>,
) -> Result<StatusCode, ApiError>
where
  S: DisturbanceStore,
  T: MessageTransport,
{
  service.delete_disturbance(category, &disturbance_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
