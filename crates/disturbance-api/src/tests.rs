//! Router integration tests against an in-memory SQLite store and a
//! recording transport.

use std::sync::{Arc, Mutex};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use disturbance_core::{
  DisturbanceService,
  template::{CategoryConfig, MessageConfig},
  transport::{MessageTransport, OutboundMessage},
};
use disturbance_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use thiserror::Error;
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::api_router;

// ─── Fixtures ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("transport refused the batch")]
struct TransportRefused;

#[derive(Clone, Default)]
struct RecordingTransport {
  batches: Arc<Mutex<Vec<Vec<OutboundMessage>>>>,
}

impl RecordingTransport {
  fn batches(&self) -> Vec<Vec<OutboundMessage>> {
    self.batches.lock().unwrap().clone()
  }
}

impl MessageTransport for RecordingTransport {
  type Error = TransportRefused;

  async fn send(&self, messages: &[OutboundMessage]) -> Result<(), TransportRefused> {
    self.batches.lock().unwrap().push(messages.to_vec());
    Ok(())
  }
}

fn message_config() -> MessageConfig {
  let mut config = MessageConfig::default();
  config.template.insert("electricity".into(), CategoryConfig {
    active:               true,
    subject_new:          "New disturbance: ${title}".into(),
    message_new:          "New: ${description}".into(),
    subject_update:       "Updated disturbance: ${title}".into(),
    message_update:       "Update: ${description}".into(),
    subject_close:        "Closed disturbance: ${title}".into(),
    message_close:        "Closed: ${title}".into(),
    sender_email_name:    "Utility Co".into(),
    sender_email_address: "noreply@utility.example".into(),
    sender_sms_name:      "UtilityCo".into(),
  });
  config
}

async fn app() -> (Router, RecordingTransport) {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let transport = RecordingTransport::default();
  let service =
    Arc::new(DisturbanceService::new(store, transport.clone(), message_config()));
  (api_router(service), transport)
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> axum::response::Response {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(value) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(value.to_string())),
    None => builder.body(Body::empty()),
  }
  .unwrap();
  app.clone().oneshot(req).await.unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn disturbance_body(id: &str, status: &str, affecteds: Value) -> Value {
  json!({
    "category": "ELECTRICITY",
    "id": id,
    "title": "Power outage",
    "description": "Transformer failure",
    "status": status,
    "affecteds": affecteds,
  })
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_201_with_the_stored_entity() {
  let (app, _) = app().await;
  let party = Uuid::new_v4();

  let resp = send(
    &app,
    "POST",
    "/disturbances",
    Some(disturbance_body(
      "dist-1",
      "OPEN",
      json!([{ "partyId": party, "reference": "Storgatan 1" }]),
    )),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let body = body_json(resp).await;
  assert_eq!(body["id"], "dist-1");
  assert_eq!(body["category"], "ELECTRICITY");
  assert_eq!(body["status"], "OPEN");
  assert_eq!(body["affecteds"][0]["reference"], "Storgatan 1");
  assert!(body["created"].is_string());
  assert!(body["updated"].is_null());
}

#[tokio::test]
async fn create_duplicate_key_returns_409() {
  let (app, _) = app().await;
  let body = disturbance_body("dist-1", "OPEN", json!([]));

  let resp = send(&app, "POST", "/disturbances", Some(body.clone())).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = send(&app, "POST", "/disturbances", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_invalid_payload_returns_400_with_violations() {
  let (app, _) = app().await;

  let resp = send(
    &app,
    "POST",
    "/disturbances",
    Some(disturbance_body("  ", "OPEN", json!([]))),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let body = body_json(resp).await;
  assert_eq!(body["violations"][0]["field"], "id");
}

// ─── Get ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_returns_404() {
  let (app, _) = app().await;
  let resp = send(&app, "GET", "/disturbances/ELECTRICITY/nope", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_unknown_category_returns_400() {
  let (app, _) = app().await;
  let resp = send(&app, "GET", "/disturbances/GAS/dist-1", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_after_create_round_trips() {
  let (app, _) = app().await;
  send(
    &app,
    "POST",
    "/disturbances",
    Some(disturbance_body("dist-1", "PLANNED", json!([]))),
  )
  .await;

  let resp = send(&app, "GET", "/disturbances/ELECTRICITY/dist-1", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = body_json(resp).await;
  assert_eq!(body["status"], "PLANNED");
  assert_eq!(body["title"], "Power outage");
}

// ─── Patch ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn patch_merges_and_returns_the_updated_entity() {
  let (app, _) = app().await;
  send(
    &app,
    "POST",
    "/disturbances",
    Some(disturbance_body("dist-1", "OPEN", json!([]))),
  )
  .await;

  let resp = send(
    &app,
    "PATCH",
    "/disturbances/ELECTRICITY/dist-1",
    Some(json!({ "description": "Cable dug up" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);

  let body = body_json(resp).await;
  assert_eq!(body["description"], "Cable dug up");
  assert_eq!(body["title"], "Power outage");
  assert!(body["updated"].is_string());
}

#[tokio::test]
async fn patch_closed_disturbance_returns_409() {
  let (app, _) = app().await;
  send(
    &app,
    "POST",
    "/disturbances",
    Some(disturbance_body("dist-1", "CLOSED", json!([]))),
  )
  .await;

  let resp = send(
    &app,
    "PATCH",
    "/disturbances/ELECTRICITY/dist-1",
    Some(json!({ "description": "too late" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_returns_204_then_404() {
  let (app, _) = app().await;
  send(
    &app,
    "POST",
    "/disturbances",
    Some(disturbance_body("dist-1", "OPEN", json!([]))),
  )
  .await;

  let resp = send(&app, "DELETE", "/disturbances/ELECTRICITY/dist-1", None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let resp = send(&app, "DELETE", "/disturbances/ELECTRICITY/dist-1", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ─── List by party ───────────────────────────────────────────────────────────

#[tokio::test]
async fn list_by_party_honours_comma_separated_filters() {
  let (app, _) = app().await;
  let party = Uuid::new_v4();
  let affecteds = json!([{ "partyId": party, "reference": "ref1" }]);

  send(
    &app,
    "POST",
    "/disturbances",
    Some(disturbance_body("dist-1", "OPEN", affecteds.clone())),
  )
  .await;
  send(
    &app,
    "POST",
    "/disturbances",
    Some(disturbance_body("dist-2", "PLANNED", affecteds)),
  )
  .await;

  let resp = send(&app, "GET", &format!("/disturbances/affecteds/{party}"), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await.as_array().unwrap().len(), 2);

  let resp = send(
    &app,
    "GET",
    &format!("/disturbances/affecteds/{party}?status=OPEN,CLOSED"),
    None,
  )
  .await;
  let body = body_json(resp).await;
  assert_eq!(body.as_array().unwrap().len(), 1);
  assert_eq!(body[0]["id"], "dist-1");

  let resp = send(
    &app,
    "GET",
    &format!("/disturbances/affecteds/{party}?category=WATER"),
    None,
  )
  .await;
  assert!(body_json(resp).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn list_by_party_rejects_unknown_filter_values() {
  let (app, _) = app().await;
  let party = Uuid::new_v4();

  let resp = send(
    &app,
    "GET",
    &format!("/disturbances/affecteds/{party}?category=GAS"),
    None,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ─── Feedback ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn feedback_lifecycle_for_one_disturbance() {
  let (app, _) = app().await;
  let party = Uuid::new_v4();
  send(
    &app,
    "POST",
    "/disturbances",
    Some(disturbance_body("dist-1", "OPEN", json!([]))),
  )
  .await;

  let uri = "/disturbances/ELECTRICITY/dist-1/feedback";
  let body = json!({ "partyId": party });

  let resp = send(&app, "POST", uri, Some(body.clone())).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = send(&app, "POST", uri, Some(body.clone())).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let resp = send(
    &app,
    "POST",
    "/disturbances/ELECTRICITY/nope/feedback",
    Some(body),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn global_feedback_lifecycle() {
  let (app, _) = app().await;
  let party = Uuid::new_v4();
  let body = json!({ "partyId": party });

  let resp = send(&app, "POST", "/feedback", Some(body.clone())).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = send(&app, "POST", "/feedback", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let resp = send(&app, "DELETE", &format!("/feedback/{party}"), None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let resp = send(&app, "DELETE", &format!("/feedback/{party}"), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ─── End to end ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_notifies_globally_subscribed_parties() {
  let (app, transport) = app().await;
  let party = Uuid::new_v4();

  let resp = send(&app, "POST", "/feedback", Some(json!({ "partyId": party }))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = send(
    &app,
    "POST",
    "/disturbances",
    Some(disturbance_body(
      "dist-1",
      "OPEN",
      json!([{ "partyId": party, "reference": "ref1" }]),
    )),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let batches = transport.batches();
  assert_eq!(batches.len(), 1);
  assert_eq!(batches[0].len(), 1);
  assert_eq!(batches[0][0].party_id, party);
  assert_eq!(batches[0][0].subject, "New disturbance: Power outage");
}
