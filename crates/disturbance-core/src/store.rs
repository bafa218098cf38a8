//! The `DisturbanceStore` trait — the persistence seam.
//!
//! Implemented by storage backends (e.g. `disturbance-store-sqlite`).
//! The service layer depends on this abstraction, never on a concrete
//! backend. All finds exclude soft-deleted disturbances; uniqueness of
//! `(category, disturbance_id)` among live rows, of subscription keys
//! and of global-subscription parties is enforced by storage
//! constraints, not by application-level check-then-act.

use std::future::Future;

use uuid::Uuid;

use crate::{
  disturbance::{Category, Disturbance, NewDisturbance, Status},
  subscription::{GlobalSubscription, Subscription},
};

/// Abstraction over the disturbance persistence backend.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes (tokio with `axum`).
pub trait DisturbanceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Disturbances ──────────────────────────────────────────────────────

  /// Look up a non-deleted disturbance by its composite key.
  fn find_active<'a>(
    &'a self,
    category: Category,
    disturbance_id: &'a str,
  ) -> impl Future<Output = Result<Option<Disturbance>, Self::Error>> + Send + 'a;

  /// All non-deleted disturbances that list `party_id` among their
  /// affected parties, optionally narrowed by category and status.
  /// Empty filter slices mean "no filter".
  fn find_by_party<'a>(
    &'a self,
    party_id: Uuid,
    categories: &'a [Category],
    statuses: &'a [Status],
  ) -> impl Future<Output = Result<Vec<Disturbance>, Self::Error>> + Send + 'a;

  /// Persist a new disturbance and return it with the server-set
  /// `created` timestamp. Returns `None` when the key already has a
  /// live row (the storage uniqueness constraint decides, so
  /// concurrent creators cannot both win).
  fn insert_disturbance(
    &self,
    new: NewDisturbance,
  ) -> impl Future<Output = Result<Option<Disturbance>, Self::Error>> + Send + '_;

  /// Persist a merged disturbance over its stored row (affected list
  /// replaced wholesale) and return it with a fresh `updated` timestamp.
  fn update_disturbance<'a>(
    &'a self,
    disturbance: &'a Disturbance,
  ) -> impl Future<Output = Result<Disturbance, Self::Error>> + Send + 'a;

  /// Mark a disturbance deleted. Soft-deleted rows stay invisible to
  /// every find but their historical rows persist.
  fn soft_delete<'a>(
    &'a self,
    category: Category,
    disturbance_id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Per-disturbance subscriptions ─────────────────────────────────────

  fn find_subscriptions<'a>(
    &'a self,
    category: Category,
    disturbance_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + 'a;

  /// Insert a subscription row. Returns `false` when the row already
  /// existed (the storage uniqueness constraint decides, so concurrent
  /// creators cannot both win).
  fn insert_subscription<'a>(
    &'a self,
    category: Category,
    disturbance_id: &'a str,
    party_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Remove every subscription row for a disturbance; returns the count.
  fn delete_subscriptions<'a>(
    &'a self,
    category: Category,
    disturbance_id: &'a str,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  // ── Global subscriptions ──────────────────────────────────────────────

  fn find_global_subscription(
    &self,
    party_id: Uuid,
  ) -> impl Future<Output = Result<Option<GlobalSubscription>, Self::Error>> + Send + '_;

  /// Insert a global subscription row. Returns `false` when the party
  /// already has one.
  fn insert_global_subscription(
    &self,
    party_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a party's global subscription. Returns `false` when there
  /// was none.
  fn delete_global_subscription(
    &self,
    party_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Sent-message history ──────────────────────────────────────────────

  /// Append one "SENT" audit row. Write-once; never updated or deleted.
  fn record_sent<'a>(
    &'a self,
    category: Category,
    disturbance_id: &'a str,
    party_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
