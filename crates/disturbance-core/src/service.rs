//! `DisturbanceService` — the service-layer orchestration.
//!
//! Each operation is one unit of work: validate, decide which
//! notifications the transition triggers, dispatch them, persist. There
//! is no core-level locking; key uniqueness is guarded by the storage
//! constraints behind [`DisturbanceStore`]. Sends happen before the
//! final persist on the update path; a transport failure fails the
//! request and no compensating rollback is attempted.

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  diff::removed_affected,
  dispatch::Dispatcher,
  disturbance::{Category, Disturbance, NewDisturbance, Status, dedup_affected},
  error::{Error, Result},
  patch::{DisturbancePatch, content_changed, merge},
  store::DisturbanceStore,
  template::MessageConfig,
  transport::MessageTransport,
};

pub struct DisturbanceService<S, T> {
  store:          S,
  transport:      T,
  message_config: MessageConfig,
}

impl<S, T> DisturbanceService<S, T>
where
  S: DisturbanceStore,
  T: MessageTransport,
{
  pub fn new(store: S, transport: T, message_config: MessageConfig) -> Self {
    Self { store, transport, message_config }
  }

  fn dispatcher(&self) -> Dispatcher<'_, S, T> {
    Dispatcher {
      store:     &self.store,
      transport: &self.transport,
      config:    &self.message_config,
    }
  }

  fn store_err(e: S::Error) -> Error {
    Error::Store(Box::new(e))
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn get_disturbance(
    &self,
    category: Category,
    disturbance_id: &str,
  ) -> Result<Disturbance> {
    debug!(%category, disturbance_id, "executing get_disturbance");

    self
      .store
      .find_active(category, disturbance_id)
      .await
      .map_err(Self::store_err)?
      .ok_or_else(|| Error::DisturbanceNotFound {
        category,
        disturbance_id: disturbance_id.to_owned(),
      })
  }

  pub async fn find_by_party_id(
    &self,
    party_id: Uuid,
    categories: &[Category],
    statuses: &[Status],
  ) -> Result<Vec<Disturbance>> {
    debug!(%party_id, ?categories, ?statuses, "executing find_by_party_id");

    self
      .store
      .find_by_party(party_id, categories, statuses)
      .await
      .map_err(Self::store_err)
  }

  // ── Create ────────────────────────────────────────────────────────────

  /// Create a disturbance. Fails Conflict when the key already has a
  /// live row. Parties with a global subscription get a
  /// per-disturbance subscription row; if the new disturbance is OPEN,
  /// "create" messages go out to every subscriber.
  pub async fn create_disturbance(&self, new: NewDisturbance) -> Result<Disturbance> {
    debug!(category = %new.category, disturbance_id = %new.disturbance_id,
      "executing create_disturbance");

    let new = NewDisturbance { affected: dedup_affected(new.affected), ..new };
    let category = new.category;
    let disturbance_id = new.disturbance_id.clone();

    let Some(created) =
      self.store.insert_disturbance(new).await.map_err(Self::store_err)?
    else {
      return Err(Error::DisturbanceAlreadyExists { category, disturbance_id });
    };

    if !created.affected.is_empty() && created.status != Status::Closed {
      for affected in &created.affected {
        if self
          .store
          .find_global_subscription(affected.party_id)
          .await
          .map_err(Self::store_err)?
          .is_some()
        {
          self
            .store
            .insert_subscription(
              created.category,
              &created.disturbance_id,
              affected.party_id,
            )
            .await
            .map_err(Self::store_err)?;
        }
      }

      if created.status == Status::Open {
        self.dispatcher().send_create(&created).await?;
      }
    }

    Ok(created)
  }

  // ── Update ────────────────────────────────────────────────────────────

  /// Apply a partial update and run the notification decision rules in
  /// order (first match wins):
  ///
  /// 1. status becomes CLOSED — close messages to all pre-update
  ///    subscribers, persist, done;
  /// 2. parties removed from the affected list (not while PLANNED) —
  ///    close messages scoped to the removed subset;
  /// 3. PLANNED → OPEN — create messages with the merged entity;
  /// 4. content changed and not PLANNED — update messages.
  pub async fn update_disturbance(
    &self,
    category: Category,
    disturbance_id: &str,
    patch: DisturbancePatch,
  ) -> Result<Disturbance> {
    debug!(%category, disturbance_id, "executing update_disturbance");

    let existing = self.get_disturbance(category, disturbance_id).await?;

    if existing.status == Status::Closed {
      return Err(Error::DisturbanceClosed {
        category,
        disturbance_id: disturbance_id.to_owned(),
      });
    }

    let patch = patch.dedup();
    let removed = removed_affected(&existing.affected, patch.affected.as_deref());

    if patch.status == Some(Status::Closed) {
      info!(%category, disturbance_id, "disturbance status changed to CLOSED");
      self.dispatcher().send_close_to_all(&existing).await?;

      // No diff- or content-based rules apply after a close.
      let merged = merge(&existing, &patch);
      return self
        .store
        .update_disturbance(&merged)
        .await
        .map_err(Self::store_err);
    }

    if !removed.is_empty() && existing.status != Status::Planned {
      info!(%category, disturbance_id, removed = removed.len(),
        "removed affected parties discovered in update");
      self.dispatcher().send_close_to(&existing, &removed).await?;
    }

    // Both checks must run against the pre-merge snapshot.
    let content_is_changed = content_changed(&existing, &patch);
    let planned_to_open =
      existing.status == Status::Planned && patch.status == Some(Status::Open);

    let merged = merge(&existing, &patch);

    if planned_to_open {
      self.dispatcher().send_create(&merged).await?;
    } else if content_is_changed && merged.status != Status::Planned {
      self.dispatcher().send_update(&merged).await?;
    }

    self.store.update_disturbance(&merged).await.map_err(Self::store_err)
  }

  // ── Delete ────────────────────────────────────────────────────────────

  /// Soft-delete a disturbance and drop all its subscription rows. A
  /// second call fails NotFound, since deleted rows are invisible.
  pub async fn delete_disturbance(
    &self,
    category: Category,
    disturbance_id: &str,
  ) -> Result<()> {
    debug!(%category, disturbance_id, "executing delete_disturbance");

    let _ = self.get_disturbance(category, disturbance_id).await?;

    let removed = self
      .store
      .delete_subscriptions(category, disturbance_id)
      .await
      .map_err(Self::store_err)?;
    debug!(%category, disturbance_id, removed, "deleted subscription rows");

    self
      .store
      .soft_delete(category, disturbance_id)
      .await
      .map_err(Self::store_err)
  }

  // ── Subscriptions ─────────────────────────────────────────────────────

  /// Subscribe a party to one disturbance. Fails when the disturbance
  /// is missing or closed, or when the subscription already exists.
  pub async fn create_subscription(
    &self,
    category: Category,
    disturbance_id: &str,
    party_id: Uuid,
  ) -> Result<()> {
    debug!(%category, disturbance_id, %party_id, "executing create_subscription");

    let disturbance = self.get_disturbance(category, disturbance_id).await?;
    if disturbance.status == Status::Closed {
      return Err(Error::DisturbanceClosed {
        category,
        disturbance_id: disturbance_id.to_owned(),
      });
    }

    let inserted = self
      .store
      .insert_subscription(category, disturbance_id, party_id)
      .await
      .map_err(Self::store_err)?;
    if !inserted {
      return Err(Error::SubscriptionAlreadyExists {
        category,
        disturbance_id: disturbance_id.to_owned(),
        party_id,
      });
    }
    Ok(())
  }

  /// Subscribe a party to all future disturbances.
  pub async fn create_global_subscription(&self, party_id: Uuid) -> Result<()> {
    debug!(%party_id, "executing create_global_subscription");

    let inserted = self
      .store
      .insert_global_subscription(party_id)
      .await
      .map_err(Self::store_err)?;
    if !inserted {
      return Err(Error::GlobalSubscriptionAlreadyExists(party_id));
    }
    Ok(())
  }

  pub async fn delete_global_subscription(&self, party_id: Uuid) -> Result<()> {
    debug!(%party_id, "executing delete_global_subscription");

    let deleted = self
      .store
      .delete_global_subscription(party_id)
      .await
      .map_err(Self::store_err)?;
    if !deleted {
      return Err(Error::GlobalSubscriptionNotFound(party_id));
    }
    Ok(())
  }
}
