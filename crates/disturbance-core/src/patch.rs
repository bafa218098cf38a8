//! Partial updates: the PATCH payload, the snapshot-then-merge routine
//! and the content-change predicate that drives update notifications.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::disturbance::{Affected, Disturbance, Status, dedup_affected};

/// A partial update. `None` means "field not provided — keep the stored
/// value"; `Some` overwrites. The affected list is replaced wholesale,
/// never merged element by element.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisturbancePatch {
  pub title:              Option<String>,
  pub description:        Option<String>,
  pub status:             Option<Status>,
  pub planned_start_date: Option<DateTime<Utc>>,
  pub planned_stop_date:  Option<DateTime<Utc>>,
  #[serde(rename = "affecteds")]
  pub affected:           Option<Vec<Affected>>,
}

impl DisturbancePatch {
  /// De-duplicate the incoming affected list (first-seen order) while
  /// leaving an absent list absent.
  pub fn dedup(self) -> Self {
    DisturbancePatch { affected: self.affected.map(dedup_affected), ..self }
  }
}

/// Produce the merged entity: `old` as the base, provided patch fields
/// winning. `old` is never mutated — the decision engine compares
/// pre-merge and post-merge state, so the snapshot must stay intact.
pub fn merge(old: &Disturbance, patch: &DisturbancePatch) -> Disturbance {
  Disturbance {
    category:           old.category,
    disturbance_id:     old.disturbance_id.clone(),
    title:              patch.title.clone().unwrap_or_else(|| old.title.clone()),
    description:        patch
      .description
      .clone()
      .unwrap_or_else(|| old.description.clone()),
    status:             patch.status.unwrap_or(old.status),
    planned_start_date: patch.planned_start_date.or(old.planned_start_date),
    planned_stop_date:  patch.planned_stop_date.or(old.planned_stop_date),
    affected:           patch
      .affected
      .clone()
      .unwrap_or_else(|| old.affected.clone()),
    created:            old.created,
    updated:            old.updated,
  }
}

/// True when the patch changes any of title, description or the planned
/// dates, or when it moves the disturbance from `PLANNED` to `OPEN`.
///
/// Only fields the patch actually supplies are considered. Title and
/// description are compared case-insensitively; the planned dates are
/// compared structurally.
pub fn content_changed(old: &Disturbance, patch: &DisturbancePatch) -> bool {
  let text_differs = |incoming: Option<&str>, stored: &str| {
    incoming.is_some_and(|value| value.to_lowercase() != stored.to_lowercase())
  };
  let date_differs =
    |incoming: Option<DateTime<Utc>>, stored: Option<DateTime<Utc>>| {
      incoming.is_some_and(|value| Some(value) != stored)
    };

  text_differs(patch.description.as_deref(), &old.description)
    || text_differs(patch.title.as_deref(), &old.title)
    || date_differs(patch.planned_start_date, old.planned_start_date)
    || date_differs(patch.planned_stop_date, old.planned_stop_date)
    || (old.status == Status::Planned && patch.status == Some(Status::Open))
}
