//! Disturbance — a tracked service disruption for one utility category.
//!
//! A disturbance is identified by its `(category, disturbance_id)` pair;
//! the id is supplied by the publishing backend and is unique within a
//! category among non-deleted rows.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ─── Enums ───────────────────────────────────────────────────────────────────

/// The utility domain a disturbance belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
  Communication,
  DistrictHeating,
  DistrictCooling,
  Electricity,
  Water,
}

impl Category {
  /// The wire/storage representation, e.g. `DISTRICT_HEATING`.
  pub fn as_str(&self) -> &'static str {
    match self {
      Category::Communication => "COMMUNICATION",
      Category::DistrictHeating => "DISTRICT_HEATING",
      Category::DistrictCooling => "DISTRICT_COOLING",
      Category::Electricity => "ELECTRICITY",
      Category::Water => "WATER",
    }
  }

  /// The lowercase key used to look up message templates in configuration.
  pub fn config_key(&self) -> &'static str {
    match self {
      Category::Communication => "communication",
      Category::DistrictHeating => "district_heating",
      Category::DistrictCooling => "district_cooling",
      Category::Electricity => "electricity",
      Category::Water => "water",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Raised when a string does not name a known [`Category`] or [`Status`].
#[derive(Debug, Error)]
#[error("unknown value: {0:?}")]
pub struct UnknownValue(pub String);

impl FromStr for Category {
  type Err = UnknownValue;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "COMMUNICATION" => Ok(Category::Communication),
      "DISTRICT_HEATING" => Ok(Category::DistrictHeating),
      "DISTRICT_COOLING" => Ok(Category::DistrictCooling),
      "ELECTRICITY" => Ok(Category::Electricity),
      "WATER" => Ok(Category::Water),
      other => Err(UnknownValue(other.to_owned())),
    }
  }
}

/// Lifecycle status of a disturbance.
///
/// A disturbance whose stored status is `Closed` is terminal: every
/// update attempt is rejected before any merge or notification logic
/// runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
  Open,
  Closed,
  Planned,
}

impl Status {
  pub fn as_str(&self) -> &'static str {
    match self {
      Status::Open => "OPEN",
      Status::Closed => "CLOSED",
      Status::Planned => "PLANNED",
    }
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Status {
  type Err = UnknownValue;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "OPEN" => Ok(Status::Open),
      "CLOSED" => Ok(Status::Closed),
      "PLANNED" => Ok(Status::Planned),
      other => Err(UnknownValue(other.to_owned())),
    }
  }
}

// ─── Affected ────────────────────────────────────────────────────────────────

/// One subscriber-eligible party tied to a disturbance.
///
/// `reference` holds the party-specific context (street address,
/// connection point, etc.) that is substituted into outbound messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affected {
  pub party_id:  Uuid,
  pub reference: String,
}

impl Affected {
  /// Identity within a disturbance is the `(party_id, reference)` pair,
  /// with case-insensitive reference comparison. Changing only the
  /// reference for a party is an add+remove, not an update.
  pub fn same_identity(&self, other: &Affected) -> bool {
    self.party_id == other.party_id
      && self.reference.to_lowercase() == other.reference.to_lowercase()
  }
}

/// Collapse duplicate `(party_id, reference)` entries, preserving
/// first-seen order.
pub fn dedup_affected(list: Vec<Affected>) -> Vec<Affected> {
  let mut out: Vec<Affected> = Vec::with_capacity(list.len());
  for candidate in list {
    if !out.iter().any(|kept| kept.same_identity(&candidate)) {
      out.push(candidate);
    }
  }
  out
}

// ─── Disturbance ─────────────────────────────────────────────────────────────

/// A persisted disturbance. `created` and `updated` are server-set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disturbance {
  pub category:           Category,
  #[serde(rename = "id")]
  pub disturbance_id:     String,
  pub title:              String,
  pub description:        String,
  pub status:             Status,
  pub planned_start_date: Option<DateTime<Utc>>,
  pub planned_stop_date:  Option<DateTime<Utc>>,
  #[serde(rename = "affecteds")]
  pub affected:           Vec<Affected>,
  pub created:            DateTime<Utc>,
  pub updated:            Option<DateTime<Utc>>,
}

/// Payload for creating a disturbance. The initial status is
/// caller-supplied (typically `OPEN` or `PLANNED`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDisturbance {
  pub category:           Category,
  #[serde(rename = "id")]
  pub disturbance_id:     String,
  pub title:              String,
  pub description:        String,
  pub status:             Status,
  #[serde(default)]
  pub planned_start_date: Option<DateTime<Utc>>,
  #[serde(default)]
  pub planned_stop_date:  Option<DateTime<Utc>>,
  #[serde(rename = "affecteds", default)]
  pub affected:           Vec<Affected>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn affected(party_id: Uuid, reference: &str) -> Affected {
    Affected { party_id, reference: reference.to_owned() }
  }

  #[test]
  fn identity_is_case_insensitive_on_reference() {
    let id = Uuid::new_v4();
    assert!(affected(id, "Storgatan 1").same_identity(&affected(id, "STORGATAN 1")));
    assert!(!affected(id, "Storgatan 1").same_identity(&affected(id, "Storgatan 2")));
    assert!(!affected(id, "Storgatan 1").same_identity(&affected(Uuid::new_v4(), "Storgatan 1")));
  }

  #[test]
  fn dedup_preserves_first_seen_order() {
    let a = affected(Uuid::new_v4(), "ref-a");
    let b = affected(Uuid::new_v4(), "ref-b");
    let c = affected(Uuid::new_v4(), "ref-c");

    let deduped = dedup_affected(vec![a.clone(), b.clone(), a.clone(), c.clone()]);
    assert_eq!(deduped, vec![a, b, c]);
  }

  #[test]
  fn dedup_treats_reference_case_insensitively() {
    let id = Uuid::new_v4();
    let deduped = dedup_affected(vec![affected(id, "ref-1"), affected(id, "REF-1")]);
    assert_eq!(deduped.len(), 1);
    assert_eq!(deduped[0].reference, "ref-1");
  }

  #[test]
  fn enum_round_trips_through_strings() {
    for category in [
      Category::Communication,
      Category::DistrictHeating,
      Category::DistrictCooling,
      Category::Electricity,
      Category::Water,
    ] {
      assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
    }
    for status in [Status::Open, Status::Closed, Status::Planned] {
      assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
    }
    assert!("HEATING".parse::<Category>().is_err());
  }
}
