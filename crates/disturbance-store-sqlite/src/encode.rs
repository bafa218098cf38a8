//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Categories and statuses use
//! their canonical wire spelling. UUIDs are stored as hyphenated lowercase
//! strings.

use chrono::{DateTime, Utc};
use disturbance_core::{
  disturbance::{Affected, Category, Disturbance, Status},
  subscription::{GlobalSubscription, Subscription},
};
use uuid::Uuid;

use crate::Result;

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| crate::Error::DateParse(e.to_string()))
}

// ─── Category / Status ───────────────────────────────────────────────────────

pub fn encode_category(c: Category) -> &'static str { c.as_str() }

pub fn decode_category(s: &str) -> Result<Category> { Ok(s.parse()?) }

pub fn encode_status(s: Status) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<Status> { Ok(s.parse()?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `disturbances` row.
pub struct RawDisturbance {
  pub id:                 i64,
  pub category:           String,
  pub disturbance_id:     String,
  pub title:              String,
  pub description:        String,
  pub status:             String,
  pub planned_start_date: Option<String>,
  pub planned_stop_date:  Option<String>,
  pub created:            String,
  pub updated:            Option<String>,
}

impl RawDisturbance {
  /// Decode the row, attaching the already-decoded affected list.
  pub fn into_disturbance(self, affected: Vec<Affected>) -> Result<Disturbance> {
    Ok(Disturbance {
      category:           decode_category(&self.category)?,
      disturbance_id:     self.disturbance_id,
      title:              self.title,
      description:        self.description,
      status:             decode_status(&self.status)?,
      planned_start_date: self
        .planned_start_date
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      planned_stop_date:  self
        .planned_stop_date
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      affected,
      created:            decode_dt(&self.created)?,
      updated:            self.updated.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from an `affected` row.
pub struct RawAffected {
  pub party_id:  String,
  pub reference: String,
}

impl RawAffected {
  pub fn into_affected(self) -> Result<Affected> {
    Ok(Affected {
      party_id:  decode_uuid(&self.party_id)?,
      reference: self.reference,
    })
  }
}

/// Raw strings read directly from a `subscriptions` row.
pub struct RawSubscription {
  pub category:       String,
  pub disturbance_id: String,
  pub party_id:       String,
  pub created:        String,
}

impl RawSubscription {
  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      category:       decode_category(&self.category)?,
      disturbance_id: self.disturbance_id,
      party_id:       decode_uuid(&self.party_id)?,
      created:        decode_dt(&self.created)?,
    })
  }
}

/// Raw strings read directly from a `global_subscriptions` row.
pub struct RawGlobalSubscription {
  pub party_id: String,
  pub created:  String,
}

impl RawGlobalSubscription {
  pub fn into_global_subscription(self) -> Result<GlobalSubscription> {
    Ok(GlobalSubscription {
      party_id: decode_uuid(&self.party_id)?,
      created:  decode_dt(&self.created)?,
    })
  }
}
