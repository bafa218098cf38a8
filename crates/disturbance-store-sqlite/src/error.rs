//! Error type for `disturbance-store-sqlite`.

use disturbance_core::disturbance::{Category, UnknownValue};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored category or status column holds a value the domain enums
  /// do not know. Only possible after external tampering or a botched
  /// migration.
  #[error("unrecognised stored value: {0}")]
  UnknownValue(#[from] UnknownValue),

  /// An update addressed a disturbance that has no active row.
  #[error("no active disturbance row for {category}/{disturbance_id}")]
  RowNotFound {
    category:       Category,
    disturbance_id: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
