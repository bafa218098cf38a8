//! Error type for `disturbance-messaging`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The messaging service answered with a non-success status.
  #[error("messaging service returned {0}")]
  Status(reqwest::StatusCode),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
