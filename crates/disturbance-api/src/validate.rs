//! Request validation: field length and blank checks, mirroring the
//! limits of the storage columns.

use disturbance_core::{
  disturbance::{Affected, NewDisturbance},
  patch::DisturbancePatch,
};
use serde::Serialize;

use crate::error::ApiError;

pub const MAX_DISTURBANCE_ID: usize = 255;
pub const MAX_TITLE: usize = 255;
pub const MAX_DESCRIPTION: usize = 8192;
pub const MAX_REFERENCE: usize = 512;

/// One rejected field, reported back in the 400 body.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
  pub field:   String,
  pub message: String,
}

struct Violations(Vec<Violation>);

impl Violations {
  fn new() -> Self {
    Violations(Vec::new())
  }

  fn push(&mut self, field: &str, message: impl Into<String>) {
    self.0.push(Violation { field: field.to_owned(), message: message.into() });
  }

  fn require_non_blank(&mut self, field: &str, value: &str) {
    if value.trim().is_empty() {
      self.push(field, "must not be blank");
    }
  }

  fn require_max_len(&mut self, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
      self.push(field, format!("must not exceed {max} characters"));
    }
  }

  fn check_affected(&mut self, affected: &[Affected]) {
    for (index, entry) in affected.iter().enumerate() {
      self.require_max_len(
        &format!("affecteds[{index}].reference"),
        &entry.reference,
        MAX_REFERENCE,
      );
    }
  }

  fn finish(self) -> Result<(), ApiError> {
    if self.0.is_empty() {
      Ok(())
    } else {
      Err(ApiError::Validation(self.0))
    }
  }
}

pub fn validate_new(new: &NewDisturbance) -> Result<(), ApiError> {
  let mut violations = Violations::new();
  violations.require_non_blank("id", &new.disturbance_id);
  violations.require_max_len("id", &new.disturbance_id, MAX_DISTURBANCE_ID);
  violations.require_non_blank("title", &new.title);
  violations.require_max_len("title", &new.title, MAX_TITLE);
  violations.require_non_blank("description", &new.description);
  violations.require_max_len("description", &new.description, MAX_DESCRIPTION);
  violations.check_affected(&new.affected);
  violations.finish()
}

pub fn validate_patch(patch: &DisturbancePatch) -> Result<(), ApiError> {
  let mut violations = Violations::new();
  if let Some(title) = &patch.title {
    violations.require_non_blank("title", title);
    violations.require_max_len("title", title, MAX_TITLE);
  }
  if let Some(description) = &patch.description {
    violations.require_non_blank("description", description);
    violations.require_max_len("description", description, MAX_DESCRIPTION);
  }
  if let Some(affected) = &patch.affected {
    violations.check_affected(affected);
  }
  violations.finish()
}

#[cfg(test)]
mod tests {
  use disturbance_core::disturbance::{Category, Status};
  use uuid::Uuid;

  use super::*;

  fn valid_new() -> NewDisturbance {
    NewDisturbance {
      category:           Category::Electricity,
      disturbance_id:     "dist-1".into(),
      title:              "Power outage".into(),
      description:        "Transformer failure".into(),
      status:             Status::Open,
      planned_start_date: None,
      planned_stop_date:  None,
      affected:           vec![],
    }
  }

  #[test]
  fn valid_payload_passes() {
    assert!(validate_new(&valid_new()).is_ok());
  }

  #[test]
  fn blank_id_is_rejected() {
    let new = NewDisturbance { disturbance_id: "  ".into(), ..valid_new() };
    let err = validate_new(&new).unwrap_err();
    let ApiError::Validation(violations) = err else {
      panic!("expected validation error");
    };
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, "id");
  }

  #[test]
  fn oversized_fields_are_all_reported() {
    let new = NewDisturbance {
      title: "t".repeat(MAX_TITLE + 1),
      description: "d".repeat(MAX_DESCRIPTION + 1),
      affected: vec![Affected {
        party_id:  Uuid::new_v4(),
        reference: "r".repeat(MAX_REFERENCE + 1),
      }],
      ..valid_new()
    };
    let ApiError::Validation(violations) = validate_new(&new).unwrap_err() else {
      panic!("expected validation error");
    };
    let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
    assert_eq!(fields, vec!["title", "description", "affecteds[0].reference"]);
  }

  #[test]
  fn patch_checks_only_provided_fields() {
    assert!(validate_patch(&DisturbancePatch::default()).is_ok());

    let patch = DisturbancePatch {
      title: Some(String::new()),
      ..Default::default()
    };
    assert!(validate_patch(&patch).is_err());
  }
}
