//! Per-category message templates and the variable-substitution
//! renderer.
//!
//! Templates are plain strings with `${variable}` placeholders. The
//! variable set is fixed: `${title}`, `${description}`,
//! `${plannedStartDate}`, `${plannedStopDate}`, `${newline}` and
//! `${affected.reference}`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{disturbance::Category, dispatch::MessageKind, transport::Sender};

/// Rendered in place of an absent planned start/stop date.
pub const NOT_AVAILABLE: &str = "not available";

/// Human-readable pattern for dates substituted into messages.
pub const MESSAGE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

// ─── Configuration ───────────────────────────────────────────────────────────

/// Message templates and sender identity for one category.
///
/// `active = false` switches off all notifications for the category:
/// dispatch becomes a silent no-op (no messages, no history rows).
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
  pub active:               bool,
  pub subject_new:          String,
  pub message_new:          String,
  pub subject_update:       String,
  pub message_update:       String,
  pub subject_close:        String,
  pub message_close:        String,
  pub sender_email_name:    String,
  pub sender_email_address: String,
  pub sender_sms_name:      String,
}

impl CategoryConfig {
  /// The `(subject, message)` template pair for a notification kind.
  pub fn templates(&self, kind: MessageKind) -> (&str, &str) {
    match kind {
      MessageKind::Create => (&self.subject_new, &self.message_new),
      MessageKind::Update => (&self.subject_update, &self.message_update),
      MessageKind::Close => (&self.subject_close, &self.message_close),
    }
  }

  pub fn sender(&self) -> Sender {
    Sender {
      email_name:    self.sender_email_name.clone(),
      email_address: self.sender_email_address.clone(),
      sms_name:      self.sender_sms_name.clone(),
    }
  }
}

/// All category template configurations, keyed by the lowercase
/// category name (e.g. `electricity`, `district_heating`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageConfig {
  #[serde(default)]
  pub template: HashMap<String, CategoryConfig>,
}

impl MessageConfig {
  pub fn for_category(&self, category: Category) -> Option<&CategoryConfig> {
    self.template.get(category.config_key())
  }
}

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Substitute `${name}` placeholders. Unknown placeholders are left
/// untouched.
pub fn render(template: &str, variables: &[(&str, String)]) -> String {
  let mut out = template.to_owned();
  for (name, value) in variables {
    out = out.replace(&format!("${{{name}}}"), value);
  }
  out
}

/// Format a planned date for message substitution, falling back to the
/// [`NOT_AVAILABLE`] placeholder.
pub fn message_date(date: Option<DateTime<Utc>>) -> String {
  match date {
    Some(date) => date.format(MESSAGE_DATE_FORMAT).to_string(),
    None => NOT_AVAILABLE.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn render_substitutes_all_occurrences() {
    let rendered = render(
      "Hi!${newline}${title} - ${title}",
      &[("newline", "\n".to_owned()), ("title", "Outage".to_owned())],
    );
    assert_eq!(rendered, "Hi!\nOutage - Outage");
  }

  #[test]
  fn render_leaves_unknown_placeholders() {
    assert_eq!(render("${unknown} x", &[]), "${unknown} x");
  }

  #[test]
  fn message_date_formats_or_falls_back() {
    let date = Utc.with_ymd_and_hms(2024, 3, 1, 8, 5, 0).unwrap();
    assert_eq!(message_date(Some(date)), "2024-03-01 08:05");
    assert_eq!(message_date(None), NOT_AVAILABLE);
  }
}
