//! Notification dispatcher.
//!
//! One routine serves create, update and close notifications; only the
//! template pair and the subscriber scope differ. For every resolved
//! subscriber the dispatcher renders subject and body, appends a "SENT"
//! history row and adds the message to the batch. A single transport
//! call delivers the whole batch; an empty batch makes no call at all.

use tracing::{debug, info, warn};

use crate::{
  diff::reference_for_party,
  disturbance::{Affected, Disturbance},
  error::{Error, Result},
  store::DisturbanceStore,
  template::{MessageConfig, message_date, render},
  transport::{MessageTransport, OutboundMessage},
};

/// Which template pair a dispatch uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
  Create,
  Update,
  Close,
}

/// Borrows the store, the transport and the template configuration for
/// the duration of one service operation.
pub(crate) struct Dispatcher<'a, S, T> {
  pub store:     &'a S,
  pub transport: &'a T,
  pub config:    &'a MessageConfig,
}

impl<S, T> Dispatcher<'_, S, T>
where
  S: DisturbanceStore,
  T: MessageTransport,
{
  /// "New disturbance" messages to every subscriber of `disturbance`.
  pub async fn send_create(&self, disturbance: &Disturbance) -> Result<()> {
    self
      .dispatch(MessageKind::Create, disturbance, &disturbance.affected, false)
      .await
  }

  /// "Updated disturbance" messages to every subscriber of `disturbance`.
  pub async fn send_update(&self, disturbance: &Disturbance) -> Result<()> {
    self
      .dispatch(MessageKind::Update, disturbance, &disturbance.affected, false)
      .await
  }

  /// "Closed disturbance" messages to every subscriber that is also an
  /// affected party of `disturbance`. Called with the pre-merge entity
  /// so the scope still reflects everyone pre-close.
  pub async fn send_close_to_all(&self, disturbance: &Disturbance) -> Result<()> {
    self
      .dispatch(MessageKind::Close, disturbance, &disturbance.affected, true)
      .await
  }

  /// "Closed disturbance" messages restricted to `removed` — parties
  /// leaving the disturbance on an update. Their references are looked
  /// up in the removed list, not in the disturbance's current list.
  pub async fn send_close_to(
    &self,
    disturbance: &Disturbance,
    removed: &[Affected],
  ) -> Result<()> {
    self.dispatch(MessageKind::Close, disturbance, removed, true).await
  }

  async fn dispatch(
    &self,
    kind: MessageKind,
    disturbance: &Disturbance,
    scope: &[Affected],
    restrict_to_scope: bool,
  ) -> Result<()> {
    let subscriptions = self
      .store
      .find_subscriptions(disturbance.category, &disturbance.disturbance_id)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    let Some(config) = self.config.for_category(disturbance.category) else {
      warn!(
        category = %disturbance.category,
        "no message templates configured for category, skipping dispatch"
      );
      return Ok(());
    };
    if !config.active {
      debug!(
        category = %disturbance.category,
        "message templates inactive for category, skipping dispatch"
      );
      return Ok(());
    }

    let (subject_template, message_template) = config.templates(kind);
    let mut batch = Vec::with_capacity(subscriptions.len());

    for subscription in &subscriptions {
      // Close dispatches must not reach subscribers outside the scope
      // list; otherwise a removed-parties close would mail everyone.
      if restrict_to_scope
        && !scope.iter().any(|a| a.party_id == subscription.party_id)
      {
        continue;
      }

      let variables = [
        ("newline", "\n".to_owned()),
        ("title", disturbance.title.clone()),
        ("description", disturbance.description.clone()),
        ("plannedStartDate", message_date(disturbance.planned_start_date)),
        ("plannedStopDate", message_date(disturbance.planned_stop_date)),
        ("affected.reference", reference_for_party(scope, subscription.party_id)),
      ];

      self
        .store
        .record_sent(
          disturbance.category,
          &disturbance.disturbance_id,
          subscription.party_id,
        )
        .await
        .map_err(|e| Error::Store(Box::new(e)))?;

      batch.push(OutboundMessage {
        sender:   config.sender(),
        party_id: subscription.party_id,
        subject:  render(subject_template, &variables),
        message:  render(message_template, &variables),
      });
    }

    if batch.is_empty() {
      return Ok(());
    }

    info!(
      count = batch.len(),
      category = %disturbance.category,
      disturbance_id = %disturbance.disturbance_id,
      "sending messages to messaging service"
    );
    self
      .transport
      .send(&batch)
      .await
      .map_err(|e| Error::Transport(Box::new(e)))
  }
}
