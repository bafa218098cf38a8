//! Core types and logic for the disturbance-tracking service.
//!
//! This crate holds the disturbance lifecycle rules, the partial-update
//! merge, the affected-set differencer, the notification decision engine
//! and the dispatcher that renders and batches outbound messages. It is
//! deliberately free of HTTP and database dependencies; storage and the
//! outbound messaging service are reached through the [`store`] and
//! [`transport`] trait seams.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod diff;
pub mod disturbance;
pub mod dispatch;
pub mod error;
pub mod patch;
pub mod service;
pub mod store;
pub mod subscription;
pub mod template;
pub mod transport;

pub use error::{Error, Result};
pub use service::DisturbanceService;
