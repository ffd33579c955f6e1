//! # Event subscribers (delivery to the UI).
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out,
//! and built-in implementations.
//!
//! ## Architecture
//! ```text
//! Router ── emit(Event) ──────► SubscriberSet ──► [queue] ──► worker ──► Subscribe::on_event
//! relay listener ── relay(Event) ──►  SubscriberSet ───────────────────► Subscribe::on_event
//! ```
//!
//! ## Built-ins
//! - [`Forwarder`] pushes events into a tokio mpsc stream
//! - [`LogWriter`] traces every event (feature `logging`)

mod forward;
#[cfg(feature = "logging")]
mod log;
mod subscriber;
mod subscriber_set;

pub use forward::Forwarder;
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
