//! State-change events: types and wire frame.
//!
//! ## Contents
//! - [`Event`] typed notification delivered to the UI
//! - [`Frame`] raw `{type, payload}` shape used on the broadcast channel
//!
//! ## Quick reference
//! - **Producers**: `Router` (broadcasts after saves, replays on load commands).
//! - **Consumers**: peer instances' relay listener, `SubscriberSet` (fan-out to the UI).

mod event;

pub use event::{Event, Frame};
