//! # Forwarder: events into an mpsc stream.
//!
//! UI event loops usually poll a channel rather than implement a trait. [`Forwarder`]
//! bridges the two: every event it receives is cloned into a tokio unbounded
//! channel whose receiver the UI owns.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tabsync::{Forwarder, Subscribe};
//!
//! let (fwd, mut events) = Forwarder::channel();
//! let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(fwd)];
//! # drop((subs, events.try_recv()));
//! ```

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Subscriber that forwards events to an unbounded mpsc receiver.
#[derive(Clone, Debug)]
pub struct Forwarder {
    tx: mpsc::UnboundedSender<Event>,
}

impl Forwarder {
    /// Creates a forwarder and the receiver it feeds.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Subscribe for Forwarder {
    async fn on_event(&self, event: &Event) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!(kind = event.kind(), "forwarder receiver dropped");
        }
    }

    fn name(&self) -> &'static str {
        "forwarder"
    }
}
