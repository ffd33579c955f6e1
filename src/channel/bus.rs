//! # One instance's endpoint on a named broadcast channel.
//!
//! [`BroadcastChannel`] publishes `{type, payload}` frames to every
//! [`Subscription`] registered on the same name in the same [`Hub`](super::Hub),
//! except the ones opened from the publishing endpoint itself.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits; each peer has an unbounded queue.
//! - **Lossless**: every subscription registered at publish time gets every frame,
//!   however far behind its reader is.
//! - **Self-exclusion**: a subscription never yields frames from its own endpoint.
//! - **FIFO per publisher**: frames from one endpoint arrive in publish order.
//! - **No persistence**: frames published before a subscription exists are not seen.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::hub::HubInner;
use crate::error::ChannelError;
use crate::events::{Event, Frame};

/// Publisher/subscriber endpoint for one instance.
#[derive(Clone)]
pub struct BroadcastChannel {
    name: Arc<str>,
    origin: u64,
    hub: Arc<HubInner>,
}

impl BroadcastChannel {
    pub(crate) fn new(name: &str, origin: u64, hub: Arc<HubInner>) -> Self {
        Self {
            name: name.into(),
            origin,
            hub,
        }
    }

    /// Returns the channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the origin id stamped on frames from this endpoint.
    pub fn origin(&self) -> u64 {
        self.origin
    }

    /// Publishes an event to every other endpoint subscribed on this channel.
    ///
    /// - The event is encoded to its `{type, payload}` JSON form first.
    /// - With no other subscriptions the frame is dropped; that is not an error.
    /// - Subscriptions whose receiver is gone are unregistered on the way.
    ///
    /// ### Errors
    /// - [`ChannelError::Encode`] when the event cannot be encoded
    /// - [`ChannelError::Unsupported`] when the hub registry is unusable
    pub fn publish(&self, event: &Event) -> Result<(), ChannelError> {
        let body: Arc<str> = serde_json::to_string(event)?.into();
        self.hub.deliver(&self.name, self.origin, &body)
    }

    /// Creates a receiver for frames published **after** this call by other endpoints.
    ///
    /// ### Errors
    /// - [`ChannelError::Unsupported`] once the hub was shut down
    pub fn subscribe(&self) -> Result<Subscription, ChannelError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.hub.register(&self.name, self.origin, tx)?;
        Ok(Subscription { rx })
    }
}

impl std::fmt::Debug for BroadcastChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastChannel")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .finish()
    }
}

/// Receiving half created by [`BroadcastChannel::subscribe`].
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Arc<str>>,
}

impl Subscription {
    /// Waits for the next frame from another endpoint.
    ///
    /// Returns `None` once the hub shut down and every queued frame was read.
    /// Frames that are not valid `{type, payload}` JSON are skipped with a warning.
    pub async fn recv(&mut self) -> Option<Frame> {
        loop {
            let body = self.rx.recv().await?;
            match serde_json::from_str::<Frame>(&body) {
                Ok(frame) => return Some(frame),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping undecodable broadcast frame");
                }
            }
        }
    }
}
