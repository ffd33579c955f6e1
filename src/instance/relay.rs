//! # Relay listener.
//!
//! Feeds frames from peer instances into the local [`SubscriberSet`] without
//! touching the store: the peer already saved before publishing.
//!
//! ```text
//! Subscription::recv() ──► Event::from(Frame) ──► SubscriberSet::relay(&Event)
//! ```
//!
//! Every frame is relayed: a type this version does not know, or a known type with
//! an unexpected payload, reaches the UI as [`Event::Other`] unchanged.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::channel::Subscription;
use crate::events::Event;
use crate::subscribers::SubscriberSet;

/// Spawns the listener; it runs until `token` is cancelled or the channel closes.
pub(super) fn spawn(
    mut sub: Subscription,
    subs: Arc<SubscriberSet>,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let frame = tokio::select! {
                _ = token.cancelled() => break,
                frame = sub.recv() => frame,
            };
            let Some(frame) = frame else {
                tracing::debug!("broadcast channel closed; relay stopped");
                break;
            };

            let event = Event::from(frame);
            tracing::debug!(kind = event.kind(), "relaying peer event");
            subs.relay(&event).await;
        }
    })
}
