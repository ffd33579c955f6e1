//! # Event fan-out to the UI.
//!
//! Provides [`SubscriberSet`], which delivers events to every registered subscriber
//! through two paths:
//!
//! ```text
//! emit(event)   (local command side effects; deferred)
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//!
//! relay(event)  (frames from peer instances; immediate)
//!     └──► subscriber1.on_event() ... subscriberN.on_event()  (awaited in order)
//! ```
//!
//! ## Rules
//! - **Deferred**: `emit()` only enqueues; the subscriber runs on a later scheduling
//!   turn, so a UI never re-enters the command path from inside a command.
//! - **Per-subscriber FIFO** on the deferred path.
//! - **Lossless**: queues are unbounded; a replay of any size reaches every subscriber.
//! - **Isolation**: a panicking subscriber is logged and keeps receiving events.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber panics while holding a lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::UnboundedSender<Arc<Event>>,
}

/// Fan-out coordinator for the subscribers of one instance.
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in &subs {
            let name = sub.name();
            let (tx, mut rx) = mpsc::unbounded_channel::<Arc<Event>>();
            let s = Arc::clone(sub);

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    deliver(s.as_ref(), ev.as_ref()).await;
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            subs,
            channels,
            workers,
        }
    }

    /// Queues an event for every subscriber (non-blocking, never drops).
    pub fn emit(&self, event: &Event) {
        let event = Arc::new(event.clone());
        for channel in &self.channels {
            if channel.sender.send(Arc::clone(&event)).is_err() {
                tracing::warn!(
                    subscriber = channel.name,
                    kind = event.kind(),
                    "subscriber worker closed; event dropped"
                );
            }
        }
    }

    /// Delivers an event to every subscriber right away, in registration order.
    pub async fn relay(&self, event: &Event) {
        for sub in &self.subs {
            deliver(sub.as_ref(), event).await;
        }
    }

    /// Returns the number of subscribers.
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Gracefully shuts down all subscriber workers.
    ///
    /// 1. Drops all queue senders (workers drain what is queued, then stop)
    /// 2. Awaits all worker tasks
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }
}

async fn deliver(sub: &dyn Subscribe, event: &Event) {
    let fut = sub.on_event(event);
    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
        let info = {
            let any = &*panic_err;
            if let Some(msg) = any.downcast_ref::<&'static str>() {
                (*msg).to_string()
            } else if let Some(msg) = any.downcast_ref::<String>() {
                msg.clone()
            } else {
                "unknown panic".to_string()
            }
        };
        tracing::warn!(
            subscriber = sub.name(),
            kind = event.kind(),
            info = %info,
            "subscriber panicked"
        );
    }
}
