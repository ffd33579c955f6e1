//! # Named channel registry.
//!
//! A [`Hub`] plays the role of one browser profile's broadcast namespace: every
//! channel opened on the same hub under the same name reaches the same set of
//! subscriptions. Instances in one process normally share [`Hub::global`].
//!
//! A hub lives in one process. Instances in different processes can share a
//! [`FileStorage`](crate::FileStorage) directory but never see each other's
//! broadcasts; they only catch up through `loadPlayers` / `loadThrottle`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use tokio::sync::mpsc;

use super::bus::BroadcastChannel;
use crate::error::ChannelError;

static GLOBAL: OnceLock<Hub> = OnceLock::new();

/// A registered subscription: its endpoint's origin and its queue.
struct Peer {
    origin: u64,
    tx: mpsc::UnboundedSender<Arc<str>>,
}

pub(crate) struct HubInner {
    channels: Mutex<HashMap<String, Vec<Peer>>>,
    next_origin: AtomicU64,
    closed: AtomicBool,
}

impl HubInner {
    pub(crate) fn register(
        &self,
        name: &str,
        origin: u64,
        tx: mpsc::UnboundedSender<Arc<str>>,
    ) -> Result<(), ChannelError> {
        let unsupported = || ChannelError::Unsupported {
            name: name.to_string(),
        };
        let mut channels = self.channels.lock().map_err(|_| unsupported())?;
        // Checked under the lock so `shutdown` cannot race a late registration.
        if self.closed.load(Ordering::Acquire) {
            return Err(unsupported());
        }
        channels
            .entry(name.to_string())
            .or_default()
            .push(Peer { origin, tx });
        Ok(())
    }

    pub(crate) fn deliver(
        &self,
        name: &str,
        origin: u64,
        body: &Arc<str>,
    ) -> Result<(), ChannelError> {
        let mut channels = self.channels.lock().map_err(|_| ChannelError::Unsupported {
            name: name.to_string(),
        })?;
        if let Some(peers) = channels.get_mut(name) {
            peers.retain(|peer| {
                if peer.origin == origin {
                    !peer.tx.is_closed()
                } else {
                    peer.tx.send(Arc::clone(body)).is_ok()
                }
            });
        }
        Ok(())
    }
}

/// Registry of named broadcast channels.
///
/// Cheap to clone (internally holds an `Arc`).
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

impl Hub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                channels: Mutex::new(HashMap::new()),
                next_origin: AtomicU64::new(1),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the process-wide hub.
    pub fn global() -> &'static Hub {
        GLOBAL.get_or_init(Hub::new)
    }

    /// Opens a new endpoint on the channel called `name`.
    ///
    /// Each call yields an endpoint with its own origin id: frames it publishes reach
    /// every other endpoint's subscriptions on the same name, never its own.
    ///
    /// ### Errors
    /// - [`ChannelError::InvalidName`] for an empty name
    /// - [`ChannelError::Unsupported`] once the hub was shut down
    pub fn open(&self, name: &str) -> Result<BroadcastChannel, ChannelError> {
        if name.is_empty() {
            return Err(ChannelError::InvalidName);
        }
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(ChannelError::Unsupported {
                name: name.to_string(),
            });
        }
        let origin = self.inner.next_origin.fetch_add(1, Ordering::Relaxed);
        Ok(BroadcastChannel::new(name, origin, Arc::clone(&self.inner)))
    }

    /// Returns how many live subscriptions are registered under `name`.
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.inner
            .channels
            .lock()
            .map(|channels| {
                channels
                    .get(name)
                    .map_or(0, |peers| peers.iter().filter(|p| !p.tx.is_closed()).count())
            })
            .unwrap_or(0)
    }

    /// Stops handing out channels and subscriptions.
    ///
    /// Existing subscriptions yield what is already queued, then end.
    pub fn shutdown(&self) {
        let channels = self.inner.channels.lock();
        self.inner.closed.store(true, Ordering::Release);
        if let Ok(mut channels) = channels {
            channels.clear();
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("closed", &self.inner.closed.load(Ordering::Relaxed))
            .finish()
    }
}
