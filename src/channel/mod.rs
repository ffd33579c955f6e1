//! Cross-instance broadcast channel.
//!
//! ## Architecture
//! ```text
//! Instance A ── publish(Event) ──► BroadcastChannel(origin=A)
//!                                          │
//!                                          ▼
//!                     Hub["torn-chain"]: [Peer(origin=A), Peer(origin=B), ...]
//!                                          │
//!            ┌─────────────────────────────┤  (skips peers with origin=A)
//!            ▼                             ▼
//!   Subscription(origin=A)        [unbounded queue] ──► Subscription(origin=B)
//!   (nothing delivered)                                  yields Frame ──► Instance B relay
//! ```
//!
//! ## Contents
//! - [`Hub`] registry of named channels (one per "browser profile")
//! - [`BroadcastChannel`] one instance's endpoint
//! - [`Subscription`] receiving half, excluding the endpoint's own frames
//!
//! There is no fallback when a channel cannot be opened; instance construction fails.
//! Delivery is in-process only: see [`Hub`] for what separate processes share.

mod bus;
mod hub;

pub use bus::{BroadcastChannel, Subscription};
pub use hub::Hub;
