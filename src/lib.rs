//! # tabsync
//!
//! **tabsync** keeps one shared document consistent across several independent
//! instances of the same front-end (tabs, windows) with no server: a persistent
//! key-value slot holds the state, and a named broadcast channel tells the other
//! instances what changed.
//!
//! Broadcasts travel through a [`Hub`], which lives in one process. Instances in
//! separate processes can share a [`FileStorage`] directory, but they only see each
//! other's changes when they reload (`loadPlayers` / `loadThrottle`).
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        UI (instance A)                                  UI (instance B)
//!             │ Command                                        ▲ Event
//!             ▼                                                │
//! ┌──────────────────────────┐                    ┌──────────────────────────┐
//! │ Router                   │                    │ relay listener           │
//! │  1. Store::load()        │                    │  Subscription::recv()    │
//! │  2. mutate Document      │                    │  SubscriberSet::relay()  │
//! │  3. Store::save()        │                    └────────────▲─────────────┘
//! │  4. publish (some cmds)  │──── {type,payload} ─────────────┘
//! │  5. emit replay (loads)  │        Hub["torn-chain"]
//! └───────┬──────────┬───────┘
//!         │          └──► SubscriberSet::emit ──► [queue] ──► worker ──► UI (A)
//!         ▼
//!   Storage slot "torn-chain"  (shared by A and B; last save wins)
//! ```
//!
//! ### Consistency model
//! - The document is read fresh for every command and written whole.
//! - Every broadcast follows a successful save.
//! - Peers apply broadcasts as they arrive; a late-opened instance catches up with
//!   `loadPlayers` / `loadThrottle`, which replay durable state to its own UI only.
//! - Concurrent writes race; the last save wins. `deletePlayer` is not broadcast.
//!
//! ## Features
//! | Area             | Description                                             | Key types                                |
//! |------------------|---------------------------------------------------------|------------------------------------------|
//! | **Store**        | Shallow-merge decoding, whole-document saves.           | [`Store`], [`Document`], [`Storage`]     |
//! | **Channel**      | Named broadcast excluding the publisher.                | [`Hub`], [`BroadcastChannel`]            |
//! | **Protocol**     | Typed commands and events with an untyped boundary.     | [`Command`], [`RawCommand`], [`Event`]   |
//! | **Delivery**     | Deferred local emission, immediate peer relay.          | [`Subscribe`], [`SubscriberSet`]         |
//! | **Wiring**       | One running copy of the application.                    | [`Instance`], [`Config`]                 |
//! | **Errors**       | Typed errors for the medium, channel and protocol.      | [`StoreError`], [`ChannelError`]         |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] subscriber _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use tabsync::{Command, Config, Event, Forwarder, Hub, Instance, MemoryStorage, Profile, Subscribe};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Two tabs of one browser profile: same slots, same hub.
//!     let storage = Arc::new(MemoryStorage::new());
//!     let hub = Hub::default();
//!
//!     let a = Instance::builder(Config::default())
//!         .with_storage(storage.clone())
//!         .with_hub(hub.clone())
//!         .build()?;
//!
//!     let (ui_b, mut events_b) = Forwarder::channel();
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(ui_b)];
//!     let b = Instance::builder(Config::default())
//!         .with_storage(storage)
//!         .with_hub(hub)
//!         .with_subscribers(subs)
//!         .build()?;
//!
//!     a.handle(Command::SavePlayer(Profile::new(7).with_field("name", "x")))?;
//!
//!     let ev = events_b.recv().await.ok_or("no event")?;
//!     assert_eq!(serde_json::to_value(&ev)?, json!({"type": "player", "payload": {"id": 7, "name": "x"}}));
//!     assert!(matches!(ev, Event::Player(_)));
//!
//!     a.shutdown().await;
//!     b.shutdown().await;
//!     Ok(())
//! }
//! ```

mod channel;
mod config;
mod error;
mod events;
mod instance;
mod router;
mod store;
mod subscribers;

// ---- Public re-exports ----

pub use channel::{BroadcastChannel, Hub, Subscription};
pub use config::{Config, DEFAULT_NAME};
pub use error::{BuildError, ChannelError, CommandError, StoreError};
pub use events::{Event, Frame};
pub use instance::{Instance, InstanceBuilder};
pub use router::{Command, RawCommand, Router};
pub use store::{
    DEFAULT_API_RATE, Document, FileStorage, Flags, MemoryStorage, Profile, ProfileId, Profiles,
    Storage, Store, Throttle,
};
pub use subscribers::{Forwarder, Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
