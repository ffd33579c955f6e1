//! # Instance: one running copy of the application.
//!
//! An [`Instance`] owns a [`Router`], its channel endpoint, the UI subscribers and
//! the relay listener that feeds peer broadcasts to those subscribers.
//!
//! ## Wiring
//! ```text
//! InstanceBuilder::build()
//!   ├─► Hub::open(channel_name)        (fatal on failure)
//!   ├─► Store::flags()                 (startup values for the UI)
//!   ├─► SubscriberSet::new(subs)       (one worker per subscriber)
//!   └─► relay::spawn(subscription)     (peer frames ─► SubscriberSet::relay)
//!
//! Instance::handle(cmd) ─► Router::handle(cmd)
//!
//! Instance::shutdown()
//!   ├─► cancel relay listener, join it
//!   └─► SubscriberSet::shutdown()      (drain queued events)
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tabsync::{Command, Config, Forwarder, Hub, Instance, MemoryStorage, Subscribe};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = MemoryStorage::new();
//!     let (ui, mut events) = Forwarder::channel();
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(ui)];
//!
//!     let tab = Instance::builder(Config::default())
//!         .with_storage(Arc::new(storage))
//!         .with_hub(Hub::default())
//!         .with_subscribers(subs)
//!         .build()?;
//!
//!     assert_eq!(tab.flags().api_rate, 30);
//!     tab.handle(Command::LoadPlayers)?;
//!     assert!(events.recv().await.is_some());
//!
//!     tab.shutdown().await;
//!     Ok(())
//! }
//! ```

mod builder;
mod relay;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use builder::InstanceBuilder;

use crate::config::Config;
use crate::error::StoreError;
use crate::router::{Command, RawCommand, Router};
use crate::store::Flags;
use crate::subscribers::SubscriberSet;

/// One running copy of the application.
pub struct Instance {
    cfg: Config,
    flags: Flags,
    router: Router,
    subs: Arc<SubscriberSet>,
    token: CancellationToken,
    relay: JoinHandle<()>,
}

impl Instance {
    /// Returns a builder for an instance with the given configuration.
    pub fn builder(cfg: Config) -> InstanceBuilder {
        InstanceBuilder::new(cfg)
    }

    /// Returns the configuration this instance was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns the startup values read once at build time.
    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    /// Returns the command router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Handles one typed command. See [`Router::handle`].
    pub fn handle(&self, cmd: Command) -> Result<(), StoreError> {
        self.router.handle(cmd)
    }

    /// Handles one untyped command. See [`Router::handle_raw`].
    pub fn handle_raw(&self, raw: RawCommand) -> Result<(), StoreError> {
        self.router.handle_raw(raw)
    }

    /// Stops relaying peer events and drains queued local events.
    pub async fn shutdown(self) {
        let Instance {
            router,
            subs,
            token,
            relay,
            ..
        } = self;

        token.cancel();
        if let Err(e) = relay.await {
            tracing::warn!(error = %e, "relay listener ended abnormally");
        }
        drop(router);

        match Arc::try_unwrap(subs) {
            Ok(set) => set.shutdown().await,
            Err(_) => tracing::debug!("subscriber set still shared; workers left running"),
        }
    }
}
