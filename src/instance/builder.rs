use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{Instance, relay};
use crate::{
    channel::Hub,
    config::Config,
    error::BuildError,
    router::Router,
    store::{FileStorage, Storage, Store},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing an [`Instance`].
pub struct InstanceBuilder {
    cfg: Config,
    storage: Option<Arc<dyn Storage>>,
    hub: Option<Hub>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl InstanceBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            storage: None,
            hub: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the storage backend.
    ///
    /// Default: [`FileStorage`] under [`Config::resolved_data_dir`].
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Sets the channel hub.
    ///
    /// Default: [`Hub::global`].
    pub fn with_hub(mut self, hub: Hub) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Sets the UI-side event subscribers.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the instance.
    ///
    /// Opens the broadcast channel, reads the startup flags, spawns subscriber
    /// workers and the relay listener. Must be called within a tokio runtime.
    ///
    /// ### Errors
    /// - [`BuildError::Channel`] when the channel cannot be opened (no fallback)
    /// - [`BuildError::Store`] when the storage medium fails
    pub fn build(self) -> Result<Instance, BuildError> {
        let storage: Arc<dyn Storage> = match self.storage {
            Some(storage) => storage,
            None => Arc::new(FileStorage::from_config(&self.cfg)),
        };
        let hub = self.hub.unwrap_or_else(|| Hub::global().clone());

        let channel = hub.open(&self.cfg.channel_name)?;
        let subscription = channel.subscribe()?;
        let store = Store::new(storage, self.cfg.storage_key.as_str());
        let flags = store.flags()?;

        let subs = Arc::new(SubscriberSet::new(self.subscribers));
        let token = CancellationToken::new();
        let relay = relay::spawn(subscription, Arc::clone(&subs), token.clone());

        tracing::debug!(
            channel = channel.name(),
            origin = channel.origin(),
            key = store.key(),
            "instance started"
        );

        Ok(Instance {
            cfg: self.cfg,
            flags,
            router: Router::new(store, channel, Arc::clone(&subs)),
            subs,
            token,
            relay,
        })
    }
}
