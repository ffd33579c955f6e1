//! # Command router: the synchronization protocol.
//!
//! [`Router::handle`] turns one UI command into a store mutation, an optional
//! broadcast to peer instances, and optional replay events for the local UI.
//!
//! ## Protocol
//! ```text
//! command         mutation                  save  broadcast   emit to own UI
//! ─────────────── ───────────────────────── ───── ─────────── ─────────────────────────────
//! saveApiToken    apiToken = p              yes   -           -
//! saveApiRate     apiRate = p               yes   -           -
//! setRunning      running = p               yes   running     -
//! savePlayer      profiles[p.id] = p        yes   player      -
//! saveThrottle    throttle = p              yes   throttle    -
//! deletePlayer    remove profiles[p]        yes   -           -
//! loadPlayers     -                         -     -           running, throttle?, player*
//! loadThrottle    -                         -     -           throttle?
//! ```
//!
//! ## Rules
//! - The document is loaded fresh for every command; nothing is cached between commands.
//! - The whole document is saved **before** any broadcast; a failed save aborts the
//!   command and nothing is broadcast.
//! - Load commands never mutate; their events are deferred (see [`SubscriberSet::emit`]).
//! - `deletePlayer` is persisted but not broadcast: peers see the removal on their next
//!   `loadPlayers`.

mod command;

use std::sync::Arc;

pub use command::{Command, RawCommand};

use crate::channel::BroadcastChannel;
use crate::error::StoreError;
use crate::events::Event;
use crate::store::Store;
use crate::subscribers::SubscriberSet;

/// Applies commands for one instance.
pub struct Router {
    store: Store,
    channel: BroadcastChannel,
    subs: Arc<SubscriberSet>,
}

impl Router {
    /// Creates a router over the instance's store, channel endpoint and subscribers.
    pub fn new(store: Store, channel: BroadcastChannel, subs: Arc<SubscriberSet>) -> Self {
        Self {
            store,
            channel,
            subs,
        }
    }

    /// Returns the store this router writes to.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Handles one typed command to completion.
    ///
    /// Returns an error only when the storage medium fails.
    pub fn handle(&self, cmd: Command) -> Result<(), StoreError> {
        tracing::debug!(command = cmd.name(), "handling command");
        let mut doc = self.store.load()?;

        match cmd {
            Command::SaveApiToken(token) => {
                doc.api_token = token;
                self.store.save(&doc)?;
            }
            Command::SaveApiRate(rate) => {
                doc.api_rate = rate;
                self.store.save(&doc)?;
            }
            Command::SetRunning(running) => {
                doc.running = running;
                self.store.save(&doc)?;
                self.broadcast(&Event::Running(running));
            }
            Command::SavePlayer(profile) => {
                doc.profiles.insert(profile.clone());
                self.store.save(&doc)?;
                self.broadcast(&Event::Player(profile));
            }
            Command::SaveThrottle(throttle) => {
                doc.throttle = Some(throttle.clone());
                self.store.save(&doc)?;
                self.broadcast(&Event::Throttle(throttle));
            }
            Command::DeletePlayer(id) => {
                doc.profiles.remove(&id);
                self.store.save(&doc)?;
            }
            Command::LoadPlayers => {
                self.subs.emit(&Event::Running(doc.running));
                if let Some(throttle) = doc.throttle {
                    self.subs.emit(&Event::Throttle(throttle));
                }
                for profile in doc.profiles.iter() {
                    self.subs.emit(&Event::Player(profile.clone()));
                }
            }
            Command::LoadThrottle => {
                if let Some(throttle) = doc.throttle {
                    self.subs.emit(&Event::Throttle(throttle));
                }
            }
        }
        Ok(())
    }

    /// Handles an untyped command.
    ///
    /// Unknown names and malformed payloads are logged and dropped without touching
    /// the store or the channel.
    pub fn handle_raw(&self, raw: RawCommand) -> Result<(), StoreError> {
        match Command::try_from(raw) {
            Ok(cmd) => self.handle(cmd),
            Err(e) => {
                tracing::error!(label = e.as_label(), error = %e, "dropping command");
                Ok(())
            }
        }
    }

    fn broadcast(&self, event: &Event) {
        if let Err(e) = self.channel.publish(event) {
            tracing::error!(kind = event.kind(), error = %e, "broadcast after save failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::{Value, json};
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::channel::{Hub, Subscription};
    use crate::store::{MemoryStorage, Profile, ProfileId, Storage, Throttle};
    use crate::subscribers::{Forwarder, Subscribe};

    struct Fixture {
        router: Router,
        mem: MemoryStorage,
        peer: Subscription,
        ui: UnboundedReceiver<Event>,
    }

    fn fixture_with(mem: MemoryStorage) -> Fixture {
        let hub = Hub::new();
        let own = hub.open("torn-chain").unwrap();
        let peer = hub.open("torn-chain").unwrap().subscribe().unwrap();
        let (fwd, ui) = Forwarder::channel();
        let list: Vec<Arc<dyn Subscribe>> = vec![Arc::new(fwd)];
        let subs = Arc::new(SubscriberSet::new(list));
        let store = Store::new(Arc::new(mem.clone()), "torn-chain");
        Fixture {
            router: Router::new(store, own, subs),
            mem,
            peer,
            ui,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryStorage::new())
    }

    async fn no_frame(peer: &mut Subscription) -> bool {
        tokio::time::timeout(Duration::from_millis(50), peer.recv())
            .await
            .is_err()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn local_settings_are_saved_without_broadcast() {
        let mut fx = fixture();
        fx.router
            .handle(Command::SaveApiToken(Some("tok".into())))
            .unwrap();
        fx.router.handle(Command::SaveApiRate(45)).unwrap();

        let doc = fx.router.store().load().unwrap();
        assert_eq!(doc.api_token.as_deref(), Some("tok"));
        assert_eq!(doc.api_rate, 45);
        assert!(no_frame(&mut fx.peer).await);
        assert!(fx.ui.try_recv().is_err());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn collaborative_commands_broadcast_once_after_save() {
        let mut fx = fixture();
        let throttle = Throttle(json!({"left": 3}));

        fx.router.handle(Command::SetRunning(false)).unwrap();
        fx.router
            .handle(Command::SavePlayer(Profile::new(1).with_field("name", "a")))
            .unwrap();
        fx.router
            .handle(Command::SaveThrottle(throttle.clone()))
            .unwrap();

        let doc = fx.router.store().load().unwrap();
        assert!(!doc.running);
        assert!(doc.profiles.get(&ProfileId::Int(1)).is_some());
        assert_eq!(doc.throttle, Some(throttle));

        let kinds: Vec<String> = [
            fx.peer.recv().await.unwrap(),
            fx.peer.recv().await.unwrap(),
            fx.peer.recv().await.unwrap(),
        ]
        .into_iter()
        .map(|f| f.kind)
        .collect();
        assert_eq!(kinds, vec!["running", "player", "throttle"]);
        assert!(no_frame(&mut fx.peer).await);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn delete_is_saved_but_not_broadcast() {
        let mut fx = fixture();
        fx.router.handle(Command::SavePlayer(Profile::new(5))).unwrap();
        let _ = fx.peer.recv().await;

        fx.router
            .handle(Command::DeletePlayer(ProfileId::Int(5)))
            .unwrap();
        assert!(fx.router.store().load().unwrap().profiles.is_empty());
        assert!(no_frame(&mut fx.peer).await);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn load_players_replays_in_order() {
        let mut fx = fixture();
        let throttle = Throttle(json!({"left": 9}));
        fx.router.handle(Command::SavePlayer(Profile::new(1))).unwrap();
        fx.router.handle(Command::SavePlayer(Profile::new(2))).unwrap();
        fx.router
            .handle(Command::SaveThrottle(throttle.clone()))
            .unwrap();

        fx.router.handle(Command::LoadPlayers).unwrap();
        assert!(fx.ui.try_recv().is_err(), "replay must be deferred");

        let mut got = Vec::new();
        for _ in 0..4 {
            got.push(fx.ui.recv().await.unwrap());
        }
        assert_eq!(
            got,
            vec![
                Event::Running(true),
                Event::Throttle(throttle),
                Event::Player(Profile::new(1)),
                Event::Player(Profile::new(2)),
            ]
        );
        assert!(fx.ui.try_recv().is_err());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn load_throttle_is_a_noop_when_absent() {
        let mut fx = fixture();
        fx.router.handle(Command::LoadThrottle).unwrap();
        tokio::task::yield_now().await;
        assert!(fx.ui.try_recv().is_err());
        assert_eq!(fx.mem.get_item("torn-chain").unwrap(), None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unknown_raw_command_touches_nothing() {
        let mut fx = fixture();
        fx.router
            .handle_raw(RawCommand {
                command: "reboot".into(),
                payload: json!({"id": 1}),
            })
            .unwrap();
        fx.router
            .handle_raw(RawCommand {
                command: "savePlayer".into(),
                payload: json!({"name": "no id"}),
            })
            .unwrap();

        assert_eq!(fx.mem.get_item("torn-chain").unwrap(), None);
        assert!(no_frame(&mut fx.peer).await);
        assert!(fx.ui.try_recv().is_err());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_save_is_returned_and_not_broadcast() {
        let mut fx = fixture_with(MemoryStorage::new().with_quota(16));
        let res = fx.router.handle(Command::SetRunning(false));
        assert!(matches!(res, Err(StoreError::Unavailable { .. })));
        assert!(no_frame(&mut fx.peer).await);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn commands_read_fresh_state_written_by_others() {
        let fx = fixture();
        fx.mem
            .set_item("torn-chain", r#"{"apiRate":7,"profiles":{"3":{"id":3}}}"#)
            .unwrap();

        fx.router.handle(Command::SavePlayer(Profile::new(4))).unwrap();

        let raw = fx.mem.get_item("torn-chain").unwrap().unwrap();
        let v: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["apiRate"], json!(7));
        assert_eq!(v["profiles"]["3"], json!({"id": 3}));
        assert_eq!(v["profiles"]["4"], json!({"id": 4}));
    }
}
