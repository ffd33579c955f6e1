//! # Event subscriber trait.
//!
//! Provides [`Subscribe`], the seam through which the UI layer receives events.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** for locally produced events (deferred delivery)
//! - **Per-subscriber unbounded queue** (local events are never dropped)
//! - **Direct calls** for events relayed from peer instances
//! - **Panic isolation** (panics are caught and logged)
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use tabsync::{Event, Subscribe};
//!
//! struct Sidebar;
//!
//! #[async_trait]
//! impl Subscribe for Sidebar {
//!     async fn on_event(&self, ev: &Event) {
//!         if let Event::Player(profile) = ev {
//!             // re-render the row for profile.id
//!             let _ = profile;
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "sidebar" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Receiver of state-change events for one UI.
///
/// ### Implementation requirements
/// - Apply events idempotently: replays and relays are not de-duplicated.
/// - Handle errors internally; do not panic.
/// - Do not assume ordering between replayed and relayed events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from the subscriber's worker task (local events) or from the
    /// instance's relay listener (peer events), never from inside a command handler.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
