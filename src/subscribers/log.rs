//! # LogWriter: event tracer
//!
//! A minimal subscriber that writes incoming [`Event`]s through `tracing`.
//! Use it for debugging or demos.
//!
//! ## Example output
//! ```text
//! INFO tabsync: running running=false
//! INFO tabsync: player id=7
//! INFO tabsync: throttle payload={"left":3}
//! INFO tabsync: passthrough kind="chain"
//! ```

use async_trait::async_trait;

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e {
            Event::Running(running) => {
                tracing::info!(target: "tabsync", running, "running");
            }
            Event::Player(profile) => {
                tracing::info!(target: "tabsync", id = %profile.id, "player");
            }
            Event::Throttle(throttle) => {
                tracing::info!(target: "tabsync", payload = %throttle.0, "throttle");
            }
            Event::Other { kind, .. } => {
                tracing::info!(target: "tabsync", kind = %kind, "passthrough");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
