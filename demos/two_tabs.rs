//! Two instances sharing one in-memory profile.
//!
//! Run with: `cargo run --example two_tabs --features logging`

use std::sync::Arc;

use serde_json::json;
use tabsync::{
    Command, Config, Forwarder, Hub, Instance, LogWriter, MemoryStorage, Profile, Subscribe,
    Throttle,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let storage = Arc::new(MemoryStorage::new());
    let hub = Hub::default();

    let trace: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let first = Instance::builder(Config::default())
        .with_storage(storage.clone())
        .with_hub(hub.clone())
        .with_subscribers(trace)
        .build()?;

    let (ui, mut events) = Forwarder::channel();
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(ui)];
    let second = Instance::builder(Config::default())
        .with_storage(storage)
        .with_hub(hub)
        .with_subscribers(subs)
        .build()?;

    first.handle(Command::SaveApiToken(Some("demo-token".into())))?;
    first.handle(Command::SavePlayer(
        Profile::new(1).with_field("name", "alpha"),
    ))?;
    first.handle(Command::SaveThrottle(Throttle(json!({"remaining": 28}))))?;
    first.handle(Command::SetRunning(false))?;

    for _ in 0..3 {
        if let Some(ev) = events.recv().await {
            println!("second <- {}", serde_json::to_string(&ev)?);
        }
    }

    second.handle(Command::LoadPlayers)?;
    for _ in 0..3 {
        if let Some(ev) = events.recv().await {
            println!("second (replay) <- {}", serde_json::to_string(&ev)?);
        }
    }

    first.shutdown().await;
    second.shutdown().await;
    Ok(())
}
