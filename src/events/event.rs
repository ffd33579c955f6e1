//! # Events delivered to the UI and carried between instances.
//!
//! [`Event`] is a closed set of the state changes this crate knows about, plus an
//! [`Event::Other`] escape hatch so frames from newer peers pass through untouched.
//! On the wire and towards the UI every event has the same `{type, payload}` shape
//! ([`Frame`]).
//!
//! ## Kinds
//! | `type`     | payload            | produced by                              |
//! |------------|--------------------|------------------------------------------|
//! | `running`  | `bool`             | `setRunning` broadcast, `loadPlayers`    |
//! | `player`   | profile object     | `savePlayer` broadcast, `loadPlayers`    |
//! | `throttle` | throttle object    | `saveThrottle` broadcast, load commands  |
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//! use tabsync::{Event, Profile};
//!
//! let ev = Event::Player(Profile::new(7).with_field("name", "x"));
//! assert_eq!(ev.kind(), "player");
//! assert_eq!(
//!     serde_json::to_value(&ev).unwrap(),
//!     json!({"type": "player", "payload": {"id": 7, "name": "x"}})
//! );
//! ```

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::store::{Profile, Throttle};

/// Raw `{type, payload}` frame as it crosses an instance boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Event type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Payload; `null` when absent.
    #[serde(default)]
    pub payload: Value,
}

/// A typed state-change notification.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "Frame")]
pub enum Event {
    /// The running flag changed (or is being replayed).
    Running(bool),
    /// A player profile was saved (or is being replayed).
    Player(Profile),
    /// The throttle state was saved (or is being replayed).
    Throttle(Throttle),
    /// A type this version does not recognize; passed through unchanged.
    Other {
        /// Type tag as received.
        kind: String,
        /// Payload as received.
        payload: Value,
    },
}

impl Event {
    /// Returns the `type` tag of this event.
    pub fn kind(&self) -> &str {
        match self {
            Event::Running(_) => "running",
            Event::Player(_) => "player",
            Event::Throttle(_) => "throttle",
            Event::Other { kind, .. } => kind,
        }
    }

    /// Returns the payload as JSON.
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            Event::Running(running) => Ok(Value::Bool(*running)),
            Event::Player(profile) => serde_json::to_value(profile),
            Event::Throttle(throttle) => Ok(throttle.0.clone()),
            Event::Other { payload, .. } => Ok(payload.clone()),
        }
    }

    /// Converts into a raw frame.
    pub fn to_frame(&self) -> Result<Frame, serde_json::Error> {
        Ok(Frame {
            kind: self.kind().to_string(),
            payload: self.payload()?,
        })
    }
}

impl From<Frame> for Event {
    /// Decodes a frame. Unknown types, and known types whose payload does not
    /// have the expected shape, become [`Event::Other`] with the frame unchanged.
    fn from(frame: Frame) -> Self {
        let typed = match frame.kind.as_str() {
            "running" => bool::deserialize(&frame.payload).map(Event::Running),
            "player" => Profile::deserialize(&frame.payload).map(Event::Player),
            "throttle" => Ok(Event::Throttle(Throttle(frame.payload.clone()))),
            _ => {
                return Event::Other {
                    kind: frame.kind,
                    payload: frame.payload,
                };
            }
        };
        match typed {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(
                    kind = %frame.kind,
                    error = %e,
                    "payload does not match its type; passing through"
                );
                Event::Other {
                    kind: frame.kind,
                    payload: frame.payload,
                }
            }
        }
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("Event", 2)?;
        st.serialize_field("type", self.kind())?;
        match self {
            Event::Running(running) => st.serialize_field("payload", running)?,
            Event::Player(profile) => st.serialize_field("payload", profile)?,
            Event::Throttle(throttle) => st.serialize_field("payload", throttle)?,
            Event::Other { payload, .. } => st.serialize_field("payload", payload)?,
        }
        st.end()
    }
}
