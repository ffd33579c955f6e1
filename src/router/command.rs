//! # Commands issued by the UI.
//!
//! [`Command`] is the closed set of operations the router understands, each with
//! its own typed payload. [`RawCommand`] is the untyped `{command, payload}` shape
//! a UI bridge hands over; converting it is the only place an unknown command
//! name can appear.
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//! use tabsync::{Command, RawCommand};
//!
//! let raw: RawCommand = serde_json::from_value(json!({
//!     "command": "setRunning",
//!     "payload": false
//! })).unwrap();
//! assert_eq!(Command::try_from(raw).unwrap(), Command::SetRunning(false));
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CommandError;
use crate::store::{Profile, ProfileId, Throttle};

/// Untyped command as received from the UI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawCommand {
    /// Command name (e.g. `"savePlayer"`).
    pub command: String,
    /// Payload; `null` when absent.
    #[serde(default)]
    pub payload: Value,
}

/// A typed command.
///
/// Serializes to the same `{command, payload}` shape as [`RawCommand`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "camelCase")]
pub enum Command {
    /// Store the API credential (local only).
    SaveApiToken(Option<String>),
    /// Store the request budget (local only).
    SaveApiRate(u32),
    /// Store and broadcast the running flag.
    SetRunning(bool),
    /// Store and broadcast a player profile.
    SavePlayer(Profile),
    /// Store and broadcast the throttle state.
    SaveThrottle(Throttle),
    /// Remove a player profile. Not broadcast.
    DeletePlayer(ProfileId),
    /// Replay running flag, throttle and all players to this instance's UI.
    LoadPlayers,
    /// Replay the throttle to this instance's UI.
    LoadThrottle,
}

impl Command {
    /// Returns the protocol name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SaveApiToken(_) => "saveApiToken",
            Command::SaveApiRate(_) => "saveApiRate",
            Command::SetRunning(_) => "setRunning",
            Command::SavePlayer(_) => "savePlayer",
            Command::SaveThrottle(_) => "saveThrottle",
            Command::DeletePlayer(_) => "deletePlayer",
            Command::LoadPlayers => "loadPlayers",
            Command::LoadThrottle => "loadThrottle",
        }
    }
}

impl TryFrom<RawCommand> for Command {
    type Error = CommandError;

    fn try_from(raw: RawCommand) -> Result<Self, Self::Error> {
        let RawCommand { command, payload } = raw;
        match command.as_str() {
            "saveApiToken" => Ok(Command::SaveApiToken(decode(&command, payload)?)),
            "saveApiRate" => Ok(Command::SaveApiRate(decode(&command, payload)?)),
            "setRunning" => Ok(Command::SetRunning(decode(&command, payload)?)),
            "savePlayer" => Ok(Command::SavePlayer(decode(&command, payload)?)),
            "saveThrottle" => Ok(Command::SaveThrottle(decode(&command, payload)?)),
            "deletePlayer" => Ok(Command::DeletePlayer(decode(&command, payload)?)),
            "loadPlayers" => Ok(Command::LoadPlayers),
            "loadThrottle" => Ok(Command::LoadThrottle),
            _ => Err(CommandError::Unknown {
                command: command.clone(),
            }),
        }
    }
}

fn decode<T: DeserializeOwned>(command: &str, payload: Value) -> Result<T, CommandError> {
    serde_json::from_value(payload).map_err(|source| CommandError::Payload {
        command: command.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(command: &str, payload: Value) -> RawCommand {
        RawCommand {
            command: command.into(),
            payload,
        }
    }

    #[test]
    fn every_protocol_name_decodes() {
        let cases = [
            (raw("saveApiToken", json!("tok")), Command::SaveApiToken(Some("tok".into()))),
            (raw("saveApiToken", Value::Null), Command::SaveApiToken(None)),
            (raw("saveApiRate", json!(60)), Command::SaveApiRate(60)),
            (raw("setRunning", json!(true)), Command::SetRunning(true)),
            (
                raw("savePlayer", json!({"id": 7, "name": "x"})),
                Command::SavePlayer(Profile::new(7).with_field("name", "x")),
            ),
            (
                raw("saveThrottle", json!({"left": 1})),
                Command::SaveThrottle(Throttle(json!({"left": 1}))),
            ),
            (raw("deletePlayer", json!(7)), Command::DeletePlayer(ProfileId::Int(7))),
            (raw("deletePlayer", json!("7")), Command::DeletePlayer(ProfileId::from("7"))),
            (raw("loadPlayers", Value::Null), Command::LoadPlayers),
            (raw("loadThrottle", Value::Null), Command::LoadThrottle),
        ];
        for (input, expected) in cases {
            let name = input.command.clone();
            let cmd = Command::try_from(input).unwrap();
            assert_eq!(cmd.name(), name);
            assert_eq!(cmd, expected);
        }
    }

    #[test]
    fn unknown_name_is_reported() {
        let err = Command::try_from(raw("reboot", Value::Null)).unwrap_err();
        assert!(matches!(err, CommandError::Unknown { ref command } if command == "reboot"));
    }

    #[test]
    fn wrong_payload_is_reported() {
        let err = Command::try_from(raw("saveApiRate", json!("fast"))).unwrap_err();
        assert_eq!(err.as_label(), "command_payload");
    }

    #[test]
    fn typed_command_uses_the_raw_shape() {
        let v = serde_json::to_value(Command::SetRunning(false)).unwrap();
        assert_eq!(v, json!({"command": "setRunning", "payload": false}));

        let back: Command = serde_json::from_value(v).unwrap();
        assert_eq!(back, Command::SetRunning(false));
    }
}
