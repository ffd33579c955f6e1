//! Error types used by the store, the broadcast channel and the command router.
//!
//! This module defines four enums:
//!
//! - [`StoreError`]: the storage medium failed (propagated, never retried).
//! - [`ChannelError`]: the broadcast channel could not be opened or used.
//! - [`CommandError`]: an untyped command could not be decoded (logged and dropped).
//! - [`BuildError`]: an instance could not be constructed.
//!
//! Each type provides `as_label` for logs, mirroring the stable snake_case labels
//! used across the crate.

use thiserror::Error;

/// # Errors produced by the storage medium.
///
/// Malformed persisted content is **not** an error: it is recovered by substituting
/// the default document. Only failures of the medium itself surface here.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing medium reported an I/O failure (e.g. quota exceeded, read-only fs).
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be serialized.
    #[error("document encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The backend refused the operation for a reason of its own.
    #[error("storage slot {key:?} unavailable: {reason}")]
    Unavailable {
        /// Slot key that was accessed.
        key: String,
        /// Backend-specific reason.
        reason: String,
    },
}

impl StoreError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use tabsync::StoreError;
    ///
    /// let err = StoreError::Unavailable { key: "torn-chain".into(), reason: "quota".into() };
    /// assert_eq!(err.as_label(), "store_unavailable");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::Io(_) => "store_io",
            StoreError::Encode(_) => "store_encode",
            StoreError::Unavailable { .. } => "store_unavailable",
        }
    }
}

/// # Errors produced by the broadcast channel adapter.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Channel names must be non-empty.
    #[error("broadcast channel name must not be empty")]
    InvalidName,

    /// The hub no longer hands out channels (it was shut down).
    #[error("broadcast channel {name:?} is not supported by this hub")]
    Unsupported {
        /// Requested channel name.
        name: String,
    },

    /// A frame could not be encoded for the wire.
    #[error("frame encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ChannelError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ChannelError::InvalidName => "channel_invalid_name",
            ChannelError::Unsupported { .. } => "channel_unsupported",
            ChannelError::Encode(_) => "channel_encode",
        }
    }
}

/// # Errors produced while decoding an untyped command.
///
/// These never reach the caller of [`Router::handle_raw`](crate::Router::handle_raw);
/// they are logged and the command is dropped.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command name is not part of the protocol.
    #[error("unknown command {command:?}")]
    Unknown {
        /// Name as received.
        command: String,
    },

    /// The command is known but its payload has the wrong shape.
    #[error("invalid payload for {command:?}: {source}")]
    Payload {
        /// Name as received.
        command: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
}

impl CommandError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use tabsync::CommandError;
    ///
    /// let err = CommandError::Unknown { command: "reboot".into() };
    /// assert_eq!(err.as_label(), "command_unknown");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CommandError::Unknown { .. } => "command_unknown",
            CommandError::Payload { .. } => "command_payload",
        }
    }
}

/// # Errors produced while building an [`Instance`](crate::Instance).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BuildError {
    /// The broadcast channel could not be opened; there is no fallback path.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Startup flags could not be read from storage.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BuildError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BuildError::Channel(e) => e.as_label(),
            BuildError::Store(e) => e.as_label(),
        }
    }
}
