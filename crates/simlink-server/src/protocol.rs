//! Message kinds, channel routing and protocol errors.
//!
//! Every message travels on exactly one logical [`Channel`]:
//!
//! | Channel      | Direction | Messages                     |
//! |--------------|-----------|------------------------------|
//! | `WorldInfo`  | inbound   | `SceneInit`, `EpisodeStart`  |
//! | `WorldInfo`  | outbound  | `EpisodeReady`, `World`      |
//! | `Write`      | outbound  | `Reward`, `Scene`            |
//! | `Read`       | inbound   | `Control`                    |
//!
//! Payloads are JSON objects tagged with a `"type"` field.

use serde::{Deserialize, Serialize};

use simlink_core::types::{
    ControlCommand, EpisodeBounds, EpisodeReady, RewardValues, SceneSelection, SceneValues,
    WorldInfo,
};

/// Largest payload accepted on any channel (64 MiB).
///
/// Camera images travel base64-encoded, so a reward carrying several
/// full-HD frames stays well below this.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// One of the three independently addressed message paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Scene/episode negotiation in, world description and reset acks out.
    WorldInfo,
    /// Reward and scene values out.
    Write,
    /// Control commands in.
    Read,
}

impl Channel {
    pub const ALL: [Self; 3] = [Self::WorldInfo, Self::Write, Self::Read];

    /// Whether the simulator receives messages on this channel.
    pub const fn is_inbound(self) -> bool {
        matches!(self, Self::WorldInfo | Self::Read)
    }

    /// Whether the simulator sends messages on this channel.
    pub const fn is_outbound(self) -> bool {
        matches!(self, Self::WorldInfo | Self::Write)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::WorldInfo => "world-info",
            Self::Write => "write",
            Self::Read => "read",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// A message from the agent to the simulator.
///
/// # Example
///
/// ```
/// use simlink_server::protocol::Inbound;
///
/// let json = r#"{"type":"scene_init","mode":2,"scene":4}"#;
/// let msg: Inbound = serde_json::from_str(json).unwrap();
/// assert!(matches!(msg, Inbound::SceneInit(sel) if sel.mode == 2 && sel.scene == 4));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// Steering and throttle for the current tick.
    Control(ControlCommand),
    /// Mode and scene to load.
    SceneInit(SceneSelection),
    /// Bounds of the episode to run.
    EpisodeStart(EpisodeBounds),
}

impl Inbound {
    /// Channel this message kind is carried on.
    pub const fn channel(&self) -> Channel {
        self.kind().channel()
    }

    pub const fn kind(&self) -> InboundKind {
        match self {
            Self::Control(_) => InboundKind::Control,
            Self::SceneInit(_) => InboundKind::SceneInit,
            Self::EpisodeStart(_) => InboundKind::EpisodeStart,
        }
    }
}

impl From<ControlCommand> for Inbound {
    fn from(value: ControlCommand) -> Self {
        Self::Control(value)
    }
}

impl From<SceneSelection> for Inbound {
    fn from(value: SceneSelection) -> Self {
        Self::SceneInit(value)
    }
}

impl From<EpisodeBounds> for Inbound {
    fn from(value: EpisodeBounds) -> Self {
        Self::EpisodeStart(value)
    }
}

/// Discriminant of [`Inbound`], used when a poll expects one specific kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundKind {
    Control,
    SceneInit,
    EpisodeStart,
}

impl InboundKind {
    pub const fn channel(self) -> Channel {
        match self {
            Self::Control => Channel::Read,
            Self::SceneInit | Self::EpisodeStart => Channel::WorldInfo,
        }
    }

    /// Serde tag of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::SceneInit => "scene_init",
            Self::EpisodeStart => "episode_start",
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// A message from the simulator to the agent.
///
/// # Example
///
/// ```
/// use simlink_core::types::EpisodeReady;
/// use simlink_server::protocol::Outbound;
///
/// let msg = Outbound::EpisodeReady(EpisodeReady { ready: true });
/// let json = serde_json::to_string(&msg).unwrap();
/// assert_eq!(json, r#"{"type":"episode_ready","ready":true}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// Measurements after a tick.
    Reward(RewardValues),
    /// Description of the loaded scene.
    Scene(SceneValues),
    /// Available modes and scenes.
    World(WorldInfo),
    /// Reset acknowledgment.
    EpisodeReady(EpisodeReady),
}

impl Outbound {
    /// Channel this message kind is carried on.
    pub const fn channel(&self) -> Channel {
        match self {
            Self::Reward(_) | Self::Scene(_) => Channel::Write,
            Self::World(_) | Self::EpisodeReady(_) => Channel::WorldInfo,
        }
    }

    /// Serde tag of the message.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Reward(_) => "reward",
            Self::Scene(_) => "scene",
            Self::World(_) => "world",
            Self::EpisodeReady(_) => "episode_ready",
        }
    }
}

// ---------------------------------------------------------------------------
// ProtocolError
// ---------------------------------------------------------------------------

/// Errors raised while encoding, decoding or framing messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("{got} message is not valid on the {channel} channel")]
    WrongChannel { channel: Channel, got: &'static str },

    #[error("expected {expected} message, got {got}")]
    UnexpectedKind {
        expected: &'static str,
        got: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
