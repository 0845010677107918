use serde::{Deserialize, Serialize};

/// Sentinel for a mode or scene that has not been negotiated, or whose last
/// negotiation failed.
pub const UNSET_INDEX: i32 = -1;

// ---------------------------------------------------------------------------
// Vectors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

// ---------------------------------------------------------------------------
// Inbound commands
// ---------------------------------------------------------------------------

/// Per-tick driving command sent by the agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    pub steer: f32,
    pub gas: f32,
}

impl ControlCommand {
    /// Value reported when no command could be read. Zero by convention, not
    /// a meaningful reading.
    pub const NONE: Self = Self {
        steer: 0.0,
        gas: 0.0,
    };

    pub const fn new(steer: f32, gas: f32) -> Self {
        Self { steer, gas }
    }
}

/// Mode and scene chosen by the agent during scene negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSelection {
    pub mode: i32,
    pub scene: i32,
}

impl SceneSelection {
    /// Value reported when no selection could be read.
    pub const UNSET: Self = Self {
        mode: UNSET_INDEX,
        scene: UNSET_INDEX,
    };

    pub const fn new(mode: i32, scene: i32) -> Self {
        Self { mode, scene }
    }
}

impl Default for SceneSelection {
    fn default() -> Self {
        Self::UNSET
    }
}

/// Start/end indices of the next episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeBounds {
    pub start_index: u64,
    pub end_index: u64,
}

impl EpisodeBounds {
    /// Value reported when no episode start could be read.
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
    };

    pub const fn new(start_index: u64, end_index: u64) -> Self {
        Self {
            start_index,
            end_index,
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound state
// ---------------------------------------------------------------------------

/// What a camera image encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    Rgb,
    Depth,
    Segmentation,
}

/// A raw camera frame attached to a reward message.
///
/// `data` travels as a base64 string on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraImage {
    pub width: u32,
    pub height: u32,
    pub kind: ImageKind,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

mod base64_bytes {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

impl CameraImage {
    /// Bytes per pixel implied by `kind`.
    pub const fn bytes_per_pixel(&self) -> usize {
        match self.kind {
            ImageKind::Rgb => 3,
            ImageKind::Depth | ImageKind::Segmentation => 1,
        }
    }

    /// Whether `data` has exactly `width * height * bytes_per_pixel` bytes.
    pub fn is_consistent(&self) -> bool {
        self.width as usize * self.height as usize * self.bytes_per_pixel() == self.data.len()
    }
}

/// Measurements of the player vehicle after a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardValues {
    pub player_location: Vector2,
    pub player_orientation: Vector3,
    pub player_acceleration: Vector3,
    /// Forward speed in km/h.
    pub forward_speed: f32,
    pub collision_general: f32,
    pub collision_pedestrian: f32,
    pub collision_car: f32,
    /// Fraction of the vehicle on the opposite lane.
    pub intersect_other_lane: f32,
    /// Fraction of the vehicle off the road.
    pub intersect_offroad: f32,
    /// Wall clock of the simulator host in milliseconds.
    pub platform_timestamp: u64,
    /// Simulated time in milliseconds.
    pub game_timestamp: u64,
    #[serde(default)]
    pub images: Vec<CameraImage>,
}

/// Description of the scene loaded for the negotiated mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneValues {
    /// Spawn points the agent may choose an episode start/end from.
    pub possible_positions: Vec<Vector2>,
    /// One row-major 4x4 projection matrix per camera.
    pub projection_matrices: Vec<[f32; 16]>,
}

impl SceneValues {
    /// Spawn point at `index`, if there is one.
    pub fn position(&self, index: u64) -> Option<Vector2> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.possible_positions.get(i).copied())
    }
}

/// Counts the agent may choose a mode and scene from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldInfo {
    pub modes: i32,
    pub scenes: i32,
}

/// Acknowledges that a reset boundary has been passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeReady {
    pub ready: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
