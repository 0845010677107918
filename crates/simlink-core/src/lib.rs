// simlink-core: Value types, config and errors shared by the simlink session layer.

pub mod config;
pub mod error;
pub mod types;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        config::ServerConfig,
        error::{ConfigError, SimlinkError, ValidationError},
        types::{
            CameraImage, ControlCommand, EpisodeBounds, EpisodeReady, ImageKind, RewardValues,
            SceneSelection, SceneValues, UNSET_INDEX, Vector2, Vector3, WorldInfo,
        },
    };
}
