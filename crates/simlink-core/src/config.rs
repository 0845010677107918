use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "127.0.0.1".into()
}
const fn default_world_port() -> u16 {
    2000
}
const fn default_write_port() -> u16 {
    2001
}
const fn default_read_port() -> u16 {
    2002
}
const fn default_count() -> i32 {
    1
}
const fn default_poll_interval_ms() -> u64 {
    10
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Addresses and session limits for one session controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface the three channels bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// World-info channel port (scene/episode negotiation, world and reset acks).
    #[serde(default = "default_world_port")]
    pub world_port: u16,

    /// Write channel port (reward and scene values).
    #[serde(default = "default_write_port")]
    pub write_port: u16,

    /// Read channel port (control commands).
    #[serde(default = "default_read_port")]
    pub read_port: u16,

    /// Number of selectable modes.
    #[serde(default = "default_count")]
    pub modes_count: i32,

    /// Number of selectable scenes.
    #[serde(default = "default_count")]
    pub scenes_count: i32,

    /// Idle sleep of the transport worker threads in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            world_port: default_world_port(),
            write_port: default_write_port(),
            read_port: default_read_port(),
            modes_count: default_count(),
            scenes_count: default_count(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ServerConfig {
    /// Config for tests: OS-assigned ports on loopback.
    pub fn ephemeral(modes_count: i32, scenes_count: i32) -> Self {
        Self {
            world_port: 0,
            write_port: 0,
            read_port: 0,
            modes_count,
            scenes_count,
            ..Self::default()
        }
    }

    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "host".into(),
                message: "must not be empty".into(),
            });
        }
        if self.modes_count < 1 {
            return Err(ConfigError::ZeroCount("modes_count"));
        }
        if self.scenes_count < 1 {
            return Err(ConfigError::ZeroCount("scenes_count"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms".into(),
                message: "must be > 0".into(),
            });
        }

        // Port 0 asks the OS for a free port and may repeat.
        let ports = [
            ("world_port", self.world_port),
            ("write_port", self.write_port),
            ("read_port", self.read_port),
        ];
        for (i, (first, a)) in ports.iter().enumerate() {
            for (second, b) in &ports[i + 1..] {
                if *a != 0 && a == b {
                    return Err(ConfigError::DuplicatePort {
                        port: *a,
                        first: *first,
                        second: *second,
                    });
                }
            }
        }
        Ok(())
    }

    /// `host:port` of the world-info channel.
    pub fn world_addr(&self) -> String {
        format!("{}:{}", self.host, self.world_port)
    }

    /// `host:port` of the write channel.
    pub fn write_addr(&self) -> String {
        format!("{}:{}", self.host, self.write_port)
    }

    /// `host:port` of the read channel.
    pub fn read_addr(&self) -> String {
        format!("{}:{}", self.host, self.read_port)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
