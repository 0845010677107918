use thiserror::Error;

/// Top-level error type for simlink-core.
#[derive(Debug, Error)]
pub enum SimlinkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Port {port} is assigned to both {first} and {second}")]
    DuplicatePort {
        port: u16,
        first: &'static str,
        second: &'static str,
    },

    #[error("{0} must be at least 1")]
    ZeroCount(&'static str),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Rejected mode or scene values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Mode {value} out of range: expected -1 or 0..{count}")]
    ModeOutOfRange { value: i32, count: i32 },

    #[error("Scene {value} out of range: expected -1 or 0..{count}")]
    SceneOutOfRange { value: i32, count: i32 },
}
