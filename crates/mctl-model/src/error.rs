use thiserror::Error;

/// Malformed value for one repeatable command-line option.
///
/// Every variant carries the raw input so the operator sees exactly which occurrence was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("bad network mode: {0} (expected one of: host, bridge, none, user)")]
    InvalidNetworkMode(String),

    #[error("bad port mapping: {0} (expected HOST:CONTAINER[/tcp|udp])")]
    InvalidPortMapping(String),

    #[error("bad volume: {0} (expected HOST:CONTAINER[:ro|rw])")]
    InvalidVolume(String),

    #[error("bad docker parameter: {0} (expected KEY=VALUE)")]
    InvalidParameter(String),

    #[error("bad environment variable: {0} (expected NAME=VALUE)")]
    InvalidEnvVar(String),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no command given for a non-container task")]
    MissingCommand,

    #[error("docker container requested without an image")]
    MissingImage,

    #[error("nothing to run: provide a command, an image or a task file")]
    MissingEntrypoint,

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
