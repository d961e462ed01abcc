use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolleyError {
    #[error("store unavailable at {}: {reason}", .path.display())]
    StoreUnavailable { path: PathBuf, reason: String },

    #[error("launcher device not found for slot {0}")]
    DeviceNotFound(usize),

    #[error("launcher not registered: {0}")]
    LauncherNotFound(u32),

    #[error("actuation fault: {0}")]
    ActuationFault(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("module '{0}' is locked: unlock it first")]
    ModuleLocked(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VolleyError>;
