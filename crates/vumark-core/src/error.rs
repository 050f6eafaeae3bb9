//! Error types for the AR session

use std::path::PathBuf;

use thiserror::Error;

use crate::SessionState;

/// Session errors
#[derive(Error, Debug)]
pub enum ArError {
    // Lifecycle errors
    #[error("Invalid session transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },

    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Camera permission request cancelled")]
    PermissionCancelled,

    #[error("Engine initialization failed: {0}")]
    InitFailed(String),

    #[error("Engine failed to start tracking")]
    StartFailed,

    // Rendering errors
    #[error("Failed to create native video texture (code {0})")]
    VideoTexture(i32),

    #[error("Failed to load texture {path:?}: {source}")]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture buffer size mismatch: expected {expected}, got {actual}")]
    TextureSize { expected: usize, actual: usize },

    // Configuration errors
    #[error("Config I/O error on {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    // Execution errors
    #[error("Background worker error: {0}")]
    Worker(String),
}

/// Result type for session operations
pub type ArResult<T> = Result<T, ArError>;
