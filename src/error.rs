use std::io;
use thiserror::Error;

/// Error type for the pulse sampling engine
#[derive(Error, Debug)]
pub enum PulseError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// An OS counter query returned a failure code
    #[error("Counter query failed: {0}")]
    SyscallFailure(String),

    /// A subsystem (thermal notifications, accelerator registry) cannot be used
    #[error("Subsystem unavailable: {0}")]
    UnavailableSubsystem(String),

    /// Per-core counter array length differs from the known topology
    #[error("Core topology mismatch: expected {expected} cores, got {actual}")]
    TopologyMismatch { expected: usize, actual: usize },

    #[error("GPU not available: {0}")]
    GpuNotAvailable(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the pulse engine
pub type Result<T> = std::result::Result<T, PulseError>;

impl PulseError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PulseError::Config(msg.into())
    }

    /// Create a counter query failure
    pub fn syscall<S: Into<String>>(msg: S) -> Self {
        PulseError::SyscallFailure(msg.into())
    }

    /// Create an unavailable subsystem error
    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        PulseError::UnavailableSubsystem(msg.into())
    }

    pub fn topology_mismatch(expected: usize, actual: usize) -> Self {
        PulseError::TopologyMismatch { expected, actual }
    }

    pub fn gpu_not_available<S: Into<String>>(msg: S) -> Self {
        PulseError::GpuNotAvailable(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PulseError::Other(msg.into())
    }
}
