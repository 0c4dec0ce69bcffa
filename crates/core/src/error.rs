//! Error types for wave simulation runs
//!
//! Every failure aborts the run. There is no partial-result mode and nothing
//! is retried, so errors only need to carry enough detail to be reported:
//! a category, a stable cause code and a human-readable message.

use std::fmt;
use std::path::PathBuf;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, SimError>;

/// Broad failure category reported alongside every error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad parameters, missing compute device or missing kernel source
    Configuration,
    /// Update kernel failed to compile or validate
    Build,
    /// Device buffer allocation failed or grid exceeds device limits
    Resource,
    /// Dispatch, readback or state machine misuse during the run
    Execution,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configuration => "configuration",
            Self::Build => "build",
            Self::Resource => "resource",
            Self::Execution => "execution",
        };
        f.write_str(name)
    }
}

/// Errors that abort a simulation run
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A parameter failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read or parsed
    #[error("failed to load configuration from {path}: {message}")]
    ConfigFile {
        /// File that was being loaded
        path: PathBuf,
        /// Parser or I/O error text
        message: String,
    },

    /// No compatible compute adapter was found
    #[error("no compatible compute device found")]
    NoDevice,

    /// An adapter exists but the device could not be created
    #[error("compute device '{adapter_name}' failed to initialize: {message}")]
    DeviceInit {
        /// Name of the adapter that failed
        adapter_name: String,
        /// Backend error text
        message: String,
    },

    /// GPU execution was requested but the crate was built without it
    #[error("GPU backend requested but the `gpu` feature is disabled")]
    GpuUnavailable,

    /// External kernel source could not be read
    #[error("failed to read kernel source {path}: {source}")]
    KernelSource {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Kernel compilation or pipeline validation failed
    #[error("update kernel failed to build: {0}")]
    KernelBuild(String),

    /// Device buffer allocation failed
    #[error("failed to allocate {what}: {message}")]
    Allocation {
        /// Which buffer or group of buffers
        what: &'static str,
        /// Backend error text or limit that was exceeded
        message: String,
    },

    /// Dispatching the update kernel failed
    #[error("dispatch failed at step {step}: {message}")]
    Dispatch {
        /// Zero-based step index
        step: usize,
        /// Backend error text
        message: String,
    },

    /// Reading a field back to the host failed
    #[error("readback failed: {0}")]
    Readback(String),

    /// The stepper already executed every configured step
    #[error("simulation already finished after {0} steps")]
    AlreadyDone(usize),
}

impl SimError {
    /// Failure category for reporting
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfig(_)
            | Self::ConfigFile { .. }
            | Self::NoDevice
            | Self::DeviceInit { .. }
            | Self::GpuUnavailable
            | Self::KernelSource { .. } => ErrorCategory::Configuration,
            Self::KernelBuild(_) => ErrorCategory::Build,
            Self::Allocation { .. } => ErrorCategory::Resource,
            Self::Dispatch { .. } | Self::Readback(_) | Self::AlreadyDone(_) => {
                ErrorCategory::Execution
            }
        }
    }

    /// Stable numeric cause code (0 is never used, it means success)
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_) => 1,
            Self::ConfigFile { .. } => 2,
            Self::NoDevice => 3,
            Self::DeviceInit { .. } => 4,
            Self::GpuUnavailable => 5,
            Self::KernelSource { .. } => 6,
            Self::KernelBuild(_) => 7,
            Self::Allocation { .. } => 8,
            Self::Dispatch { .. } => 9,
            Self::Readback(_) => 10,
            Self::AlreadyDone(_) => 11,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
