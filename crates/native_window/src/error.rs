//! Crate-level error type

use thiserror::Error;

use crate::config::ConfigError;
use crate::layout::LayoutError;
use crate::platform::PlatformError;
use crate::resources::ResourceAcquisitionError;
use crate::window::{ContractViolation, WindowCreationError};

/// Any failure an application shell can run into
#[derive(Error, Debug)]
pub enum ShellError {
    /// Window creation failed
    #[error("Window creation error: {0}")]
    WindowCreation(#[from] WindowCreationError),

    /// An API contract was broken
    #[error("Contract violation: {0}")]
    Contract(#[from] ContractViolation),

    /// A resource could not be acquired
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceAcquisitionError),

    /// A layout operation failed
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// The platform failed
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type using [`ShellError`]
pub type ShellResult<T> = Result<T, ShellError>;
