//! Graphics resources owned by windows
//!
//! Icons and fonts are native objects with their own release call. A
//! [`ResourceHandle`] owns one of them and releases it exactly once when
//! dropped. [`Icon`] and [`Font`] are the value types the rest of the crate
//! passes around: empty by default, movable, and explicitly duplicated with
//! `try_clone` since duplicating a native resource can fail.

pub mod handle;
pub mod value;

pub use handle::{ResourceBackend, ResourceHandle};
pub use value::{Font, FontClass, Icon, IconClass, Resource, ResourceClass};

use std::fmt;

use thiserror::Error;

use crate::platform::PlatformError;

/// Kind of native graphics resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Window or taskbar icon
    Icon,
    /// Text font
    Font,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Icon => write!(f, "icon"),
            Self::Font => write!(f, "font"),
        }
    }
}

/// Stock resource names understood by every platform
pub mod stock {
    /// Default application icon
    pub const APPLICATION_ICON: &str = "application";
    /// Default GUI font
    pub const DEFAULT_GUI_FONT: &str = "default_gui";
}

/// A resource could not be loaded or duplicated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to acquire {kind} `{name}`: {source}")]
pub struct ResourceAcquisitionError {
    /// Kind of the resource
    pub kind: ResourceKind,
    /// Stock name, or a description of the duplicated resource
    pub name: String,
    /// Platform failure
    #[source]
    pub source: PlatformError,
}
