//! Configuration system
//!
//! [`Config`] loads and saves any serde type as TOML or RON, chosen by file
//! extension. [`ShellConfig`] is the configuration of an application shell:
//! logging level, contract policy and the main window's geometry.

pub use serde::{Deserialize, Serialize};

use crate::foundation::{Margins, Point, Size};
use crate::window::{ContractPolicy, WindowConfig};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Load configuration from file, falling back to defaults when it is missing
    fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        match Self::load_from_file(path) {
            Err(ConfigError::Io(error)) if error.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No configuration at {path}, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that parse but make no sense
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main window settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainWindowConfig {
    /// Window title
    pub title: String,
    /// Initial position on screen
    pub position: Point,
    /// Initial size
    pub size: Size,
    /// Gap between the client area and the content
    pub content_margins: Margins,
    /// Gap between stacked items
    pub content_spacing: i32,
}

impl Default for MainWindowConfig {
    fn default() -> Self {
        Self {
            title: "Browser".to_string(),
            position: Point::new(100, 100),
            size: Size::new(640, 480),
            content_margins: Margins::uniform(8),
            content_spacing: 4,
        }
    }
}

impl MainWindowConfig {
    /// Window creation parameters for a top-level window of `class_name`
    pub fn to_window_config(&self, class_name: &str) -> WindowConfig {
        WindowConfig::new(class_name)
            .with_title(self.title.clone())
            .with_position(self.position)
            .with_size(self.size)
    }
}

/// Configuration of an application shell
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Behaviour on API contract violations
    pub contracts: ContractPolicy,
    /// Main window settings
    pub main_window: MainWindowConfig,
}

impl ShellConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the main window title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.main_window.title = title.into();
        self
    }

    /// Set the contract policy
    pub fn with_contracts(mut self, contracts: ContractPolicy) -> Self {
        self.contracts = contracts;
        self
    }

    /// Reject values the window system would refuse later
    pub fn validate(&self) -> Result<(), ConfigError> {
        let window = &self.main_window;
        if !window.content_margins.is_non_negative() {
            return Err(ConfigError::Invalid(format!(
                "content margins must be non-negative, got {:?}",
                window.content_margins
            )));
        }
        if window.content_spacing < 0 {
            return Err(ConfigError::Invalid(format!(
                "content spacing must be non-negative, got {}",
                window.content_spacing
            )));
        }
        if window.size.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "main window size must be positive, got {:?}",
                window.size
            )));
        }
        Ok(())
    }
}

impl Config for ShellConfig {}
