//! Configuration for the bootstrap application
//!
//! Everything the tutorial used to keep in globals (window size, layer names,
//! the debug-build validation switch) lives in [`AppConfig`], which is passed
//! explicitly to [`Application::new`](crate::Application::new).

use std::fmt;

/// Name of the Khronos validation layer enabled in debug builds
pub const KHRONOS_VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Configuration values that cannot be used to start the application
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How far through the bootstrap sequence the application goes
///
/// Each stage is a strict superset of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TutorialStage {
    /// Window and event loop only
    BaseCode,
    /// Adds a Vulkan instance with the platform-required extensions
    InstanceCreation,
    /// Adds validation layers, the debug messenger and physical device selection
    PhysicalDevice,
}

impl TutorialStage {
    /// Whether this stage creates a Vulkan instance
    pub fn creates_instance(self) -> bool {
        self >= Self::InstanceCreation
    }

    /// Whether this stage wires up validation layers and picks a GPU
    pub fn selects_device(self) -> bool {
        self >= Self::PhysicalDevice
    }
}

impl fmt::Display for TutorialStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BaseCode => "base code",
            Self::InstanceCreation => "instance creation",
            Self::PhysicalDevice => "physical device selection",
        };
        f.write_str(name)
    }
}

/// Window creation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    /// Client area width in pixels
    pub width: u32,
    /// Client area height in pixels
    pub height: u32,
    /// Title bar text
    pub title: String,
    /// Whether the user may resize the window
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Vulkan".to_string(),
            resizable: false,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Application name reported to the Vulkan driver
    pub application_name: String,
    /// Engine name reported to the Vulkan driver
    pub engine_name: String,
    /// Application and engine version (major, minor, patch)
    pub application_version: (u32, u32, u32),
    /// Window parameters
    pub window: WindowConfig,
    /// Whether to enable Vulkan validation layers; `None` follows the build type
    pub enable_validation: Option<bool>,
    /// Instance layers requested when validation is enabled
    pub validation_layers: Vec<String>,
    /// Bootstrap stage to run
    pub stage: TutorialStage,
    /// Default log filter (`RUST_LOG` overrides it)
    pub log_level: String,
}

impl AppConfig {
    /// Create a configuration with tutorial defaults for the given stage
    pub fn new(stage: TutorialStage) -> Self {
        Self {
            application_name: "Hello Triangle".to_string(),
            engine_name: "No Engine".to_string(),
            application_version: (1, 0, 0),
            window: WindowConfig::default(),
            enable_validation: None,
            validation_layers: vec![KHRONOS_VALIDATION_LAYER.to_string()],
            stage,
            log_level: "info".to_string(),
        }
    }

    /// Set the application name
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    /// Set custom window parameters
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Enable or disable validation layers
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = Some(enabled);
        self
    }

    /// Replace the requested validation layers
    pub fn with_validation_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validation_layers = layers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the bootstrap stage
    pub fn with_stage(mut self, stage: TutorialStage) -> Self {
        self.stage = stage;
        self
    }

    /// Whether validation layers will actually be requested
    ///
    /// Only the physical device stage sets up diagnostics; earlier stages
    /// never request layers.
    pub fn validation_enabled(&self) -> bool {
        self.stage.selects_device()
            && self.enable_validation.unwrap_or(cfg!(debug_assertions))
    }

    /// Log filter parsed from `log_level`, falling back to `Info`
    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application_name.is_empty() {
            return Err(ConfigError::Invalid("application name cannot be empty".to_string()));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }

        let names = [&self.application_name, &self.engine_name, &self.window.title];
        if let Some(name) = names
            .into_iter()
            .chain(self.validation_layers.iter())
            .find(|n| n.contains('\0'))
        {
            return Err(ConfigError::Invalid(format!("name contains a NUL byte: {name:?}")));
        }

        if self.validation_layers.iter().any(String::is_empty) {
            return Err(ConfigError::Invalid("validation layer names cannot be empty".to_string()));
        }

        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Invalid(format!("unknown log level: {}", self.log_level)));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(TutorialStage::PhysicalDevice)
    }
}
