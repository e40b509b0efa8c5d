//! # Vulkan Bootstrap
//!
//! Opens a window and brings up a Vulkan context in three stages, each a
//! superset of the previous:
//!
//! 1. **Base code**: GLFW window and event loop
//! 2. **Instance creation**: Vulkan instance with the window system's extensions
//! 3. **Physical device**: validation layers, debug messenger and GPU selection
//!
//! ```rust,no_run
//! use vk_bootstrap::{AppConfig, Application, TutorialStage};
//!
//! fn main() -> Result<(), vk_bootstrap::AppError> {
//!     let config = AppConfig::new(TutorialStage::PhysicalDevice);
//!     let mut app = Application::new(config)?;
//!     app.run()
//! }
//! ```

pub mod config;
pub mod logging;
pub mod vulkan;
pub mod window;

mod application;

pub use application::{launch, run_to_completion, AppError, AppResult, Application};
pub use config::{AppConfig, ConfigError, TutorialStage, WindowConfig};
