//! Application lifecycle: init window, init Vulkan, main loop, teardown

use crate::config::{AppConfig, ConfigError};
use crate::vulkan::{
    pick_physical_device, DebugMessenger, InstanceDescription, PhysicalDeviceSelection,
    VulkanError, VulkanInstance,
};
use crate::window::{run_event_loop, Window, WindowError};
use std::process::ExitCode;
use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Window-system failure
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// Vulkan initialization failure
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] VulkanError),
}

/// Result type for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Owns every handle acquired during startup
///
/// Fields drop in declaration order, which is the reverse of acquisition:
/// debug messenger, instance, window (and with it the GLFW library).
pub struct Application {
    debug_messenger: Option<DebugMessenger>,
    physical_device: Option<PhysicalDeviceSelection>,
    instance: Option<VulkanInstance>,
    window: Window,
    config: AppConfig,
}

impl Application {
    /// Run startup up to the configured stage
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        log::info!("Initializing {} stage", config.stage);

        let window = Window::new(&config.window)?;

        if !config.stage.creates_instance() {
            return Ok(Self {
                debug_messenger: None,
                physical_device: None,
                instance: None,
                window,
                config,
            });
        }

        let description = InstanceDescription::from_config(&config, &window.required_instance_extensions()?);
        let instance = VulkanInstance::new(&description)?;

        if !config.stage.selects_device() {
            return Ok(Self {
                debug_messenger: None,
                physical_device: None,
                instance: Some(instance),
                window,
                config,
            });
        }

        let debug_messenger = if description.validation_enabled() {
            Some(DebugMessenger::new(&instance)?)
        } else {
            None
        };

        let physical_device = pick_physical_device(instance.instance())?;
        log::debug!(
            "Using physical device {:?} (graphics queue family {:?})",
            physical_device.device,
            physical_device.queue_families.graphics_family
        );

        Ok(Self {
            debug_messenger,
            physical_device: Some(physical_device),
            instance: Some(instance),
            window,
            config,
        })
    }

    /// Poll window events until a close is requested
    pub fn run(&mut self) -> AppResult<()> {
        log::info!("Entering main loop");
        let polls = run_event_loop(&mut self.window);
        log::debug!("Main loop exited after {polls} poll(s)");
        Ok(())
    }

    /// The window
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// The Vulkan instance, if this stage creates one
    pub fn instance(&self) -> Option<&VulkanInstance> {
        self.instance.as_ref()
    }

    /// The selected GPU, if this stage selects one
    pub fn physical_device(&self) -> Option<&PhysicalDeviceSelection> {
        self.physical_device.as_ref()
    }

    /// Whether the validation debug messenger is installed
    pub fn has_debug_messenger(&self) -> bool {
        self.debug_messenger.is_some()
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        log::debug!("Tearing down {} stage", self.config.stage);
    }
}

/// Start the application, run its main loop and tear it down
pub fn run_to_completion(config: AppConfig) -> AppResult<()> {
    let mut app = Application::new(config)?;
    app.run()
}

/// Set up logging, run the application and map the outcome to an exit code
///
/// Fatal errors are written to stderr.
pub fn launch(config: AppConfig) -> ExitCode {
    crate::logging::init(config.log_filter());

    log::info!("Starting {}", config.application_name);

    match run_to_completion(config) {
        Ok(()) => {
            log::info!("Shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Application error: {e}");
            ExitCode::FAILURE
        }
    }
}
