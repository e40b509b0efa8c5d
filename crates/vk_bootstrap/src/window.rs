//! Window management using GLFW
//!
//! Provides window creation and the polling main loop. The loop only talks to
//! the [`WindowBackend`] trait so it can run against something other than a
//! real GLFW window.

use crate::config::WindowConfig;
use glfw::{Action, Key, WindowEvent};
use thiserror::Error;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// The GLFW library could not be initialized
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    /// GLFW refused to create the window
    #[error("Window creation failed")]
    CreationFailed,

    /// Any other GLFW failure
    #[error("GLFW error: {0}")]
    GlfwError(String),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// The subset of window-system behaviour the main loop depends on
pub trait WindowBackend {
    /// Whether a close has been requested (by the user or the application)
    fn should_close(&self) -> bool;

    /// Request or cancel closing the window
    fn set_should_close(&mut self, should_close: bool);

    /// Process pending window-system events
    fn poll_events(&mut self);

    /// Take the events received since the last call
    fn drain_events(&mut self) -> Vec<WindowEvent>;
}

/// GLFW window wrapper
///
/// Field order matters: the window is destroyed before the last `Glfw`
/// handle is dropped, which terminates the library.
pub struct Window {
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, WindowEvent)>,
    glfw: glfw::Glfw,
}

impl Window {
    /// Initialize GLFW and open a window without a client API
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        // Errors after init are only logged; fatal ones surface below as WindowError
        let mut glfw = glfw::init(glfw::log_errors)
            .map_err(|e| WindowError::InitializationFailed(format!("{e:?}")))?;

        // Vulkan manages presentation itself; no OpenGL context
        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(config.resizable));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.set_key_polling(true);
        window.set_close_polling(true);

        log::info!("Created {}x{} window \"{}\"", config.width, config.height, config.title);

        Ok(Self {
            window,
            events,
            glfw,
        })
    }

    /// Current client area size in pixels
    pub fn size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    /// Get required Vulkan instance extensions from GLFW
    pub fn required_instance_extensions(&self) -> WindowResult<Vec<String>> {
        if !self.glfw.vulkan_supported() {
            return Err(WindowError::GlfwError("Vulkan is not supported by GLFW on this host".to_string()));
        }

        self.glfw
            .get_required_instance_extensions()
            .ok_or_else(|| WindowError::GlfwError("Failed to get required extensions".to_string()))
    }
}

impl WindowBackend for Window {
    fn should_close(&self) -> bool {
        self.window.should_close()
    }

    fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    fn poll_events(&mut self) {
        self.glfw.poll_events();
    }

    fn drain_events(&mut self) -> Vec<WindowEvent> {
        glfw::flush_messages(&self.events).map(|(_, event)| event).collect()
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        log::debug!("Destroying window");
    }
}

/// Poll the window until a close is requested
///
/// The close flag is checked before every poll, so the loop exits within one
/// cycle of the flag being set. Escape requests a close. Returns the number of
/// polls performed.
pub fn run_event_loop<B: WindowBackend + ?Sized>(backend: &mut B) -> u64 {
    let mut polls = 0;

    while !backend.should_close() {
        backend.poll_events();
        polls += 1;

        for event in backend.drain_events() {
            if let WindowEvent::Key(Key::Escape, _, Action::Press, _) = event {
                backend.set_should_close(true);
            }
        }
    }

    polls
}
