//! Vulkan context initialization
//!
//! Instance creation with optional validation, the debug messenger, and
//! physical device selection. Each Vulkan handle is owned by a guard that
//! destroys it on drop.

pub mod debug;
pub mod device;
pub mod instance;

pub use debug::DebugMessenger;
pub use device::{pick_physical_device, DeviceEnumerator, PhysicalDeviceSelection, QueueFamilyIndices};
pub use instance::{
    create_instance, missing_layers, required_extensions, InstanceDescription, InstanceLoader,
    VulkanInstance,
};

use ash::vk;
use std::os::raw::c_char;
use thiserror::Error;

/// Vulkan-specific error types
#[derive(Error, Debug)]
pub enum VulkanError {
    /// The Vulkan loader library could not be found or loaded
    #[error("failed to load Vulkan: {0}")]
    LoaderUnavailable(String),

    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// Validation was requested but some layers are not installed
    #[error("validation layers requested, but not available: {missing:?}")]
    ValidationLayersUnavailable {
        /// Requested layers the host does not provide
        missing: Vec<String>,
    },

    /// `vkCreateInstance` failed
    #[error("failed to create instance: {0:?}")]
    InstanceCreation(vk::Result),

    /// The debug messenger could not be installed
    #[error("failed to set up debug messenger: {0:?}")]
    DebugMessengerSetup(vk::Result),

    /// The instance exposes no physical devices at all
    #[error("failed to find GPUs with Vulkan support")]
    NoPhysicalDevices,

    /// No physical device has a graphics-capable queue family
    #[error("failed to find a suitable GPU")]
    NoSuitableDevice,

    /// A name passed to Vulkan contained an interior NUL byte
    #[error("invalid name for Vulkan: {0}")]
    InvalidName(#[from] std::ffi::NulError),
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;

/// Decode a fixed-size, NUL-terminated name field from a Vulkan struct
pub(crate) fn name_from_raw(raw: &[c_char]) -> String {
    let bytes: Vec<u8> = raw
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Test helper: write `name` into a fixed-size Vulkan name field
#[cfg(test)]
pub(crate) fn fill_raw_name(dst: &mut [c_char], name: &str) {
    for (slot, byte) in dst.iter_mut().zip(name.bytes()) {
        *slot = byte as c_char;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_raw_stops_at_nul() {
        let mut raw = [0 as c_char; 16];
        fill_raw_name(&mut raw, "GPU 0");
        assert_eq!(name_from_raw(&raw), "GPU 0");
    }

    #[test]
    fn test_name_from_raw_without_terminator() {
        let mut raw = [0 as c_char; 4];
        fill_raw_name(&mut raw, "ABCDEFG");
        assert_eq!(name_from_raw(&raw), "ABCD");
    }
}
