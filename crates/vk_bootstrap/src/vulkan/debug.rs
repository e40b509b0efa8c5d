//! Validation-layer debug messenger

use super::{instance::VulkanInstance, VulkanError, VulkanResult};
use ash::extensions::ext::DebugUtils;
use ash::vk;
use std::ffi::CStr;

/// Debug utils messenger with RAII cleanup
///
/// Must be dropped before the [`VulkanInstance`] it was created from.
pub struct DebugMessenger {
    debug_utils: DebugUtils,
    messenger: vk::DebugUtilsMessengerEXT,
}

impl DebugMessenger {
    /// Install the validation callback on `instance`
    ///
    /// The instance must have been created with `VK_EXT_debug_utils` enabled.
    pub fn new(instance: &VulkanInstance) -> VulkanResult<Self> {
        let debug_utils = DebugUtils::new(instance.entry(), instance.instance());
        let create_info = messenger_create_info();

        let messenger = unsafe {
            debug_utils
                .create_debug_utils_messenger(&create_info, None)
                .map_err(VulkanError::DebugMessengerSetup)?
        };

        log::debug!("Debug messenger installed");

        Ok(Self {
            debug_utils,
            messenger,
        })
    }
}

impl Drop for DebugMessenger {
    fn drop(&mut self) {
        log::debug!("Destroying debug messenger");
        unsafe {
            self.debug_utils.destroy_debug_utils_messenger(self.messenger, None);
        }
    }
}

/// Messenger settings shared by the persistent messenger and the one chained
/// into instance creation
pub(crate) fn messenger_create_info() -> vk::DebugUtilsMessengerCreateInfoEXT {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback))
        .build()
}

/// Log level used for a validation message of the given severity
pub(crate) fn severity_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::Level::Info
    } else {
        log::Level::Trace
    }
}

/// Debug callback for validation layers
///
/// Always returns `VK_FALSE` so the triggering call is never aborted.
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if callback_data.is_null() || (*callback_data).p_message.is_null() {
        return vk::FALSE;
    }

    let message = CStr::from_ptr((*callback_data).p_message).to_string_lossy();
    log::log!(
        severity_level(message_severity),
        "validation layer: [{:?}] {}",
        message_type,
        message
    );

    vk::FALSE
}
