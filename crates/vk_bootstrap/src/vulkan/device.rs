//! Physical device selection

use super::{name_from_raw, VulkanError, VulkanResult};
use ash::{vk, Instance};

/// Queue families a device must expose to be usable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// Index of a queue family supporting graphics submission
    pub graphics_family: Option<u32>,
}

impl QueueFamilyIndices {
    /// Locate the required families among a device's queue families
    ///
    /// Takes the first graphics-capable family and stops once every
    /// required family is known.
    pub fn find(queue_families: &[vk::QueueFamilyProperties]) -> Self {
        let mut indices = Self::default();

        for (index, family) in queue_families.iter().enumerate() {
            if family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
                indices.graphics_family = Some(index as u32);
            }

            if indices.is_complete() {
                break;
            }
        }

        indices
    }

    /// Whether every required queue family was found
    pub fn is_complete(&self) -> bool {
        self.graphics_family.is_some()
    }
}

/// Read-only view of the physical devices behind an instance
///
/// Implemented by [`ash::Instance`]; the selection logic only depends on
/// this trait.
pub trait DeviceEnumerator {
    /// All physical devices, in driver enumeration order
    fn physical_devices(&self) -> VulkanResult<Vec<vk::PhysicalDevice>>;

    /// Queue families exposed by `device`
    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties>;

    /// Properties (name, type, limits) of `device`
    fn properties(&self, device: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties;
}

impl DeviceEnumerator for Instance {
    fn physical_devices(&self) -> VulkanResult<Vec<vk::PhysicalDevice>> {
        unsafe { self.enumerate_physical_devices() }.map_err(VulkanError::Api)
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        unsafe { self.get_physical_device_queue_family_properties(device) }
    }

    fn properties(&self, device: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties {
        unsafe { self.get_physical_device_properties(device) }
    }
}

/// The GPU chosen for the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalDeviceSelection {
    /// Vulkan physical device handle
    pub device: vk::PhysicalDevice,
    /// Position of the device in enumeration order
    pub enumeration_index: usize,
    /// Driver-reported device name
    pub name: String,
    /// Integrated, discrete, virtual, ...
    pub device_type: vk::PhysicalDeviceType,
    /// Queue families found on the device; always complete
    pub queue_families: QueueFamilyIndices,
}

/// Pick the first device, in enumeration order, with a graphics queue family
pub fn pick_physical_device<E: DeviceEnumerator + ?Sized>(
    enumerator: &E,
) -> VulkanResult<PhysicalDeviceSelection> {
    let devices = enumerator.physical_devices()?;

    if devices.is_empty() {
        return Err(VulkanError::NoPhysicalDevices);
    }

    log::debug!("Found {} physical device(s)", devices.len());

    for (enumeration_index, device) in devices.into_iter().enumerate() {
        let queue_families = QueueFamilyIndices::find(&enumerator.queue_families(device));
        let properties = enumerator.properties(device);
        let name = name_from_raw(&properties.device_name);

        if !queue_families.is_complete() {
            log::debug!("Skipping {name}: no graphics queue family");
            continue;
        }

        log::info!("Selected GPU: {name} ({:?})", properties.device_type);
        return Ok(PhysicalDeviceSelection {
            device,
            enumeration_index,
            name,
            device_type: properties.device_type,
            queue_families,
        });
    }

    Err(VulkanError::NoSuitableDevice)
}
