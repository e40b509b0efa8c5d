//! Vulkan instance creation

use super::{debug, name_from_raw, VulkanError, VulkanResult};
use crate::config::AppConfig;
use ash::extensions::ext::DebugUtils;
use ash::{vk, Entry, Instance};
use std::ffi::CString;
use std::os::raw::c_char;

/// Source of instance layers and instance creation
///
/// Implemented by [`ash::Entry`]; the indirection lets the layer check be
/// exercised without a Vulkan driver.
pub trait InstanceLoader {
    /// Handle produced by a successful instance creation
    type Instance;

    /// Instance layers installed on the host
    fn available_layers(&self) -> VulkanResult<Vec<vk::LayerProperties>>;

    /// Call `vkCreateInstance`
    ///
    /// # Safety
    /// Every pointer reachable from `create_info` must be valid for the
    /// duration of the call.
    unsafe fn create(&self, create_info: &vk::InstanceCreateInfo) -> VulkanResult<Self::Instance>;
}

impl InstanceLoader for Entry {
    type Instance = Instance;

    fn available_layers(&self) -> VulkanResult<Vec<vk::LayerProperties>> {
        self.enumerate_instance_layer_properties()
            .map_err(VulkanError::Api)
    }

    unsafe fn create(&self, create_info: &vk::InstanceCreateInfo) -> VulkanResult<Instance> {
        self.create_instance(create_info, None)
            .map_err(VulkanError::InstanceCreation)
    }
}

/// Everything needed to describe the instance to the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDescription {
    /// Application name
    pub application_name: String,
    /// Engine name
    pub engine_name: String,
    /// Application and engine version (major, minor, patch)
    pub version: (u32, u32, u32),
    /// Extensions to enable
    pub extensions: Vec<String>,
    /// Layers to enable; empty when validation is off
    pub layers: Vec<String>,
    /// Whether the layer check, the chained messenger info and the debug
    /// messenger are set up
    pub validation: bool,
}

impl InstanceDescription {
    /// Build the description for `config` given the window system's extensions
    pub fn from_config(config: &AppConfig, platform_extensions: &[String]) -> Self {
        let validation = config.validation_enabled();

        Self {
            application_name: config.application_name.clone(),
            engine_name: config.engine_name.clone(),
            version: config.application_version,
            extensions: required_extensions(platform_extensions, validation),
            layers: if validation {
                config.validation_layers.clone()
            } else {
                Vec::new()
            },
            validation,
        }
    }

    /// Whether validation layers and the debug messenger are requested
    pub fn validation_enabled(&self) -> bool {
        self.validation
    }
}

/// Platform-required extensions plus `VK_EXT_debug_utils` when validating
pub fn required_extensions(platform_extensions: &[String], enable_validation: bool) -> Vec<String> {
    let mut extensions = platform_extensions.to_vec();

    if enable_validation {
        let debug_utils = DebugUtils::name().to_string_lossy().into_owned();
        if !extensions.contains(&debug_utils) {
            extensions.push(debug_utils);
        }
    }

    extensions
}

/// Requested layers that do not appear in `available`
pub fn missing_layers(available: &[vk::LayerProperties], requested: &[String]) -> Vec<String> {
    let available: Vec<String> = available
        .iter()
        .map(|layer| name_from_raw(&layer.layer_name))
        .collect();

    requested
        .iter()
        .filter(|name| !available.contains(name))
        .cloned()
        .collect()
}

/// Create an instance through `loader`
///
/// When validation is requested the layers are checked first and nothing is
/// created if any is missing. The debug messenger settings are chained into
/// the create info so instance creation and destruction are validated too.
pub fn create_instance<L: InstanceLoader + ?Sized>(
    loader: &L,
    description: &InstanceDescription,
) -> VulkanResult<L::Instance> {
    if description.validation_enabled() {
        let missing = missing_layers(&loader.available_layers()?, &description.layers);
        if !missing.is_empty() {
            return Err(VulkanError::ValidationLayersUnavailable { missing });
        }
    }

    let app_name = CString::new(description.application_name.as_str())?;
    let engine_name = CString::new(description.engine_name.as_str())?;
    let (major, minor, patch) = description.version;
    let app_info = vk::ApplicationInfo::builder()
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, major, minor, patch))
        .engine_name(&engine_name)
        .engine_version(vk::make_api_version(0, major, minor, patch))
        .api_version(vk::API_VERSION_1_0);

    let extension_names = to_cstrings(&description.extensions)?;
    let extension_ptrs = as_ptrs(&extension_names);
    let layer_names = to_cstrings(&description.layers)?;
    let layer_ptrs = as_ptrs(&layer_names);

    let mut debug_info = debug::messenger_create_info();
    let mut create_info = vk::InstanceCreateInfo::builder()
        .application_info(&app_info)
        .enabled_extension_names(&extension_ptrs)
        .enabled_layer_names(&layer_ptrs);

    if description.validation_enabled() {
        create_info = create_info.push_next(&mut debug_info);
    }

    log::debug!(
        "Creating instance with extensions {:?} and layers {:?}",
        description.extensions,
        description.layers
    );

    unsafe { loader.create(&create_info) }
}

fn to_cstrings(names: &[String]) -> VulkanResult<Vec<CString>> {
    names
        .iter()
        .map(|name| CString::new(name.as_str()).map_err(VulkanError::from))
        .collect()
}

fn as_ptrs(names: &[CString]) -> Vec<*const c_char> {
    names.iter().map(|name| name.as_ptr()).collect()
}

/// Vulkan instance wrapper with RAII cleanup
pub struct VulkanInstance {
    entry: Entry,
    instance: Instance,
}

impl VulkanInstance {
    /// Load the Vulkan library and create an instance
    pub fn new(description: &InstanceDescription) -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| VulkanError::LoaderUnavailable(e.to_string()))?;

        let instance = create_instance(&entry, description)?;

        log::info!(
            "Created Vulkan instance for \"{}\" (validation {})",
            description.application_name,
            if description.validation_enabled() { "on" } else { "off" }
        );

        Ok(Self { entry, instance })
    }

    /// Vulkan entry point
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Vulkan instance handle
    pub fn instance(&self) -> &Instance {
        &self.instance
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        log::debug!("Destroying Vulkan instance");
        unsafe {
            self.instance.destroy_instance(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TutorialStage, KHRONOS_VALIDATION_LAYER};
    use crate::vulkan::fill_raw_name;
    use std::cell::{Cell, RefCell};
    use std::ffi::CStr;

    /// What the mock saw when asked to create an instance
    #[derive(Debug, Default)]
    struct CreateCall {
        extensions: Vec<String>,
        layers: Vec<String>,
        chained_debug_info: bool,
        application_name: String,
    }

    struct MockLoader {
        layers: Vec<&'static str>,
        result: vk::Result,
        create_calls: Cell<usize>,
        last_call: RefCell<Option<CreateCall>>,
    }

    impl MockLoader {
        fn with_layers(layers: Vec<&'static str>) -> Self {
            Self {
                layers,
                result: vk::Result::SUCCESS,
                create_calls: Cell::new(0),
                last_call: RefCell::new(None),
            }
        }
    }

    unsafe fn read_names(ptrs: *const *const c_char, count: u32) -> Vec<String> {
        (0..count as usize)
            .map(|i| CStr::from_ptr(*ptrs.add(i)).to_string_lossy().into_owned())
            .collect()
    }

    impl InstanceLoader for MockLoader {
        type Instance = ();

        fn available_layers(&self) -> VulkanResult<Vec<vk::LayerProperties>> {
            Ok(self
                .layers
                .iter()
                .map(|name| {
                    let mut props = vk::LayerProperties::default();
                    fill_raw_name(&mut props.layer_name, name);
                    props
                })
                .collect())
        }

        unsafe fn create(&self, create_info: &vk::InstanceCreateInfo) -> VulkanResult<()> {
            self.create_calls.set(self.create_calls.get() + 1);

            let app_info = &*create_info.p_application_info;
            *self.last_call.borrow_mut() = Some(CreateCall {
                extensions: read_names(
                    create_info.pp_enabled_extension_names,
                    create_info.enabled_extension_count,
                ),
                layers: read_names(create_info.pp_enabled_layer_names, create_info.enabled_layer_count),
                chained_debug_info: !create_info.p_next.is_null(),
                application_name: CStr::from_ptr(app_info.p_application_name)
                    .to_string_lossy()
                    .into_owned(),
            });

            if self.result == vk::Result::SUCCESS {
                Ok(())
            } else {
                Err(VulkanError::InstanceCreation(self.result))
            }
        }
    }

    fn description(validation: bool) -> InstanceDescription {
        let config = AppConfig::new(TutorialStage::PhysicalDevice).with_validation(validation);
        InstanceDescription::from_config(&config, &["VK_KHR_surface".to_string()])
    }

    #[test]
    fn test_required_extensions_adds_debug_utils_only_when_validating() {
        let platform = vec!["VK_KHR_surface".to_string(), "VK_KHR_xcb_surface".to_string()];

        assert_eq!(required_extensions(&platform, false), platform);

        let with_debug = required_extensions(&platform, true);
        assert_eq!(with_debug.len(), 3);
        assert_eq!(with_debug[2], "VK_EXT_debug_utils");
    }

    #[test]
    fn test_missing_layers() {
        let loader = MockLoader::with_layers(vec!["VK_LAYER_LUNARG_api_dump", KHRONOS_VALIDATION_LAYER]);
        let available = loader.available_layers().unwrap();

        assert!(missing_layers(&available, &[KHRONOS_VALIDATION_LAYER.to_string()]).is_empty());
        assert_eq!(
            missing_layers(&available, &["VK_LAYER_missing".to_string()]),
            vec!["VK_LAYER_missing".to_string()]
        );
    }

    #[test]
    fn test_missing_layer_fails_before_instance_creation() {
        let loader = MockLoader::with_layers(vec!["VK_LAYER_LUNARG_api_dump"]);

        let result = create_instance(&loader, &description(true));

        match result {
            Err(VulkanError::ValidationLayersUnavailable { missing }) => {
                assert_eq!(missing, vec![KHRONOS_VALIDATION_LAYER.to_string()]);
            }
            other => panic!("expected missing layer error, got {other:?}"),
        }
        assert_eq!(loader.create_calls.get(), 0);
    }

    #[test]
    fn test_validation_enables_layers_and_chains_messenger() {
        let loader = MockLoader::with_layers(vec![KHRONOS_VALIDATION_LAYER]);

        create_instance(&loader, &description(true)).unwrap();

        let call = loader.last_call.borrow_mut().take().unwrap();
        assert_eq!(loader.create_calls.get(), 1);
        assert_eq!(call.layers, vec![KHRONOS_VALIDATION_LAYER.to_string()]);
        assert_eq!(call.extensions, vec!["VK_KHR_surface".to_string(), "VK_EXT_debug_utils".to_string()]);
        assert!(call.chained_debug_info);
        assert_eq!(call.application_name, "Hello Triangle");
    }

    #[test]
    fn test_without_validation_no_layers_are_needed() {
        // No layers installed at all; must still succeed
        let loader = MockLoader::with_layers(Vec::new());

        create_instance(&loader, &description(false)).unwrap();

        let call = loader.last_call.borrow_mut().take().unwrap();
        assert!(call.layers.is_empty());
        assert_eq!(call.extensions, vec!["VK_KHR_surface".to_string()]);
        assert!(!call.chained_debug_info);
    }

    #[test]
    fn test_validation_without_layers_still_chains_messenger() {
        let config = AppConfig::new(TutorialStage::PhysicalDevice)
            .with_validation(true)
            .with_validation_layers(Vec::<String>::new());
        let description = InstanceDescription::from_config(&config, &["VK_KHR_surface".to_string()]);
        assert!(description.validation_enabled());

        let loader = MockLoader::with_layers(Vec::new());
        create_instance(&loader, &description).unwrap();

        let call = loader.last_call.borrow_mut().take().unwrap();
        assert!(call.layers.is_empty());
        assert_eq!(call.extensions, vec!["VK_KHR_surface".to_string(), "VK_EXT_debug_utils".to_string()]);
        assert!(call.chained_debug_info);
    }

    #[test]
    fn test_driver_failure_is_reported() {
        let mut loader = MockLoader::with_layers(Vec::new());
        loader.result = vk::Result::ERROR_INCOMPATIBLE_DRIVER;

        let result = create_instance(&loader, &description(false));

        assert!(matches!(
            result,
            Err(VulkanError::InstanceCreation(vk::Result::ERROR_INCOMPATIBLE_DRIVER))
        ));
    }

    #[test]
    fn test_instance_creation_stage_requests_no_layers() {
        let config = AppConfig::new(TutorialStage::InstanceCreation).with_validation(true);
        let description = InstanceDescription::from_config(&config, &[]);

        assert!(!description.validation_enabled());
        assert!(description.extensions.is_empty());
    }
}
