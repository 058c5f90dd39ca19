//! Provide library handler
//!
//! Typically it is your first object to create

use ash::vk;

use crate::debug::DebugReportFns;
use crate::layers::{self, LayerError};
use crate::loader::Loader;

use std::cell::OnceCell;
use std::error::Error;
use std::ffi::{c_char, CString};
use std::marker::PhantomData;
use std::rc::Rc;
use std::{fmt, ptr};

/// Version triple, packed with `VK_MAKE_API_VERSION` (variant `0`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Version {
        Version { major, minor, patch }
    }

    pub fn to_raw(&self) -> u32 {
        vk::make_api_version(0, self.major, self.minor, self.patch)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Application description passed to the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInfo {
    pub name: CString,
    pub version: Version,
    pub engine_name: CString,
    pub engine_version: Version,
    /// Highest Vulkan version application is going to use
    pub api_version: Version,
}

impl Default for ApplicationInfo {
    fn default() -> ApplicationInfo {
        ApplicationInfo {
            name: c"Hello Triangle".to_owned(),
            version: Version::new(1, 0, 0),
            engine_name: c"No Engine".to_owned(),
            engine_version: Version::new(1, 0, 0),
            api_version: Version::new(1, 0, 0),
        }
    }
}

/// Instance configuration
///
/// Layers are only requested (and checked) with `enable_validation`
#[derive(Debug)]
pub struct InstanceCfg<'a> {
    pub app: &'a ApplicationInfo,
    pub extensions: &'a [CString],
    pub layers: &'a [CString],
    pub enable_validation: bool,
}

#[derive(Debug)]
pub enum InstanceError {
    Layers(LayerError),
    ValidationLayerUnavailable(CString),
    Instantiation(vk::Result),
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceError::Layers(err) => write!(f, "{}", err),
            InstanceError::ValidationLayerUnavailable(name) => write!(
                f,
                "Validation layer requested, but not available: {}",
                name.to_string_lossy()
            ),
            InstanceError::Instantiation(res) => {
                write!(f, "Failed to create Vulkan instance (vkCreateInstance call failed: {})", res)
            }
        }
    }
}

impl Error for InstanceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            InstanceError::Layers(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LayerError> for InstanceError {
    fn from(err: LayerError) -> InstanceError {
        InstanceError::Layers(err)
    }
}

#[doc(hidden)]
pub struct Core<L: Loader> {
    i_loader: L,
    i_instance: vk::Instance,
    i_debug_fns: OnceCell<DebugReportFns>,
}

impl<L: Loader> Core<L> {
    pub fn handle(&self) -> vk::Instance {
        self.i_instance
    }

    pub fn debug_report(&self) -> &DebugReportFns {
        self.i_debug_fns
            .get_or_init(|| DebugReportFns::resolve(&self.i_loader, self.i_instance))
    }
}

impl<L: Loader> fmt::Debug for Core<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Core")
            .field("i_instance", &self.i_instance)
            .field("i_debug_fns", &self.i_debug_fns.get())
            .finish()
    }
}

impl<L: Loader> Drop for Core<L> {
    fn drop(&mut self) {
        unsafe { self.i_loader.destroy_instance(self.i_instance) };
    }
}

/// Vulkan instance
///
/// Objects created from the instance share its [`Core`],
/// `vkDestroyInstance` is called once the last of them is dropped
pub struct Instance<L: Loader> {
    i_core: Rc<Core<L>>,
}

impl<L: Loader + Clone> Instance<L> {
    /// Create instance with `vkCreateInstance`
    ///
    /// With validation enabled all `cfg.layers` must be available,
    /// otherwise [`InstanceError::ValidationLayerUnavailable`] is returned before any creation attempt
    pub fn new(lib: &L, cfg: &InstanceCfg) -> Result<Instance<L>, InstanceError> {
        if cfg.enable_validation {
            if let Some(missing) = layers::first_unsupported(lib, cfg.layers)? {
                return Err(InstanceError::ValidationLayerUnavailable(missing));
            }
        }

        let app_info = vk::ApplicationInfo {
            s_type: vk::StructureType::APPLICATION_INFO,
            p_next: ptr::null(),
            p_application_name: cfg.app.name.as_ptr(),
            application_version: cfg.app.version.to_raw(),
            p_engine_name: cfg.app.engine_name.as_ptr(),
            engine_version: cfg.app.engine_version.to_raw(),
            api_version: cfg.app.api_version.to_raw(),
            _marker: PhantomData,
        };

        let extensions: Vec<*const c_char> = cfg.extensions.iter().map(|name| name.as_ptr()).collect();

        let layers: Vec<*const c_char> = if cfg.enable_validation {
            cfg.layers.iter().map(|name| name.as_ptr()).collect()
        } else {
            Vec::new()
        };

        let create_info = vk::InstanceCreateInfo {
            s_type: vk::StructureType::INSTANCE_CREATE_INFO,
            p_next: ptr::null(),
            flags: vk::InstanceCreateFlags::empty(),
            p_application_info: &app_info,
            enabled_layer_count: layers.len() as u32,
            pp_enabled_layer_names: if layers.is_empty() {
                ptr::null()
            } else {
                layers.as_ptr()
            },
            enabled_extension_count: extensions.len() as u32,
            pp_enabled_extension_names: if extensions.is_empty() {
                ptr::null()
            } else {
                extensions.as_ptr()
            },
            _marker: PhantomData,
        };

        let instance = match unsafe { lib.create_instance(&create_info) } {
            Ok(instance) => instance,
            Err(res) => return Err(InstanceError::Instantiation(res)),
        };

        Ok(Instance {
            i_core: Rc::new(Core {
                i_loader: lib.clone(),
                i_instance: instance,
                i_debug_fns: OnceCell::new(),
            }),
        })
    }
}

impl<L: Loader> Instance<L> {
    /// `VK_EXT_debug_report` entry points, resolved on first call
    pub fn debug_report(&self) -> &DebugReportFns {
        self.i_core.debug_report()
    }

    #[doc(hidden)]
    pub fn handle(&self) -> vk::Instance {
        self.i_core.handle()
    }

    #[doc(hidden)]
    pub fn core(&self) -> &Rc<Core<L>> {
        &self.i_core
    }
}

impl<L: Loader> fmt::Debug for Instance<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("i_core", &self.i_core)
            .finish()
    }
}
