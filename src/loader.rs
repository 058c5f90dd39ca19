//! Access to the Vulkan runtime before any instance exists
//!
//! [`Loader`] is the set of global entry points the bootstrap sequence needs.
//! [`VulkanLoader`] forwards them to the system Vulkan loader through `ash`

use ash::vk;

use crate::on_error_ret;

use std::error::Error;
use std::ffi::CStr;
use std::fmt;
use std::ptr;

/// Global (instance-less) part of the Vulkan runtime
///
/// Enumeration methods follow the native count-then-fill protocol:
/// when `properties` is null only `count` is written,
/// otherwise at most `*count` elements are written and `count` is updated
///
/// # Safety
///
/// Implementations receive raw pointers straight from the caller,
/// `properties` must be valid for `*count` writes when it is not null
pub trait Loader {
    unsafe fn enumerate_instance_extension_properties(
        &self,
        count: &mut u32,
        properties: *mut vk::ExtensionProperties,
    ) -> vk::Result;

    unsafe fn enumerate_instance_layer_properties(
        &self,
        count: &mut u32,
        properties: *mut vk::LayerProperties,
    ) -> vk::Result;

    unsafe fn create_instance(&self, info: &vk::InstanceCreateInfo<'_>) -> Result<vk::Instance, vk::Result>;

    unsafe fn destroy_instance(&self, instance: vk::Instance);

    /// Returns `None` if symbol is not exposed for `instance`
    unsafe fn get_instance_proc_addr(&self, instance: vk::Instance, name: &CStr) -> vk::PFN_vkVoidFunction;
}

#[derive(Debug)]
pub enum LoaderError {
    LibraryLoad,
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let err_msg = match self {
            LoaderError::LibraryLoad => "Failed to load Vulkan library",
        };

        write!(f, "{}", err_msg)
    }
}

impl Error for LoaderError {}

/// Vulkan loader backed by [`ash::Entry`]
#[derive(Clone)]
pub struct VulkanLoader {
    i_entry: ash::Entry,
}

impl VulkanLoader {
    /// Use loader linked at compile time
    pub fn linked() -> VulkanLoader {
        VulkanLoader {
            i_entry: ash::Entry::linked(),
        }
    }

    /// Open Vulkan library at runtime
    pub fn load() -> Result<VulkanLoader, LoaderError> {
        let entry = on_error_ret!(unsafe { ash::Entry::load() }, LoaderError::LibraryLoad);

        Ok(VulkanLoader { i_entry: entry })
    }

    pub fn new(dynamic_load: bool) -> Result<VulkanLoader, LoaderError> {
        if dynamic_load {
            VulkanLoader::load()
        } else {
            Ok(VulkanLoader::linked())
        }
    }
}

impl fmt::Debug for VulkanLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VulkanLoader")
            .field("i_entry", &(&self.i_entry as *const ash::Entry))
            .finish()
    }
}

impl Loader for VulkanLoader {
    unsafe fn enumerate_instance_extension_properties(
        &self,
        count: &mut u32,
        properties: *mut vk::ExtensionProperties,
    ) -> vk::Result {
        (self.i_entry.fp_v1_0().enumerate_instance_extension_properties)(ptr::null(), count, properties)
    }

    unsafe fn enumerate_instance_layer_properties(
        &self,
        count: &mut u32,
        properties: *mut vk::LayerProperties,
    ) -> vk::Result {
        (self.i_entry.fp_v1_0().enumerate_instance_layer_properties)(count, properties)
    }

    unsafe fn create_instance(&self, info: &vk::InstanceCreateInfo<'_>) -> Result<vk::Instance, vk::Result> {
        let mut instance = vk::Instance::null();

        (self.i_entry.fp_v1_0().create_instance)(info, ptr::null(), &mut instance)
            .result_with_success(instance)
    }

    unsafe fn destroy_instance(&self, instance: vk::Instance) {
        let fns = ash::Instance::load(self.i_entry.static_fn(), instance);

        fns.destroy_instance(None);
    }

    unsafe fn get_instance_proc_addr(&self, instance: vk::Instance, name: &CStr) -> vk::PFN_vkVoidFunction {
        (self.i_entry.static_fn().get_instance_proc_addr)(instance, name.as_ptr())
    }
}

/// Two-step enumeration: query count, then fill buffer of that size
///
/// Zero elements is a valid result and skips the fill call.
/// `INCOMPLETE` on the fill call restarts the whole query
pub fn enumerate<T, F>(mut query: F) -> Result<Vec<T>, vk::Result>
where
    T: Default + Clone,
    F: FnMut(&mut u32, *mut T) -> vk::Result,
{
    loop {
        let mut count: u32 = 0;

        match query(&mut count, ptr::null_mut()) {
            vk::Result::SUCCESS => {}
            err => return Err(err),
        }

        if count == 0 {
            return Ok(Vec::new());
        }

        let mut data: Vec<T> = vec![T::default(); count as usize];

        match query(&mut count, data.as_mut_ptr()) {
            vk::Result::SUCCESS => {
                data.truncate(count as usize);
                return Ok(data);
            }
            vk::Result::INCOMPLETE => continue,
            err => return Err(err),
        }
    }
}
