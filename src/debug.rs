//! Debug report callback
//!
//! `VK_EXT_debug_report` entry points are not exported by the loader statically,
//! so they are looked up with `vkGetInstanceProcAddr` against a live instance.
//! Lookup happens once per [`Instance`](crate::libvk::Instance), see [`Instance::debug_report`](crate::libvk::Instance::debug_report)

use ash::vk;

use crate::libvk;
use crate::loader::Loader;
use crate::on_option;

use std::borrow::Cow;
use std::error::Error;
use std::ffi::{c_char, c_void, CStr};
use std::rc::Rc;
use std::{fmt, mem, ptr};

pub const CREATE_CALLBACK_SYMBOL: &CStr = c"vkCreateDebugReportCallbackEXT";

pub const DESTROY_CALLBACK_SYMBOL: &CStr = c"vkDestroyDebugReportCallbackEXT";

/// Which reports are delivered to the callback
///
#[doc = "Values: <https://docs.rs/ash/latest/ash/vk/struct.DebugReportFlagsEXT.html>"]
pub type ReportFlags = vk::DebugReportFlagsEXT;

#[derive(Debug)]
pub enum DebugError {
    ExtensionNotPresent,
    Instantiation(vk::Result),
}

impl fmt::Display for DebugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebugError::ExtensionNotPresent => write!(
                f,
                "Failed to set up debug callback (vkCreateDebugReportCallbackEXT is not present)"
            ),
            DebugError::Instantiation(res) => write!(
                f,
                "Failed to set up debug callback (vkCreateDebugReportCallbackEXT call failed: {})",
                res
            ),
        }
    }
}

impl Error for DebugError {}

/// Resolved `VK_EXT_debug_report` entry points of a single instance
///
/// Either symbol may be absent
#[derive(Clone, Copy)]
pub struct DebugReportFns {
    i_create: Option<vk::PFN_vkCreateDebugReportCallbackEXT>,
    i_destroy: Option<vk::PFN_vkDestroyDebugReportCallbackEXT>,
}

impl DebugReportFns {
    pub fn resolve<L: Loader>(lib: &L, instance: vk::Instance) -> DebugReportFns {
        unsafe {
            let create = lib
                .get_instance_proc_addr(instance, CREATE_CALLBACK_SYMBOL)
                .map(|f| mem::transmute::<unsafe extern "system" fn(), vk::PFN_vkCreateDebugReportCallbackEXT>(f));

            let destroy = lib
                .get_instance_proc_addr(instance, DESTROY_CALLBACK_SYMBOL)
                .map(|f| mem::transmute::<unsafe extern "system" fn(), vk::PFN_vkDestroyDebugReportCallbackEXT>(f));

            DebugReportFns {
                i_create: create,
                i_destroy: destroy,
            }
        }
    }

    /// Is callback creation available
    pub fn is_present(&self) -> bool {
        self.i_create.is_some()
    }
}

impl fmt::Debug for DebugReportFns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugReportFns")
            .field("i_create", &self.i_create.is_some())
            .field("i_destroy", &self.i_destroy.is_some())
            .finish()
    }
}

/// Decides whether the Vulkan call which triggered a report should be aborted
///
/// Passed to the callback as user data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugPolicy {
    /// Reports intersecting these flags abort the call. Empty means never
    pub abort_on: ReportFlags,
}

impl DebugPolicy {
    pub fn should_abort(&self, flags: ReportFlags) -> bool {
        self.abort_on.intersects(flags)
    }
}

/// Callback configuration
pub struct DebugCallbackCfg {
    pub flags: ReportFlags,
    pub callback: vk::PFN_vkDebugReportCallbackEXT,
    pub policy: DebugPolicy,
}

impl Default for DebugCallbackCfg {
    fn default() -> DebugCallbackCfg {
        DebugCallbackCfg {
            flags: ReportFlags::ERROR
                | ReportFlags::WARNING
                | ReportFlags::PERFORMANCE_WARNING,
            callback: Some(vulkan_debug_report_callback),
            policy: DebugPolicy::default(),
        }
    }
}

/// Installed debug report callback
///
/// Uninstalled on drop. Keeps its instance alive until then
pub struct DebugCallback<L: Loader> {
    i_core: Rc<libvk::Core<L>>,
    i_callback: vk::DebugReportCallbackEXT,
    i_destroy: Option<vk::PFN_vkDestroyDebugReportCallbackEXT>,
    i_policy: Box<DebugPolicy>,
}

impl<L: Loader> DebugCallback<L> {
    pub fn install(lib: &libvk::Instance<L>, cfg: &DebugCallbackCfg) -> Result<DebugCallback<L>, DebugError> {
        let fns = lib.debug_report();

        let create = on_option!(fns.i_create, return Err(DebugError::ExtensionNotPresent));

        let policy = Box::new(cfg.policy);

        let create_info = vk::DebugReportCallbackCreateInfoEXT {
            s_type: vk::StructureType::DEBUG_REPORT_CALLBACK_CREATE_INFO_EXT,
            p_next: ptr::null(),
            flags: cfg.flags,
            pfn_callback: cfg.callback,
            p_user_data: &*policy as *const DebugPolicy as *mut c_void,
            _marker: std::marker::PhantomData,
        };

        let mut callback = vk::DebugReportCallbackEXT::null();

        let res = unsafe { create(lib.handle(), &create_info, ptr::null(), &mut callback) };

        if res != vk::Result::SUCCESS {
            return Err(DebugError::Instantiation(res));
        }

        Ok(DebugCallback {
            i_core: Rc::clone(lib.core()),
            i_callback: callback,
            i_destroy: fns.i_destroy,
            i_policy: policy,
        })
    }

    /// Same as drop
    pub fn uninstall(self) {
        drop(self);
    }

    #[doc(hidden)]
    pub fn handle(&self) -> vk::DebugReportCallbackEXT {
        self.i_callback
    }
}

impl<L: Loader> fmt::Debug for DebugCallback<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugCallback")
            .field("i_instance", &self.i_core.handle())
            .field("i_callback", &self.i_callback)
            .field("i_policy", &self.i_policy)
            .finish()
    }
}

impl<L: Loader> Drop for DebugCallback<L> {
    fn drop(&mut self) {
        // Missing destroy entry point leaks the callback together with the instance
        if let Some(destroy) = self.i_destroy {
            unsafe { destroy(self.i_core.handle(), self.i_callback, ptr::null()) };
        }
    }
}

/// Log level used for a report
pub fn report_level(flags: ReportFlags) -> log::Level {
    if flags.contains(ReportFlags::ERROR) {
        log::Level::Error
    } else if flags.intersects(ReportFlags::WARNING | ReportFlags::PERFORMANCE_WARNING) {
        log::Level::Warn
    } else if flags.contains(ReportFlags::INFORMATION) {
        log::Level::Info
    } else {
        log::Level::Debug
    }
}

unsafe fn lossy<'a>(raw: *const c_char) -> Cow<'a, str> {
    if raw.is_null() {
        Cow::Borrowed("")
    } else {
        CStr::from_ptr(raw).to_string_lossy()
    }
}

/// Default callback: logs the report and asks [`DebugPolicy`] from `p_user_data` whether to abort
///
/// Runs synchronously inside whatever Vulkan call produced the report,
/// so it must not call back into Vulkan
pub unsafe extern "system" fn vulkan_debug_report_callback(
    flags: vk::DebugReportFlagsEXT,
    object_type: vk::DebugReportObjectTypeEXT,
    object: u64,
    location: usize,
    message_code: i32,
    p_layer_prefix: *const c_char,
    p_message: *const c_char,
    p_user_data: *mut c_void,
) -> vk::Bool32 {
    let layer = lossy(p_layer_prefix);
    let message = lossy(p_message);

    log::log!(
        target: "vulkan",
        report_level(flags),
        "[{}] {:?} {:#x} at {} (code {}): {}",
        layer,
        object_type,
        object,
        location,
        message_code,
        message
    );

    let policy = if p_user_data.is_null() {
        DebugPolicy::default()
    } else {
        *(p_user_data as *const DebugPolicy)
    };

    if policy.should_abort(flags) {
        vk::TRUE
    } else {
        vk::FALSE
    }
}
