//! Instance extensions

use ash::vk;

use crate::loader::{self, Loader};

use std::error::Error;
use std::ffi::{CStr, CString};
use std::fmt;

/// Ordered list of extension names requested at instance creation
pub type ExtensionList = Vec<CString>;

/// Extension providing `vkCreateDebugReportCallbackEXT`
pub const DEBUG_EXT_NAME: &CStr = ash::ext::debug_report::NAME;

#[derive(Debug)]
pub enum ExtensionError {
    Enumerate(vk::Result),
}

impl fmt::Display for ExtensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionError::Enumerate(res) => write!(
                f,
                "Failed to enumerate instance extensions (vkEnumerateInstanceExtensionProperties call failed: {})",
                res
            ),
        }
    }
}

impl Error for ExtensionError {}

/// Extension reported by the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDescription {
    i_name: CString,
    i_spec_version: u32,
}

impl ExtensionDescription {
    fn new(property: &vk::ExtensionProperties) -> ExtensionDescription {
        let name = property
            .extension_name_as_c_str()
            .map(CStr::to_owned)
            .unwrap_or_default();

        ExtensionDescription {
            i_name: name,
            i_spec_version: property.spec_version,
        }
    }

    pub fn name(&self) -> &CStr {
        &self.i_name
    }

    pub fn spec_version(&self) -> u32 {
        self.i_spec_version
    }
}

impl fmt::Display for ExtensionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (rev. {})", self.i_name.to_string_lossy(), self.i_spec_version)
    }
}

/// Every instance extension supported by the runtime, in reported order
///
/// Empty result is not an error
pub fn supported_extensions<L: Loader>(lib: &L) -> Result<Vec<ExtensionDescription>, ExtensionError> {
    let properties: Vec<vk::ExtensionProperties> =
        loader::enumerate(|count, data| unsafe { lib.enumerate_instance_extension_properties(count, data) })
            .map_err(ExtensionError::Enumerate)?;

    Ok(properties.iter().map(ExtensionDescription::new).collect())
}

/// Extensions to request at instance creation
///
/// `platform` is taken verbatim and in order. With `enable_debug`
/// [`DEBUG_EXT_NAME`] is appended last. Nothing is checked against the runtime here
pub fn required_extensions(platform: &[CString], enable_debug: bool) -> ExtensionList {
    let mut extensions: ExtensionList = platform.to_vec();

    if enable_debug {
        extensions.push(DEBUG_EXT_NAME.to_owned());
    }

    extensions
}
