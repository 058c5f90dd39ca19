//! Instance layers

use ash::vk;

use crate::loader::{self, Loader};

use std::error::Error;
use std::ffi::{CStr, CString};
use std::fmt;

/// Khronos validation layer
pub const VALIDATION_LAYER_NAME: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Requested layer names
pub type LayerList = Vec<CString>;

#[derive(Debug)]
pub enum LayerError {
    Enumerate(vk::Result),
}

impl fmt::Display for LayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerError::Enumerate(res) => write!(
                f,
                "Failed to enumerate instance layers (vkEnumerateInstanceLayerProperties call failed: {})",
                res
            ),
        }
    }
}

impl Error for LayerError {}

/// Names of every layer the runtime can load
pub fn available_layers<L: Loader>(lib: &L) -> Result<LayerList, LayerError> {
    let properties: Vec<vk::LayerProperties> =
        loader::enumerate(|count, data| unsafe { lib.enumerate_instance_layer_properties(count, data) })
            .map_err(LayerError::Enumerate)?;

    Ok(properties
        .iter()
        .filter_map(|p| p.layer_name_as_c_str().ok())
        .map(CStr::to_owned)
        .collect())
}

/// First requested layer which is absent in the runtime
///
/// Names are compared exactly (case sensitive). Layers are queried on every call
pub fn first_unsupported<L, S>(lib: &L, requested: &[S]) -> Result<Option<CString>, LayerError>
where
    L: Loader,
    S: AsRef<CStr>,
{
    let available = available_layers(lib)?;

    let missing = requested
        .iter()
        .map(AsRef::as_ref)
        .find(|name| !available.iter().any(|layer| layer.as_c_str() == *name));

    Ok(missing.map(CStr::to_owned))
}

/// `true` only if every requested layer is available
pub fn check_support<L, S>(lib: &L, requested: &[S]) -> Result<bool, LayerError>
where
    L: Loader,
    S: AsRef<CStr>,
{
    Ok(first_unsupported(lib, requested)?.is_none())
}
