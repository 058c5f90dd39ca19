//! Vulkan bootstrap for a windowed application
//!
//! Creates a window, negotiates instance extensions and validation layers,
//! creates the Vulkan instance and installs a debug report callback
//!
//! Every object is a resource which releases itself on drop.
//! [`app::Application`] owns them and keeps the release order:
//! debug callback, window, instance

pub mod macros;
pub mod loader;
pub mod extensions;
pub mod layers;
pub mod libvk;
pub mod debug;
pub mod window;
pub mod app;
