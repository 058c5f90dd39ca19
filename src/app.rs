//! Application lifecycle
//!
//! [`Application`] owns the window, the instance and the debug callback
//! and brings them up in dependency order:
//!
//! `Uninitialized -> WindowReady -> InstanceReady -> DebugReady -> Running -> TornDown`
//!
//! Whatever was acquired is released in reverse order on every exit path,
//! including a failed step and a plain drop

use crate::debug::{self, DebugCallback, DebugCallbackCfg, DebugError, DebugPolicy, ReportFlags};
use crate::extensions;
use crate::layers::{self, LayerList};
use crate::libvk::{self, ApplicationInfo, InstanceError};
use crate::loader::{Loader, LoaderError};
use crate::window::{WindowCfg, WindowError, WindowSystem};

use std::env;
use std::error::Error;
use std::fmt;

pub const VALIDATION_ENV: &str = "VKBOOT_VALIDATION";

pub const DYNAMIC_LOAD_ENV: &str = "VKBOOT_DYNAMIC_LOAD";

/// Runtime configuration of [`Application`]
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: ApplicationInfo,
    pub window: WindowCfg,
    /// Request validation layers and install debug callback
    pub enable_validation: bool,
    pub validation_layers: LayerList,
    /// Reports delivered to the debug callback
    pub debug_severity: ReportFlags,
    /// Reports which abort the offending Vulkan call
    pub abort_on: ReportFlags,
    /// Open Vulkan library at runtime instead of using the linked one
    pub dynamic_load: bool,
}

impl Default for AppConfig {
    fn default() -> AppConfig {
        AppConfig {
            app: ApplicationInfo::default(),
            window: WindowCfg::default(),
            enable_validation: cfg!(debug_assertions),
            validation_layers: vec![layers::VALIDATION_LAYER_NAME.to_owned()],
            debug_severity: DebugCallbackCfg::default().flags,
            abort_on: ReportFlags::empty(),
            dynamic_load: false,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `VKBOOT_VALIDATION` and `VKBOOT_DYNAMIC_LOAD`
    pub fn from_env() -> AppConfig {
        let mut cfg = AppConfig::default();

        if let Some(value) = env_flag(VALIDATION_ENV) {
            cfg.enable_validation = value;
        }

        if let Some(value) = env_flag(DYNAMIC_LOAD_ENV) {
            cfg.dynamic_load = value;
        }

        cfg
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = env::var(name).ok()?;

    match parse_flag(&value) {
        Some(flag) => Some(flag),
        None => {
            log::warn!("Ignoring {}={:?}: expected 0, 1, true or false", name, value);
            None
        }
    }
}

/// Accepts `0`, `1`, `true`, `false`, `on`, `off` in any case
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    WindowReady,
    InstanceReady,
    DebugReady,
    Running,
    TornDown,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug)]
pub enum AppError {
    Loader(LoaderError),
    Window(WindowError),
    Instance(InstanceError),
    Debug(DebugError),
    State { expected: State, actual: State },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Loader(err) => write!(f, "{}", err),
            AppError::Window(err) => write!(f, "{}", err),
            AppError::Instance(err) => write!(f, "{}", err),
            AppError::Debug(err) => write!(f, "{}", err),
            AppError::State { expected, actual } => {
                write!(f, "Invalid application state: expected {}, found {}", expected, actual)
            }
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Loader(err) => Some(err),
            AppError::Window(err) => Some(err),
            AppError::Instance(err) => Some(err),
            AppError::Debug(err) => Some(err),
            AppError::State { .. } => None,
        }
    }
}

impl From<LoaderError> for AppError {
    fn from(err: LoaderError) -> AppError {
        AppError::Loader(err)
    }
}

impl From<WindowError> for AppError {
    fn from(err: WindowError) -> AppError {
        AppError::Window(err)
    }
}

impl From<InstanceError> for AppError {
    fn from(err: InstanceError) -> AppError {
        AppError::Instance(err)
    }
}

impl From<DebugError> for AppError {
    fn from(err: DebugError) -> AppError {
        AppError::Debug(err)
    }
}

/// Owner of every resource created during bootstrap
pub struct Application<L: Loader + Clone, W: WindowSystem> {
    i_cfg: AppConfig,
    i_loader: L,
    i_state: State,
    i_debug: Option<DebugCallback<L>>,
    i_window: Option<W::Window>,
    i_instance: Option<libvk::Instance<L>>,
    i_system: W,
}

impl<L: Loader + Clone, W: WindowSystem> Application<L, W> {
    pub fn new(cfg: AppConfig, loader: L, system: W) -> Application<L, W> {
        Application {
            i_cfg: cfg,
            i_loader: loader,
            i_state: State::Uninitialized,
            i_debug: None,
            i_window: None,
            i_instance: None,
            i_system: system,
        }
    }

    /// Bring everything up, loop until window is closed, tear down
    pub fn run(&mut self) -> Result<(), AppError> {
        self.init()?;
        self.init_instance()?;
        self.init_debug()?;
        self.main_loop()?;
        self.cleanup();

        Ok(())
    }

    fn expect_state(&self, expected: State) -> Result<(), AppError> {
        if self.i_state != expected {
            return Err(AppError::State {
                expected,
                actual: self.i_state,
            });
        }

        Ok(())
    }

    /// Create window
    pub fn init(&mut self) -> Result<(), AppError> {
        self.expect_state(State::Uninitialized)?;

        let cfg = &self.i_cfg.window;

        log::info!(
            "Creating {}x{} window \"{}\" (resizable: {})",
            cfg.width,
            cfg.height,
            cfg.title,
            cfg.resizable
        );

        self.i_window = Some(self.i_system.create_window(cfg)?);
        self.i_state = State::WindowReady;

        Ok(())
    }

    /// Negotiate extensions and create instance
    pub fn init_instance(&mut self) -> Result<(), AppError> {
        self.expect_state(State::WindowReady)?;

        let platform = self.i_system.required_extensions()?;
        let requested = extensions::required_extensions(&platform, self.i_cfg.enable_validation);

        if log::log_enabled!(log::Level::Debug) {
            match extensions::supported_extensions(&self.i_loader) {
                Ok(supported) => {
                    log::debug!("Available Vulkan extensions: {}", supported.len());
                    for (i, ext) in supported.iter().enumerate() {
                        log::debug!("{}\t{}", i + 1, ext);
                    }
                }
                Err(err) => log::warn!("{}", err),
            }
        }

        let instance_cfg = libvk::InstanceCfg {
            app: &self.i_cfg.app,
            extensions: &requested,
            layers: &self.i_cfg.validation_layers,
            enable_validation: self.i_cfg.enable_validation,
        };

        log::info!(
            "Creating Vulkan {} instance for {:?} with {} extension(s), validation {}",
            self.i_cfg.app.api_version,
            self.i_cfg.app.name,
            requested.len(),
            if self.i_cfg.enable_validation { "on" } else { "off" }
        );

        self.i_instance = Some(libvk::Instance::new(&self.i_loader, &instance_cfg)?);
        self.i_state = State::InstanceReady;

        Ok(())
    }

    /// Install debug callback, no-op when validation is disabled
    pub fn init_debug(&mut self) -> Result<(), AppError> {
        self.expect_state(State::InstanceReady)?;

        if self.i_cfg.enable_validation {
            let instance = match &self.i_instance {
                Some(instance) => instance,
                None => {
                    return Err(AppError::State {
                        expected: State::InstanceReady,
                        actual: self.i_state,
                    })
                }
            };

            let cfg = DebugCallbackCfg {
                flags: self.i_cfg.debug_severity,
                callback: Some(debug::vulkan_debug_report_callback),
                policy: DebugPolicy {
                    abort_on: self.i_cfg.abort_on,
                },
            };

            self.i_debug = Some(DebugCallback::install(instance, &cfg)?);
            log::info!("Debug report callback installed");
        }

        self.i_state = State::DebugReady;

        Ok(())
    }

    /// Poll window events until close is requested
    pub fn main_loop(&mut self) -> Result<(), AppError> {
        self.expect_state(State::DebugReady)?;

        self.i_state = State::Running;

        if let Some(window) = &self.i_window {
            while !self.i_system.should_close(window) {
                self.i_system.poll_events();
            }
        }

        log::info!("Window closed");

        Ok(())
    }

    /// Release debug callback, window and instance in that order
    ///
    /// Safe to call in any state and more than once
    pub fn cleanup(&mut self) {
        if self.i_state == State::TornDown {
            return;
        }

        drop(self.i_debug.take());
        drop(self.i_window.take());
        drop(self.i_instance.take());

        self.i_state = State::TornDown;
    }

    pub fn state(&self) -> State {
        self.i_state
    }

    pub fn window(&self) -> Option<&W::Window> {
        self.i_window.as_ref()
    }

    pub fn instance(&self) -> Option<&libvk::Instance<L>> {
        self.i_instance.as_ref()
    }

    pub fn debug_callback(&self) -> Option<&DebugCallback<L>> {
        self.i_debug.as_ref()
    }
}

impl<L: Loader + Clone, W: WindowSystem> Drop for Application<L, W> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
