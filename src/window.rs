//! Helper functions around `winit` library
//!
//! [`WindowSystem`] is everything the bootstrap sequence needs from a windowing toolkit.
//! Dropping a window destroys it, dropping the system shuts the toolkit down

use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoopBuilder;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{WindowBuilder, WindowId};

use raw_window_handle::HasDisplayHandle;

use std::collections::HashSet;
use std::error::Error;
use std::ffi::{CStr, CString};
use std::fmt;
use std::time::Duration;

/// Longest time [`WinitSystem::poll_events`] waits for an event
pub const POLL_TIMEOUT: Duration = Duration::from_millis(10);

pub type EventLoop = winit::event_loop::EventLoop<()>;
pub type Window = winit::window::Window;

/// Window parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowCfg {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub resizable: bool,
}

impl Default for WindowCfg {
    fn default() -> WindowCfg {
        WindowCfg {
            width: 800,
            height: 600,
            title: String::from("Vulkan"),
            resizable: false,
        }
    }
}

#[derive(Debug)]
pub enum WindowError {
    EventLoop,
    Create,
    DisplayHandle,
    Extensions,
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let err_msg = match self {
            WindowError::EventLoop => "Failed to create event loop",
            WindowError::Create => "Failed to create window",
            WindowError::DisplayHandle => "Failed to get display handle",
            WindowError::Extensions => "Failed to query instance extensions required by the window system",
        };

        write!(f, "{}", err_msg)
    }
}

impl Error for WindowError {}

impl From<EventLoopError> for WindowError {
    fn from(_: EventLoopError) -> WindowError {
        WindowError::EventLoop
    }
}

impl From<OsError> for WindowError {
    fn from(_: OsError) -> WindowError {
        WindowError::Create
    }
}

/// Windowing toolkit
pub trait WindowSystem {
    type Window;

    fn create_window(&mut self, cfg: &WindowCfg) -> Result<Self::Window, WindowError>;

    /// Instance extensions needed to present into windows of this system, in toolkit order
    fn required_extensions(&self) -> Result<Vec<CString>, WindowError>;

    /// Process pending events, may block briefly
    fn poll_events(&mut self);

    fn should_close(&self, window: &Self::Window) -> bool;
}

#[cfg(target_os = "linux")]
/// Create new eventloop
///
/// Event loop can be used in different thread (unlike original winit event loop)
pub fn eventloop() -> Result<EventLoop, EventLoopError> {
    use winit::platform::wayland::EventLoopBuilderExtWayland;
    use winit::platform::x11::EventLoopBuilderExtX11;

    let mut builder = EventLoopBuilder::new();
    EventLoopBuilderExtWayland::with_any_thread(&mut builder, true);
    EventLoopBuilderExtX11::with_any_thread(&mut builder, true).build()
}

#[cfg(not(target_os = "linux"))]
/// Create new eventloop
pub fn eventloop() -> Result<EventLoop, EventLoopError> {
    EventLoopBuilder::new().build()
}

/// [`WindowSystem`] over `winit`
///
/// Events are pumped on demand instead of handing control to `EventLoop::run`
pub struct WinitSystem {
    i_eventloop: EventLoop,
    i_close_requested: HashSet<WindowId>,
    i_exited: bool,
}

impl WinitSystem {
    pub fn new() -> Result<WinitSystem, WindowError> {
        Ok(WinitSystem {
            i_eventloop: eventloop()?,
            i_close_requested: HashSet::new(),
            i_exited: false,
        })
    }
}

impl fmt::Debug for WinitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WinitSystem")
            .field("i_close_requested", &self.i_close_requested)
            .field("i_exited", &self.i_exited)
            .finish()
    }
}

impl WindowSystem for WinitSystem {
    type Window = Window;

    fn create_window(&mut self, cfg: &WindowCfg) -> Result<Window, WindowError> {
        let window = WindowBuilder::new()
            .with_title(cfg.title.as_str())
            .with_inner_size(LogicalSize::new(cfg.width, cfg.height))
            .with_resizable(cfg.resizable)
            .build(&self.i_eventloop)?;

        Ok(window)
    }

    fn required_extensions(&self) -> Result<Vec<CString>, WindowError> {
        let display = self
            .i_eventloop
            .display_handle()
            .map_err(|_| WindowError::DisplayHandle)?;

        let names = ash_window::enumerate_required_extensions(display.as_raw())
            .map_err(|_| WindowError::Extensions)?;

        Ok(names
            .iter()
            .map(|&name| unsafe { CStr::from_ptr(name) }.to_owned())
            .collect())
    }

    fn poll_events(&mut self) {
        let close_requested = &mut self.i_close_requested;

        let status = self.i_eventloop.pump_events(Some(POLL_TIMEOUT), |event, _| {
            if let Event::WindowEvent {
                window_id,
                event: WindowEvent::CloseRequested,
            } = event
            {
                close_requested.insert(window_id);
            }
        });

        if let PumpStatus::Exit(_) = status {
            self.i_exited = true;
        }
    }

    fn should_close(&self, window: &Window) -> bool {
        self.i_exited || self.i_close_requested.contains(&window.id())
    }
}
