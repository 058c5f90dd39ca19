use vkboot::window::{self, WindowCfg};

use std::time::Duration;

#[test]
fn default_window_cfg() {
    let cfg = WindowCfg::default();

    assert_eq!(cfg.width, 800);
    assert_eq!(cfg.height, 600);
    assert_eq!(cfg.title, "Vulkan");
    assert!(!cfg.resizable);
}

#[test]
fn event_polling_waits_briefly() {
    assert!(window::POLL_TIMEOUT > Duration::ZERO);
    assert!(window::POLL_TIMEOUT <= Duration::from_millis(16));
}
