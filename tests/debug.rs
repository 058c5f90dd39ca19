
use test_context::*;

use vkboot::debug::{self, DebugCallback, DebugCallbackCfg, DebugError, DebugPolicy, ReportFlags};
use vkboot::libvk::{ApplicationInfo, Instance, InstanceCfg};

use ash::vk;
use ash::vk::Handle;

use std::ffi::c_void;
use std::ptr;

fn instance(lib: &StubLoader) -> Instance<StubLoader> {
    let app = ApplicationInfo::default();

    let cfg = InstanceCfg {
        app: &app,
        extensions: &[],
        layers: &[],
        enable_validation: false,
    };

    Instance::new(lib, &cfg).expect("Failed to create instance")
}

#[test]
fn install_and_uninstall() {
    let lib = StubLoader::default();
    let instance = instance(&lib);

    let callback = DebugCallback::install(&instance, &DebugCallbackCfg::default()).expect("Failed to install callback");

    assert_eq!(callback.handle().as_raw(), CALLBACK_RAW);
    assert_eq!(count("create_debug_callback"), 1);
    assert_eq!(
        last_callback_flags(),
        Some(ReportFlags::ERROR | ReportFlags::WARNING | ReportFlags::PERFORMANCE_WARNING)
    );

    callback.uninstall();

    assert_eq!(count("destroy_debug_callback"), 1);
    assert_eq!(count("destroy_instance"), 0);
}

#[test]
fn severity_mask_is_passed_through() {
    let lib = StubLoader::default();
    let instance = instance(&lib);

    let cfg = DebugCallbackCfg {
        flags: ReportFlags::ERROR,
        ..DebugCallbackCfg::default()
    };

    let _callback = DebugCallback::install(&instance, &cfg).expect("Failed to install callback");

    assert_eq!(last_callback_flags(), Some(ReportFlags::ERROR));
}

#[test]
fn missing_create_symbol_is_extension_not_present() {
    let lib = StubLoader {
        has_create_callback: false,
        ..StubLoader::default()
    };
    let instance = instance(&lib);

    assert!(!instance.debug_report().is_present());

    match DebugCallback::install(&instance, &DebugCallbackCfg::default()) {
        Err(DebugError::ExtensionNotPresent) => {}
        other => panic!("Unexpected result: {:?}", other),
    }

    assert_eq!(count("create_debug_callback"), 0);
    assert_eq!(count("destroy_debug_callback"), 0);
}

#[test]
fn runtime_failure_is_instantiation_error() {
    let lib = StubLoader::default();
    let instance = instance(&lib);

    set_callback_result(vk::Result::ERROR_OUT_OF_HOST_MEMORY);

    match DebugCallback::install(&instance, &DebugCallbackCfg::default()) {
        Err(DebugError::Instantiation(res)) => assert_eq!(res, vk::Result::ERROR_OUT_OF_HOST_MEMORY),
        other => panic!("Unexpected result: {:?}", other),
    }

    assert_eq!(count("destroy_debug_callback"), 0);
}

#[test]
fn missing_destroy_symbol_is_silent() {
    let lib = StubLoader {
        has_destroy_callback: false,
        ..StubLoader::default()
    };
    let instance = instance(&lib);

    let callback = DebugCallback::install(&instance, &DebugCallbackCfg::default()).expect("Failed to install callback");

    drop(callback);

    assert_eq!(count("destroy_debug_callback"), 0);

    drop(instance);

    assert_eq!(count("destroy_instance"), 1);
}

#[test]
fn callback_keeps_instance_alive() {
    let lib = StubLoader::default();
    let instance = instance(&lib);

    let callback = DebugCallback::install(&instance, &DebugCallbackCfg::default()).expect("Failed to install callback");

    drop(instance);

    assert_eq!(count("destroy_instance"), 0);

    drop(callback);

    let destroy_callback = position("destroy_debug_callback").expect("Callback was not destroyed");
    let destroy_instance = position("destroy_instance").expect("Instance was not destroyed");

    assert!(destroy_callback < destroy_instance);
    assert_eq!(count("destroy_instance"), 1);
}

#[test]
fn entry_points_are_resolved_once_per_instance() {
    let lib = StubLoader::default();
    let instance = instance(&lib);

    for _ in 0..3 {
        let callback = DebugCallback::install(&instance, &DebugCallbackCfg::default()).expect("Failed to install callback");
        drop(callback);
    }

    assert_eq!(count("create_debug_callback"), 3);
    assert_eq!(count("destroy_debug_callback"), 3);
    assert_eq!(count("resolve:vkCreateDebugReportCallbackEXT"), 1);
    assert_eq!(count("resolve:vkDestroyDebugReportCallbackEXT"), 1);
}

#[test]
fn policy_decides_abort() {
    let never = DebugPolicy::default();
    let on_error = DebugPolicy {
        abort_on: ReportFlags::ERROR,
    };

    assert!(!never.should_abort(ReportFlags::ERROR));
    assert!(on_error.should_abort(ReportFlags::ERROR));
    assert!(on_error.should_abort(ReportFlags::ERROR | ReportFlags::WARNING));
    assert!(!on_error.should_abort(ReportFlags::WARNING));
}

unsafe fn report(flags: ReportFlags, user_data: *mut c_void) -> vk::Bool32 {
    debug::vulkan_debug_report_callback(
        flags,
        vk::DebugReportObjectTypeEXT::INSTANCE,
        INSTANCE_RAW,
        0,
        42,
        c"Validation".as_ptr(),
        c"test message".as_ptr(),
        user_data,
    )
}

#[test]
fn default_callback_does_not_abort() {
    let policy = DebugPolicy::default();

    unsafe {
        assert_eq!(report(ReportFlags::ERROR, ptr::null_mut()), vk::FALSE);
        assert_eq!(
            report(ReportFlags::ERROR, &policy as *const DebugPolicy as *mut c_void),
            vk::FALSE
        );
    }
}

#[test]
fn callback_follows_policy() {
    let policy = DebugPolicy {
        abort_on: ReportFlags::ERROR,
    };
    let user_data = &policy as *const DebugPolicy as *mut c_void;

    unsafe {
        assert_eq!(report(ReportFlags::ERROR, user_data), vk::TRUE);
        assert_eq!(report(ReportFlags::WARNING, user_data), vk::FALSE);
    }
}

#[test]
fn callback_accepts_null_strings() {
    let res = unsafe {
        debug::vulkan_debug_report_callback(
            ReportFlags::INFORMATION,
            vk::DebugReportObjectTypeEXT::UNKNOWN,
            0,
            0,
            0,
            ptr::null(),
            ptr::null(),
            ptr::null_mut(),
        )
    };

    assert_eq!(res, vk::FALSE);
}

#[test]
fn report_levels() {
    assert_eq!(debug::report_level(ReportFlags::ERROR | ReportFlags::WARNING), log::Level::Error);
    assert_eq!(debug::report_level(ReportFlags::WARNING), log::Level::Warn);
    assert_eq!(debug::report_level(ReportFlags::PERFORMANCE_WARNING), log::Level::Warn);
    assert_eq!(debug::report_level(ReportFlags::INFORMATION), log::Level::Info);
    assert_eq!(debug::report_level(ReportFlags::DEBUG), log::Level::Debug);
}
