
use test_context::*;

use vkboot::extensions;

use std::ffi::CString;

fn platform() -> Vec<CString> {
    vec![c"VK_KHR_surface".to_owned(), c"VK_KHR_wayland_surface".to_owned()]
}

#[test]
fn supported_extensions_in_reported_order() {
    let lib = StubLoader::default();

    let supported = extensions::supported_extensions(&lib).expect("Failed to enumerate extensions");

    let names: Vec<&str> = supported.iter().map(|e| e.name().to_str().expect("Not utf-8")).collect();

    assert_eq!(names, ["VK_KHR_surface", "VK_KHR_xlib_surface", "VK_EXT_debug_report"]);
    assert_eq!(supported[0].spec_version(), 25);
    assert_eq!(count("enumerate_extensions"), 2);
}

#[test]
fn empty_supported_list_is_not_an_error() {
    let lib = StubLoader {
        extensions: Vec::new(),
        ..StubLoader::default()
    };

    let supported = extensions::supported_extensions(&lib).expect("Empty list must not fail");

    assert!(supported.is_empty());
}

#[test]
fn display_contains_name_and_revision() {
    let lib = StubLoader::default();

    let supported = extensions::supported_extensions(&lib).expect("Failed to enumerate extensions");

    assert_eq!(supported[2].to_string(), "VK_EXT_debug_report (rev. 10)");
}

#[test]
fn required_without_debug_is_platform_list() {
    let required = extensions::required_extensions(&platform(), false);

    assert_eq!(required, platform());
    assert!(!required.iter().any(|e| e.as_c_str() == extensions::DEBUG_EXT_NAME));
}

#[test]
fn required_with_debug_appends_debug_extension_last() {
    let without = extensions::required_extensions(&platform(), false);
    let with = extensions::required_extensions(&platform(), true);

    assert_eq!(with.len(), without.len() + 1);
    assert_eq!(&with[..without.len()], &without[..]);
    assert_eq!(with.last().map(|e| e.as_c_str()), Some(extensions::DEBUG_EXT_NAME));
}

#[test]
fn required_with_empty_platform_list() {
    assert!(extensions::required_extensions(&[], false).is_empty());
    assert_eq!(extensions::required_extensions(&[], true), vec![extensions::DEBUG_EXT_NAME.to_owned()]);
}

#[test]
fn required_does_not_query_runtime() {
    extensions::required_extensions(&platform(), true);

    assert!(calls().is_empty());
}
