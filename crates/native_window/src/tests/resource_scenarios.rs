//! Icon and font lifetimes attached to windows

use super::{headless, EventLog, Probe};
use crate::platform::RawResource;
use crate::resources::{stock, Font, Icon};
use crate::window::{EventTarget, Window, WindowConfig};

#[test]
fn test_clone_outlives_original() {
    let (system, platform) = headless();
    let original = Icon::load(&system, stock::APPLICATION_ICON).unwrap();
    let copy = original.try_clone().unwrap();
    let copy_raw = copy.raw();

    drop(original);

    assert!(platform.is_resource_live(copy_raw));
    assert!(Icon::default().try_clone().unwrap().raw().is_null());
}

#[test]
fn test_window_keeps_icon_until_replaced() {
    let (system, platform) = headless();
    let log = EventLog::default();
    let window = Window::create(&system, &WindowConfig::new("Frame"), Probe::builder(&log)).unwrap();
    let handle = window.window().native_handle();

    let first = Icon::load(&system, stock::APPLICATION_ICON).unwrap();
    let first_raw = first.raw();
    window.window().set_icon(first);
    assert_eq!(platform.icon(handle), first_raw);
    assert!(platform.is_resource_live(first_raw));

    let second = Icon::load(&system, stock::APPLICATION_ICON).unwrap();
    let second_raw = second.raw();
    window.window().set_icon(second);

    assert_eq!(platform.released_resources(), vec![first_raw]);
    assert_eq!(window.window().icon_handle(), second_raw);

    drop(window);
    assert_eq!(platform.released_resources(), vec![first_raw, second_raw]);
    assert_eq!(platform.live_resource_count(), 0);
}

#[test]
fn test_font_assignment_and_clearing() {
    let (system, platform) = headless();
    let log = EventLog::default();
    let window = Window::create(&system, &WindowConfig::new("Frame"), Probe::builder(&log)).unwrap();
    let handle = window.window().native_handle();
    let font = Font::load(&system, stock::DEFAULT_GUI_FONT).unwrap();
    let raw = font.raw();

    window.window().set_font(font);
    assert_eq!(platform.font(handle), raw);

    window.window().set_font(Font::default());
    assert_eq!(platform.font(handle), RawResource::NULL);
    assert_eq!(platform.released_resources(), vec![raw]);
}

#[test]
fn test_missing_stock_resource_is_an_error() {
    let (system, platform) = headless();
    platform.mark_missing_resource("fancy");

    let error = Icon::load(&system, "fancy").unwrap_err();

    assert_eq!(error.name, "fancy");
    assert_eq!(platform.live_resource_count(), 0);
}
