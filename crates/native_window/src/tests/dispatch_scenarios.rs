//! Handle binding, routing and destruction

use std::rc::Rc;

use super::{headless, EventLog, Probe};
use crate::events::{codes, keys, Event, EventResult};
use crate::foundation::Size;
use crate::platform::{CreateParams, ExtendedStyle, Platform, PlatformError, WindowStyle};
use crate::window::{EventTarget, Window, WindowConfig, WindowCreationError};

struct Refuser {
    window: Window,
}

impl EventTarget for Refuser {
    fn window(&self) -> &Window {
        &self.window
    }

    fn on_event(&self, event: &Event) -> EventResult {
        if event.code() == codes::CREATE {
            return EventResult::from_raw(0);
        }
        crate::window::default_event(self, event)
    }
}

struct Holder {
    probe: Option<Probe>,
}

#[test]
fn test_event_for_unattached_handle_reaches_no_object() {
    let (system, platform) = headless();
    let log = EventLog::default();
    let frame = Window::create(&system, &WindowConfig::new("Frame"), Probe::builder(&log)).unwrap();
    let params = CreateParams {
        class_name: "STATIC",
        title: "",
        style: WindowStyle::CHILD | WindowStyle::VISIBLE,
        extended_style: ExtendedStyle::empty(),
        rect: crate::foundation::Rect::new(0, 0, 10, 10),
        parent: Some(frame.window().native_handle()),
        control_id: 1,
    };
    let bare = platform.create_window(&params, None).unwrap();
    log.borrow_mut().clear();

    let event = Event::key_down(bare, keys::RETURN);
    platform.send(event);

    assert!(log.borrow().is_empty());
    assert!(platform.default_handled().contains(&event));
}

#[test]
fn test_moving_window_never_releases_twice() {
    let (system, platform) = headless();
    let log = EventLog::default();
    let window = Window::create(&system, &WindowConfig::new("Frame"), Probe::builder(&log)).unwrap();
    let handle = window.window().native_handle();

    let Ok(probe) = Rc::try_unwrap(window) else {
        panic!("freshly created window has a single owner");
    };
    let mut holder = Holder { probe: None };
    assert!(std::mem::replace(&mut holder.probe, Some(probe)).is_none());
    let Some(moved) = holder.probe.take() else {
        panic!("holder lost the window");
    };
    assert_eq!(moved.window().native_handle(), handle);

    drop(holder);
    assert!(platform.destroyed_windows().is_empty());
    assert!(platform.is_window(handle));

    drop(moved);
    assert_eq!(platform.destroyed_windows(), vec![handle]);
}

#[test]
fn test_destroy_during_drop_gets_default_handling() {
    let (system, platform) = headless();
    let log = EventLog::default();
    let window = Window::create(&system, &WindowConfig::new("Frame"), Probe::builder(&log)).unwrap();
    let handle = window.window().native_handle();

    drop(window);

    assert!(!log.borrow().contains(&(handle, codes::DESTROY)));
    assert!(platform
        .default_handled()
        .iter()
        .any(|event| event.target() == handle && event.code() == codes::DESTROY));
}

#[test]
fn test_rejected_creation_returns_no_object() {
    let (system, platform) = headless();

    let result = Window::create(&system, &WindowConfig::new("Refuser"), |window| Refuser { window });

    assert!(matches!(
        result,
        Err(WindowCreationError::Creation {
            source: PlatformError::CreationRejected,
            ..
        })
    ));
    assert_eq!(platform.window_count(), 0);
}

#[test]
fn test_same_class_registered_once_across_windows() {
    let (system, platform) = headless();
    let log = EventLog::default();
    let first = Window::create(&system, &WindowConfig::new("Frame"), Probe::builder(&log)).unwrap();
    let second = Window::create(&system, &WindowConfig::new("Frame"), Probe::builder(&log)).unwrap();

    assert_ne!(first.window().native_handle(), second.window().native_handle());
    assert_eq!(platform.class_registrations(), vec!["Frame".to_string()]);
}

#[test]
fn test_creation_delivers_create_then_resize() {
    let (system, _platform) = headless();
    let log = EventLog::default();
    let config = WindowConfig::new("Frame").with_size(Size::new(320, 200));
    let window = Window::create(&system, &config, Probe::builder(&log)).unwrap();
    let handle = window.window().native_handle();

    let seen = log.borrow().clone();
    assert_eq!(seen, vec![(handle, codes::CREATE), (handle, codes::SIZE)]);
    assert_eq!(window.window().client_size(), Size::new(320, 200));
}

#[test]
fn test_destroying_parent_unbinds_children() {
    let (system, platform) = headless();
    let log = EventLog::default();
    let parent = Window::create(&system, &WindowConfig::new("Frame"), Probe::builder(&log)).unwrap();
    let config = WindowConfig::child("Pane", parent.window().native_handle());
    let child = Window::create(&system, &config, Probe::builder(&log)).unwrap();
    let child_handle = child.window().native_handle();

    parent.window().destroy();

    assert!(!child.window().is_attached());
    assert!(log.borrow().contains(&(child_handle, codes::DESTROY)));
    drop(child);
    assert_eq!(
        platform
            .destroyed_windows()
            .iter()
            .filter(|handle| **handle == child_handle)
            .count(),
        1
    );
}
