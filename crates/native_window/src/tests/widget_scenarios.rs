//! Widgets hearing their own notifications through a parent layout

use std::cell::RefCell;
use std::rc::Rc;

use super::headless;
use crate::events::{notifications, Event};
use crate::foundation::Size;
use crate::layout::VerticalLayout;
use crate::platform::Platform;
use crate::widgets::{Button, TextInput};
use crate::window::{EventTarget, WindowConfig};

#[test]
fn test_text_changed_updates_cache_and_notifies_in_order() {
    let (system, platform) = headless();
    let frame = VerticalLayout::create(&system, &WindowConfig::new("Frame")).unwrap();
    let parent = frame.window().native_handle();
    let input = TextInput::create(&system, parent, "", Size::new(100, 24)).unwrap();
    frame.add_element(&input).unwrap();

    let calls = Rc::new(RefCell::new(Vec::new()));
    for name in ["first", "second"] {
        let calls = Rc::clone(&calls);
        input
            .text_changed()
            .subscribe(move |text| calls.borrow_mut().push(format!("{name}:{text}")));
    }

    platform.set_text(input.window().native_handle(), "C:\\Users").unwrap();

    assert_eq!(input.text(), "C:\\Users");
    assert_eq!(*calls.borrow(), vec!["first:C:\\Users", "second:C:\\Users"]);
}

#[test]
fn test_direct_notification_without_layout() {
    let (system, _platform) = headless();
    let frame = VerticalLayout::create(&system, &WindowConfig::new("Frame")).unwrap();
    let parent = frame.window().native_handle();
    let input = TextInput::create(&system, parent, "old", Size::new(100, 24)).unwrap();
    let handle = input.window().native_handle();
    input.window().set_text("new").unwrap();
    let hits = Rc::new(RefCell::new(0));
    {
        let hits = Rc::clone(&hits);
        input.text_changed().subscribe(move |_| *hits.borrow_mut() += 1);
    }

    // Not an item of the frame, so the notification went nowhere
    assert_eq!(input.text(), "old");

    input.on_event(&Event::command(parent, 1, notifications::TEXT_CHANGED, handle));

    assert_eq!(input.text(), "new");
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn test_notification_from_other_control_is_ignored() {
    let (system, _platform) = headless();
    let frame = VerticalLayout::create(&system, &WindowConfig::new("Frame")).unwrap();
    let parent = frame.window().native_handle();
    let input = TextInput::create(&system, parent, "", Size::new(100, 24)).unwrap();
    let other = TextInput::create(&system, parent, "", Size::new(100, 24)).unwrap();
    let hits = Rc::new(RefCell::new(0));
    {
        let hits = Rc::clone(&hits);
        input.text_changed().subscribe(move |_| *hits.borrow_mut() += 1);
    }

    input.on_event(&Event::command(
        parent,
        1,
        notifications::TEXT_CHANGED,
        other.window().native_handle(),
    ));

    assert_eq!(*hits.borrow(), 0);
}

#[test]
fn test_unsubscribed_handler_is_not_called() {
    let (system, platform) = headless();
    let frame = VerticalLayout::create(&system, &WindowConfig::new("Frame")).unwrap();
    let input =
        TextInput::create(&system, frame.window().native_handle(), "", Size::new(100, 24)).unwrap();
    frame.add_element(&input).unwrap();
    let hits = Rc::new(RefCell::new(0));
    let id = {
        let hits = Rc::clone(&hits);
        input.text_changed().subscribe(move |_| *hits.borrow_mut() += 1)
    };

    platform.set_text(input.window().native_handle(), "a").unwrap();
    assert!(input.text_changed().unsubscribe(id));
    platform.set_text(input.window().native_handle(), "b").unwrap();

    assert_eq!(*hits.borrow(), 1);
    assert_eq!(input.text(), "b");
}

#[test]
fn test_button_click_reaches_subscribers() {
    let (system, platform) = headless();
    let frame = VerticalLayout::create(&system, &WindowConfig::new("Frame")).unwrap();
    let button =
        Button::create(&system, frame.window().native_handle(), "Go", Size::new(60, 24)).unwrap();
    frame.add_element(&button).unwrap();
    let clicks = Rc::new(RefCell::new(0));
    {
        let clicks = Rc::clone(&clicks);
        button.clicked().subscribe(move |()| *clicks.borrow_mut() += 1);
    }

    platform.click(button.window().native_handle()).unwrap();
    platform.click(button.window().native_handle()).unwrap();

    assert_eq!(*clicks.borrow(), 2);
    assert_eq!(button.window().text(), "Go");
}
