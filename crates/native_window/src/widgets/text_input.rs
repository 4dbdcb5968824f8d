//! Text input widget - single-line edit control

use std::cell::RefCell;
use std::rc::Rc;

use crate::events::{keys, notifications, Event, EventHandlerList, EventResult, KeyEvent};
use crate::foundation::Size;
use crate::platform::{ExtendedStyle, NativeHandle, PlatformError, WindowStyle};
use crate::window::{default_event, EventTarget, Window, WindowConfig, WindowCreationError, WindowSystem};

/// Edit style: scroll horizontally instead of wrapping
const AUTO_HORIZONTAL_SCROLL: u32 = 0x0080;

/// Single-line text field on the system edit class
///
/// The system delivers the edit control's "text changed" notification to its
/// parent. Place the field in a [`crate::layout::Layout`] (which forwards the
/// notification back here) to keep [`TextInput::text`] current and to fire
/// [`TextInput::text_changed`].
pub struct TextInput {
    window: Window,
    text: RefCell<String>,
    text_changed: EventHandlerList<str>,
    enter_pressed: EventHandlerList<str>,
}

impl TextInput {
    /// System class of the control
    pub const CLASS_NAME: &'static str = "EDIT";

    /// Create a field inside `parent` with `initial` text
    pub fn create(
        system: &Rc<WindowSystem>,
        parent: NativeHandle,
        initial: &str,
        size: Size,
    ) -> Result<Rc<Self>, WindowCreationError> {
        let config = WindowConfig::builtin(Self::CLASS_NAME, parent)
            .with_style(
                WindowStyle::CHILD
                    | WindowStyle::VISIBLE
                    | WindowStyle::from_bits_retain(AUTO_HORIZONTAL_SCROLL),
            )
            .with_extended_style(ExtendedStyle::CLIENT_EDGE)
            .with_size(size)
            .with_title(initial);
        Window::create(system, &config, |window| Self {
            window,
            text: RefCell::new(initial.to_string()),
            text_changed: EventHandlerList::new(),
            enter_pressed: EventHandlerList::new(),
        })
    }

    /// Text as of the last change notification
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    /// Replace the text; subscribers hear about it through the change notification
    pub fn set_text(&self, text: &str) -> Result<(), PlatformError> {
        self.window.set_text(text)
    }

    /// Subscribers called with the new text after every change
    pub fn text_changed(&self) -> &EventHandlerList<str> {
        &self.text_changed
    }

    /// Subscribers called with the current text when Enter is pressed
    pub fn enter_pressed(&self) -> &EventHandlerList<str> {
        &self.enter_pressed
    }

    fn refresh(&self) {
        let current = self.window.text();
        *self.text.borrow_mut() = current.clone();
        self.text_changed.invoke(&current);
    }
}

impl EventTarget for TextInput {
    fn window(&self) -> &Window {
        &self.window
    }

    fn on_event(&self, event: &Event) -> EventResult {
        if let Some(command) = event.as_command() {
            if Some(command.source()) == self.window.handle()
                && command.notification() == notifications::TEXT_CHANGED
            {
                self.refresh();
                return EventResult::OK;
            }
        }
        default_event(self, event)
    }

    fn on_keydown(&self, event: &KeyEvent) -> Option<EventResult> {
        if event.key_code() != keys::RETURN {
            return None;
        }
        let text = self.text();
        log::debug!("Enter pressed in text input with {text:?}");
        self.enter_pressed.invoke(&text);
        Some(EventResult::OK)
    }
}
