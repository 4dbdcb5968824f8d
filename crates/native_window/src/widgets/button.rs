//! Button widget - push button control

use std::rc::Rc;

use crate::events::{notifications, Event, EventHandlerList, EventResult};
use crate::foundation::Size;
use crate::platform::NativeHandle;
use crate::window::{default_event, EventTarget, Window, WindowConfig, WindowCreationError, WindowSystem};

/// Push button on the system button class
///
/// Like [`super::TextInput`], it learns about clicks through its parent
/// layout forwarding the click notification.
pub struct Button {
    window: Window,
    clicked: EventHandlerList<()>,
}

impl Button {
    /// System class of the control
    pub const CLASS_NAME: &'static str = "BUTTON";

    /// Create a button inside `parent`
    pub fn create(
        system: &Rc<WindowSystem>,
        parent: NativeHandle,
        label: &str,
        size: Size,
    ) -> Result<Rc<Self>, WindowCreationError> {
        let config = WindowConfig::builtin(Self::CLASS_NAME, parent)
            .with_size(size)
            .with_title(label);
        Window::create(system, &config, |window| Self {
            window,
            clicked: EventHandlerList::new(),
        })
    }

    /// Subscribers called on every click
    pub fn clicked(&self) -> &EventHandlerList<()> {
        &self.clicked
    }
}

impl EventTarget for Button {
    fn window(&self) -> &Window {
        &self.window
    }

    fn on_event(&self, event: &Event) -> EventResult {
        if let Some(command) = event.as_command() {
            if Some(command.source()) == self.window.handle()
                && command.notification() == notifications::CLICKED
            {
                self.clicked.invoke(&());
                return EventResult::OK;
            }
        }
        default_event(self, event)
    }
}
