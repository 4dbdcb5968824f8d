//! Cross-module scenarios on the headless platform

mod dispatch_scenarios;
mod resource_scenarios;
mod widget_scenarios;

use std::cell::RefCell;
use std::rc::Rc;

use crate::events::{Event, EventResult};
use crate::platform::{HeadlessPlatform, NativeHandle};
use crate::window::{default_event, ContractPolicy, EventTarget, Window, WindowSystem};

/// Shared record of `(target, code)` pairs a probe saw
pub(crate) type EventLog = Rc<RefCell<Vec<(NativeHandle, u32)>>>;

/// Window that records every envelope it handles
pub(crate) struct Probe {
    window: Window,
    log: EventLog,
}

impl Probe {
    pub(crate) fn builder(log: &EventLog) -> impl FnOnce(Window) -> Self {
        let log = Rc::clone(log);
        move |window| Self { window, log }
    }
}

impl EventTarget for Probe {
    fn window(&self) -> &Window {
        &self.window
    }

    fn on_event(&self, event: &Event) -> EventResult {
        self.log.borrow_mut().push((event.target(), event.code()));
        default_event(self, event)
    }
}

pub(crate) fn headless() -> (Rc<WindowSystem>, Rc<HeadlessPlatform>) {
    let _ = env_logger::builder().is_test(true).try_init();
    WindowSystem::headless(ContractPolicy::Report)
}
