//! The application's message loop
//!
//! [`MessageLoop::run`] pumps the platform queue until the quit signal
//! arrives. Each retrieved envelope first passes the registered filters in
//! registration order; the first filter that answers [`Filter::Discard`] drops
//! the envelope and the remaining filters are skipped. Surviving envelopes are
//! translated (key presses produce character events) and dispatched to their
//! window.

use std::rc::Rc;

use crate::events::Event;
use crate::platform::{NativeMessage, PlatformError};
use crate::window::WindowSystem;

/// Verdict of a message filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Let the envelope continue
    Keep,
    /// Drop the envelope
    Discard,
}

type FilterFn = Box<dyn FnMut(&Event) -> Filter>;

/// Pump of the platform queue
pub struct MessageLoop {
    system: Rc<WindowSystem>,
    filters: Vec<FilterFn>,
}

impl MessageLoop {
    /// Create a loop with no filters
    pub fn new(system: &Rc<WindowSystem>) -> Self {
        Self {
            system: Rc::clone(system),
            filters: Vec::new(),
        }
    }

    /// Register a filter; it runs after every earlier filter
    pub fn add_filter(&mut self, filter: impl FnMut(&Event) -> Filter + 'static) {
        self.filters.push(Box::new(filter));
    }

    /// Number of registered filters
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Run until the quit signal and return its exit code
    ///
    /// Fails when the platform cannot retrieve an envelope.
    pub fn run(&mut self) -> Result<i32, PlatformError> {
        log::info!("Starting message loop...");
        let platform = self.system.platform();
        loop {
            match platform.next_message()? {
                NativeMessage::Quit(exit_code) => {
                    log::info!("Message loop finished with exit code {exit_code}");
                    return Ok(exit_code);
                }
                NativeMessage::Event(event) => {
                    if self
                        .filters
                        .iter_mut()
                        .any(|filter| filter(&event) == Filter::Discard)
                    {
                        log::trace!("Filtered out {event:?}");
                        continue;
                    }
                    platform.translate(&event);
                    platform.dispatch(&event);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::platform::{NativeHandle, Platform};
    use crate::window::ContractPolicy;

    #[test]
    fn test_returns_posted_exit_code() {
        let (system, platform) = WindowSystem::headless(ContractPolicy::Report);
        platform.post_quit(7);

        assert_eq!(MessageLoop::new(&system).run(), Ok(7));
    }

    #[test]
    fn test_exhausted_queue_is_an_error() {
        let (system, _platform) = WindowSystem::headless(ContractPolicy::Report);
        assert_eq!(
            MessageLoop::new(&system).run(),
            Err(PlatformError::QueueExhausted)
        );
    }

    #[test]
    fn test_first_discard_short_circuits() {
        let (system, platform) = WindowSystem::headless(ContractPolicy::Report);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut message_loop = MessageLoop::new(&system);
        for (name, verdict) in [("a", Filter::Keep), ("b", Filter::Discard), ("c", Filter::Keep)] {
            let calls = Rc::clone(&calls);
            message_loop.add_filter(move |_| {
                calls.borrow_mut().push(name);
                verdict
            });
        }

        platform.post(Event::close(NativeHandle::from_raw(1)));
        platform.post_quit(0);
        message_loop.run().unwrap();

        assert_eq!(*calls.borrow(), vec!["a", "b"]);
        assert!(platform.default_handled().is_empty());
    }
}
