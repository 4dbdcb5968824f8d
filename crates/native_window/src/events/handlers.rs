//! Subscriber lists for semantic widget events
//!
//! Widgets expose one [`EventHandlerList`] per semantic event ("text changed",
//! "enter pressed", "clicked"). Subscribers run synchronously on the loop
//! thread in registration order. A subscriber may subscribe or unsubscribe
//! while the list is being invoked; the change takes effect on the next
//! invocation.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Token identifying one subscription, used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<A> = Rc<dyn Fn(&A)>;

/// Ordered list of subscribers receiving `&A`
pub struct EventHandlerList<A: ?Sized> {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(SubscriptionId, Handler<A>)>>,
}

impl<A: ?Sized> EventHandlerList<A> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Register a subscriber; it runs after every earlier subscriber
    pub fn subscribe(&self, handler: impl Fn(&A) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let handler: Handler<A> = Rc::new(handler);
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    /// Remove a subscriber; returns false when `id` is unknown
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    /// Invoke every subscriber with `args`
    pub fn invoke(&self, args: &A) {
        // Snapshot so subscribers can touch the list while running
        let snapshot: Vec<Handler<A>> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in snapshot {
            handler(args);
        }
    }

    /// Number of subscribers
    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// True when nobody is subscribed
    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }
}

impl<A: ?Sized> Default for EventHandlerList<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> fmt::Debug for EventHandlerList<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlerList")
            .field("subscribers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invokes_in_registration_order() {
        let list: EventHandlerList<str> = EventHandlerList::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            list.subscribe(move |text: &str| log.borrow_mut().push(format!("{name}:{text}")));
        }

        list.invoke("x");

        assert_eq!(*log.borrow(), vec!["first:x", "second:x", "third:x"]);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_handler() {
        let list: EventHandlerList<()> = EventHandlerList::new();
        let hits = Rc::new(Cell::new(0));
        let a = {
            let hits = Rc::clone(&hits);
            list.subscribe(move |()| hits.set(hits.get() + 1))
        };
        {
            let hits = Rc::clone(&hits);
            list.subscribe(move |()| hits.set(hits.get() + 10));
        }

        assert!(list.unsubscribe(a));
        assert!(!list.unsubscribe(a));
        list.invoke(&());

        assert_eq!(hits.get(), 10);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_subscribe_during_invoke_applies_next_time() {
        let list: Rc<EventHandlerList<()>> = Rc::new(EventHandlerList::new());
        let hits = Rc::new(Cell::new(0));
        {
            let inner_list = Rc::clone(&list);
            let hits = Rc::clone(&hits);
            list.subscribe(move |()| {
                let hits = Rc::clone(&hits);
                inner_list.subscribe(move |()| hits.set(hits.get() + 1));
            });
        }

        list.invoke(&());
        assert_eq!(hits.get(), 0);
        list.invoke(&());
        assert_eq!(hits.get(), 1);
    }
}
