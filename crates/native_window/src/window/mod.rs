//! Window objects
//!
//! A [`Window`] owns exactly one native handle for as long as the handle lives.
//! Concrete window kinds (layouts, widgets, application frames) embed a
//! `Window`, implement [`EventTarget`] and are created through
//! [`Window::create`], which wires the handle to the object before the first
//! envelope is delivered:
//!
//! ```text
//! Window::create ─► ensure class ─► Rc::new(object) ─► platform.create_window
//!                                                         │
//!                          creation notification ◄────────┘
//!                                   │
//!                      dispatch::route binds handle + slot
//!                                   │
//!                         object.on_event(CREATE)
//! ```
//!
//! Objects live in `Rc`; the handle's user-data slot only holds a `Weak`, so
//! the native side never keeps an object alive. Dropping the last `Rc`
//! destroys the handle.

pub mod dispatch;
pub mod system;

pub use system::{ContractPolicy, ContractViolation, WindowSystem};

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::events::{Event, EventResult, KeyEvent, MessageKind, ResizeEvent};
use crate::foundation::{Point, Rect, Size};
use crate::platform::{
    CreateParams, ExtendedStyle, NativeHandle, PlatformError, RawResource, TargetRef,
    WindowStyle,
};
use crate::resources::{Font, Icon};

/// Failure to bring a window into existence
#[derive(Error, Debug)]
pub enum WindowCreationError {
    /// The window class could not be registered
    #[error("failed to register window class `{class_name}`: {source}")]
    Registration {
        /// Class that failed
        class_name: String,
        /// Platform failure
        #[source]
        source: PlatformError,
    },

    /// The platform refused to create the handle
    #[error("failed to create `{class_name}` window: {source}")]
    Creation {
        /// Class of the window
        class_name: String,
        /// Platform failure
        #[source]
        source: PlatformError,
    },

    /// The handle is already managed by another object
    #[error(transparent)]
    Contract(#[from] ContractViolation),
}

/// Object that receives the envelopes of one native handle
///
/// Handlers take `&self`: the platform re-enters dispatch while a handler is
/// running (resizing a child sends it a resize notification on the spot), so
/// implementors keep mutable state in `Cell`/`RefCell` and never hold a borrow
/// across a platform call.
pub trait EventTarget: 'static {
    /// The embedded window
    fn window(&self) -> &Window;

    /// Handle one envelope
    ///
    /// Overrides should end with [`default_event`] for anything they do not
    /// consume.
    fn on_event(&self, event: &Event) -> EventResult {
        default_event(self, event)
    }

    /// Hook for resize notifications; `None` falls through to default handling
    fn on_resize(&self, _event: &ResizeEvent) -> Option<EventResult> {
        None
    }

    /// Hook for key-down notifications; `None` falls through to default handling
    fn on_keydown(&self, _event: &KeyEvent) -> Option<EventResult> {
        None
    }
}

/// Default event handling shared by every window
///
/// Resize and key-down notifications go to the matching hook first. Destroying
/// a top-level window posts the quit signal so closing the main window ends
/// the loop; child windows never do. Everything else reaches the platform's
/// default procedure.
pub fn default_event<T: EventTarget + ?Sized>(target: &T, event: &Event) -> EventResult {
    match event.kind() {
        MessageKind::Resize => {
            if let Some(result) = event.as_resize().and_then(|resize| target.on_resize(&resize)) {
                return result;
            }
        }
        MessageKind::KeyDown => {
            if let Some(result) = event.as_key().and_then(|key| target.on_keydown(&key)) {
                return result;
            }
        }
        MessageKind::Destroy => {
            let window = target.window();
            if window.is_top_level() {
                log::debug!("Top-level window {:?} destroyed", event.target());
                window.post_quit(0);
            }
            return EventResult::OK;
        }
        _ => {}
    }
    target.window().default_proc(event)
}

/// Parameters for [`Window::create`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    /// Class to create; registered on first use unless builtin
    pub class_name: String,
    /// Style flags
    pub style: WindowStyle,
    /// Extended style flags
    pub extended_style: ExtendedStyle,
    /// Initial position, relative to the parent's client area for children
    pub position: Point,
    /// Initial size
    pub size: Size,
    /// Parent handle
    pub parent: Option<NativeHandle>,
    /// The class is provided by the system (edit, button...)
    pub builtin_class: bool,
    /// Initial window text
    pub title: String,
}

impl WindowConfig {
    /// Top-level window of `class_name` with a standard frame
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            style: WindowStyle::OVERLAPPED_WINDOW,
            extended_style: ExtendedStyle::empty(),
            position: Point::default(),
            size: Size::new(640, 480),
            parent: None,
            builtin_class: false,
            title: String::new(),
        }
    }

    /// Visible child window of `class_name` inside `parent`
    pub fn child(class_name: impl Into<String>, parent: NativeHandle) -> Self {
        Self::new(class_name)
            .with_style(WindowStyle::CHILD | WindowStyle::VISIBLE)
            .with_size(Size::default())
            .with_parent(parent)
    }

    /// Visible child control of the system class `class_name`
    pub fn builtin(class_name: impl Into<String>, parent: NativeHandle) -> Self {
        Self::child(class_name, parent).with_builtin_class(true)
    }

    /// Replace the style flags
    pub fn with_style(mut self, style: WindowStyle) -> Self {
        self.style = style;
        self
    }

    /// Replace the extended style flags
    pub fn with_extended_style(mut self, extended_style: ExtendedStyle) -> Self {
        self.extended_style = extended_style;
        self
    }

    /// Set the initial position
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Set the initial size
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Set the parent handle
    pub fn with_parent(mut self, parent: NativeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Mark the class as system provided
    pub fn with_builtin_class(mut self, builtin_class: bool) -> Self {
        self.builtin_class = builtin_class;
        self
    }

    /// Set the initial window text
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Owner of one native window handle
///
/// Not `Clone`: two owners of one handle would destroy it twice. Moving a
/// `Window` moves the ownership; the object it is embedded in is pinned behind
/// an `Rc` once created, so the handle's back-reference stays valid.
pub struct Window {
    system: Rc<WindowSystem>,
    class_name: String,
    handle: Cell<Option<NativeHandle>>,
    icon: RefCell<Icon>,
    font: RefCell<Font>,
}

impl Window {
    fn unattached(system: &Rc<WindowSystem>, class_name: &str) -> Self {
        Self {
            system: Rc::clone(system),
            class_name: class_name.to_string(),
            handle: Cell::new(None),
            icon: RefCell::new(Icon::default()),
            font: RefCell::new(Font::default()),
        }
    }

    /// Create a native window managed by the object `build` returns
    ///
    /// `build` receives the not-yet-attached `Window` to embed. By the time
    /// this returns, the handle is bound to the object and every envelope for
    /// it (including the creation notification) has been routed to the
    /// object's `on_event`.
    pub fn create<T, F>(
        system: &Rc<WindowSystem>,
        config: &WindowConfig,
        build: F,
    ) -> Result<Rc<T>, WindowCreationError>
    where
        T: EventTarget,
        F: FnOnce(Self) -> T,
    {
        let class_name = config.class_name.as_str();
        if !config.builtin_class {
            system
                .ensure_class(class_name)
                .map_err(|source| WindowCreationError::Registration {
                    class_name: class_name.to_string(),
                    source,
                })?;
        }

        let target = Rc::new(build(Self::unattached(system, class_name)));
        let weak = Rc::downgrade(&target) as TargetRef;

        let params = CreateParams {
            class_name,
            title: &config.title,
            style: config.style,
            extended_style: config.extended_style,
            rect: Rect::from_parts(config.position, config.size),
            parent: config.parent,
            control_id: if config.parent.is_some() {
                system.next_control_id()
            } else {
                0
            },
        };
        let creation_target = (!config.builtin_class).then(|| weak.clone());
        let creation_error = |source: PlatformError| WindowCreationError::Creation {
            class_name: class_name.to_string(),
            source,
        };

        let platform = system.platform();
        let handle = platform
            .create_window(&params, creation_target)
            .map_err(creation_error)?;

        if config.builtin_class {
            target.window().bind(handle);
            platform.subclass(handle, weak).map_err(creation_error)?;
        } else if target.window().handle() != Some(handle) {
            // The creation notification never reached the trampoline
            target.window().bind(handle);
            platform.attach(handle, weak);
        }

        log::debug!("Created `{class_name}` window {handle:?}");
        Ok(target)
    }

    /// Take ownership of an existing native control
    ///
    /// The control's envelopes are routed through the object `build` returns;
    /// the handle is destroyed when that object is dropped. Adopting a handle
    /// that already routes through an object is a contract violation.
    pub fn adopt<T, F>(
        system: &Rc<WindowSystem>,
        handle: NativeHandle,
        build: F,
    ) -> Result<Rc<T>, WindowCreationError>
    where
        T: EventTarget,
        F: FnOnce(Self) -> T,
    {
        let platform = system.platform();
        let Some(class_name) = platform.class_name(handle) else {
            return Err(WindowCreationError::Creation {
                class_name: format!("<unknown class of {handle:?}>"),
                source: PlatformError::InvalidHandle(handle),
            });
        };
        if platform.attached(handle).is_some() {
            return Err(system.report(ContractViolation::AlreadySubclassed(handle)).into());
        }

        let target = Rc::new(build(Self::unattached(system, &class_name)));
        let weak = Rc::downgrade(&target) as TargetRef;
        match platform.subclass(handle, weak) {
            Ok(()) => {}
            Err(PlatformError::AlreadySubclassed(handle)) => {
                return Err(system.report(ContractViolation::AlreadySubclassed(handle)).into());
            }
            Err(source) => return Err(WindowCreationError::Creation { class_name, source }),
        }
        target.window().bind(handle);
        log::debug!("Adopted window {handle:?}");
        Ok(target)
    }

    /// Attach to `handle`; a window binds at most once
    pub(crate) fn bind(&self, handle: NativeHandle) {
        match self.handle.get() {
            None => self.handle.set(Some(handle)),
            Some(existing) if existing == handle => {}
            Some(existing) => {
                log::warn!("Window already bound to {existing:?}, ignoring {handle:?}");
            }
        }
    }

    /// Forget `handle` after the platform destroyed it
    pub(crate) fn forget_handle(&self, handle: NativeHandle) {
        if self.handle.get() == Some(handle) {
            self.handle.set(None);
        }
    }

    /// The shared windowing context
    pub fn system(&self) -> &Rc<WindowSystem> {
        &self.system
    }

    /// Class the window was created with
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The native handle, while attached
    pub fn handle(&self) -> Option<NativeHandle> {
        self.handle.get()
    }

    /// The native handle, or the null handle when not attached
    pub fn native_handle(&self) -> NativeHandle {
        self.handle.get().unwrap_or(NativeHandle::NULL)
    }

    /// True while the window owns a live handle
    pub fn is_attached(&self) -> bool {
        self.handle.get().is_some()
    }

    fn live_handle(&self) -> Result<NativeHandle, PlatformError> {
        self.handle
            .get()
            .ok_or(PlatformError::InvalidHandle(NativeHandle::NULL))
    }

    /// Current parent handle
    pub fn parent(&self) -> Option<NativeHandle> {
        self.handle
            .get()
            .and_then(|handle| self.system.platform().parent(handle))
    }

    /// True when the window has no parent
    pub fn is_top_level(&self) -> bool {
        self.parent().is_none()
    }

    /// Client-area size; empty when not attached
    pub fn client_size(&self) -> Size {
        self.handle
            .get()
            .and_then(|handle| self.system.platform().client_size(handle))
            .unwrap_or_default()
    }

    /// Window rectangle relative to the parent's client area
    pub fn rect(&self) -> Option<Rect> {
        self.handle
            .get()
            .and_then(|handle| self.system.platform().window_rect(handle))
    }

    /// Move and resize the window
    pub fn set_rect(&self, rect: Rect) -> Result<(), PlatformError> {
        self.system.platform().set_window_rect(self.live_handle()?, rect)
    }

    /// Window text
    pub fn text(&self) -> String {
        self.handle
            .get()
            .map(|handle| self.system.platform().text(handle))
            .unwrap_or_default()
    }

    /// Replace the window text
    pub fn set_text(&self, text: &str) -> Result<(), PlatformError> {
        self.system.platform().set_text(self.live_handle()?, text)
    }

    /// Show or hide the window
    pub fn show(&self, visible: bool) {
        if let Some(handle) = self.handle.get() {
            self.system.platform().show(handle, visible);
        }
    }

    /// Give the window an icon
    ///
    /// The window keeps the icon alive until it is replaced or the window is
    /// dropped. Assigning an empty icon clears it.
    pub fn set_icon(&self, icon: Icon) {
        if let Some(handle) = self.handle.get() {
            self.system.platform().set_icon(handle, icon.raw());
        }
        let previous = self.icon.replace(icon);
        drop(previous);
    }

    /// Raw handle of the current icon
    pub fn icon_handle(&self) -> RawResource {
        self.icon.borrow().raw()
    }

    /// Give the window a font, with the same ownership rules as icons
    pub fn set_font(&self, font: Font) {
        if let Some(handle) = self.handle.get() {
            self.system.platform().set_font(handle, font.raw());
        }
        let previous = self.font.replace(font);
        drop(previous);
    }

    /// Raw handle of the current font
    pub fn font_handle(&self) -> RawResource {
        self.font.borrow().raw()
    }

    /// Hand an envelope to the platform's default procedure
    pub fn default_proc(&self, event: &Event) -> EventResult {
        EventResult::from_raw(self.system.platform().default_proc(event))
    }

    /// Ask the loop to stop with `exit_code`
    pub fn post_quit(&self, exit_code: i32) {
        self.system.post_quit(exit_code);
    }

    /// Destroy the handle now instead of on drop
    pub fn destroy(&self) {
        if let Some(handle) = self.handle.get() {
            self.system.platform().destroy_window(handle);
            self.handle.set(None);
        }
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if self.system.platform().destroy_window(handle) {
                log::debug!("Destroyed `{}` window {handle:?}", self.class_name);
            }
        }
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("class_name", &self.class_name)
            .field("handle", &self.handle.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::codes;
    use crate::platform::Platform;

    struct Probe {
        window: Window,
        seen: RefCell<Vec<u32>>,
        bound_on_create: Cell<bool>,
    }

    impl EventTarget for Probe {
        fn window(&self) -> &Window {
            &self.window
        }

        fn on_event(&self, event: &Event) -> EventResult {
            if event.code() == codes::CREATE {
                self.bound_on_create.set(self.window.handle() == Some(event.target()));
            }
            self.seen.borrow_mut().push(event.code());
            default_event(self, event)
        }
    }

    fn probe(window: Window) -> Probe {
        Probe {
            window,
            seen: RefCell::new(Vec::new()),
            bound_on_create: Cell::new(false),
        }
    }

    #[test]
    fn test_create_binds_before_first_event() {
        let (system, _platform) = WindowSystem::headless(ContractPolicy::Report);
        let window = Window::create(&system, &WindowConfig::new("Probe"), probe).unwrap();

        assert!(window.bound_on_create.get());
        assert_eq!(window.seen.borrow().first(), Some(&codes::CREATE));
        assert!(window.window().is_attached());
    }

    #[test]
    fn test_drop_destroys_handle_once() {
        let (system, platform) = WindowSystem::headless(ContractPolicy::Report);
        let window = Window::create(&system, &WindowConfig::new("Probe"), probe).unwrap();
        let handle = window.window().native_handle();

        drop(window);

        assert!(!platform.is_window(handle));
        assert_eq!(platform.destroyed_windows(), vec![handle]);
    }

    #[test]
    fn test_explicit_destroy_then_drop_is_noop() {
        let (system, platform) = WindowSystem::headless(ContractPolicy::Report);
        let window = Window::create(&system, &WindowConfig::new("Probe"), probe).unwrap();
        let handle = window.window().native_handle();

        window.window().destroy();
        assert!(!window.window().is_attached());
        assert!(window.seen.borrow().contains(&codes::DESTROY));
        drop(window);

        assert_eq!(platform.destroyed_windows(), vec![handle]);
    }

    #[test]
    fn test_registration_failure_surfaces() {
        let (system, platform) = WindowSystem::headless(ContractPolicy::Report);
        platform.reject_class("Probe");

        let result = Window::create(&system, &WindowConfig::new("Probe"), probe);

        assert!(matches!(
            result,
            Err(WindowCreationError::Registration { .. })
        ));
    }

    #[test]
    fn test_builtin_control_is_subclassed() {
        let (system, platform) = WindowSystem::headless(ContractPolicy::Report);
        let parent = Window::create(&system, &WindowConfig::new("Probe"), probe).unwrap();
        let config = WindowConfig::builtin("EDIT", parent.window().native_handle());
        let edit = Window::create(&system, &config, probe).unwrap();
        let handle = edit.window().native_handle();

        assert!(edit.seen.borrow().is_empty());
        assert!(platform.attached(handle).is_some());
        assert!(platform.control_id(handle).is_some_and(|id| id != 0));
        assert!(!system.is_class_registered("EDIT"));
    }

    #[test]
    fn test_adopting_managed_handle_is_violation() {
        let (system, _platform) = WindowSystem::headless(ContractPolicy::Report);
        let window = Window::create(&system, &WindowConfig::new("Probe"), probe).unwrap();
        let handle = window.window().native_handle();

        let result = Window::adopt(&system, handle, probe);

        assert!(matches!(
            result,
            Err(WindowCreationError::Contract(ContractViolation::AlreadySubclassed(h))) if h == handle
        ));
    }

    #[test]
    fn test_adopt_takes_class_name_from_platform() {
        let (system, platform) = WindowSystem::headless(ContractPolicy::Report);
        let parent = Window::create(&system, &WindowConfig::new("Probe"), probe).unwrap();
        let params = CreateParams {
            class_name: "EDIT",
            title: "",
            style: WindowStyle::CHILD,
            extended_style: ExtendedStyle::empty(),
            rect: Rect::new(0, 0, 10, 10),
            parent: Some(parent.window().native_handle()),
            control_id: 7,
        };
        let handle = platform.create_window(&params, None).unwrap();

        let adopted = Window::adopt(&system, handle, probe).unwrap();

        assert_eq!(adopted.window().class_name(), "EDIT");
        assert!(platform.attached(handle).is_some());
        drop(adopted);
        assert!(!platform.is_window(handle));
    }

    #[test]
    fn test_adopt_invalid_handle_names_the_handle() {
        let (system, _platform) = WindowSystem::headless(ContractPolicy::Report);
        let bogus = NativeHandle::from_raw(0xDEAD);

        let result = Window::adopt(&system, bogus, probe);

        match result {
            Err(WindowCreationError::Creation { class_name, source }) => {
                assert!(!class_name.is_empty());
                assert!(class_name.contains("57005"));
                assert_eq!(source, PlatformError::InvalidHandle(bogus));
            }
            other => panic!("expected creation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_text_roundtrip_through_platform() {
        let (system, _platform) = WindowSystem::headless(ContractPolicy::Report);
        let config = WindowConfig::new("Probe").with_title("Initial");
        let window = Window::create(&system, &config, probe).unwrap();

        assert_eq!(window.window().text(), "Initial");
        window.window().set_text("Changed").unwrap();
        assert_eq!(window.window().text(), "Changed");
    }
}
