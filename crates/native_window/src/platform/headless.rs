//! In-process implementation of the windowing protocol
//!
//! `HeadlessPlatform` keeps every native object in memory and follows the same
//! ordering rules as the native protocol where the object model depends on
//! them:
//!
//! - the creation notification is routed during `create_window`, followed by
//!   an initial resize notification; a zero result from the creation
//!   notification rejects the window
//! - `set_window_rect` sends a resize notification synchronously when the size
//!   changes
//! - destroying a window notifies it first, then destroys its children
//! - changing the text of an edit control notifies its parent
//! - translating a printable key-down queues a character event, which an edit
//!   control appends to its text
//! - the quit signal is only retrieved once the queue is otherwise empty
//!
//! It also journals what happened (class registrations, destroyed windows,
//! released resources, default-handled envelopes) so tests can assert on
//! exactly-once behaviour. Client sizes equal window sizes: there is no
//! non-client frame.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};

use slotmap::{DefaultKey, Key, KeyData, SlotMap};

use super::{
    CreateParams, ExtendedStyle, NativeHandle, NativeMessage, Platform, PlatformError,
    PlatformResult, RawResource, TargetRef, WindowStyle,
};
use crate::events::{codes, keys, notifications, Event};
use crate::foundation::{Rect, Size};
use crate::resources::ResourceKind;
use crate::window::dispatch;

/// System classes the headless back-end knows how to emulate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuiltinClass {
    Edit,
    Button,
    Static,
}

impl BuiltinClass {
    fn lookup(class_name: &str) -> Option<Self> {
        if class_name.eq_ignore_ascii_case("EDIT") {
            Some(Self::Edit)
        } else if class_name.eq_ignore_ascii_case("BUTTON") {
            Some(Self::Button)
        } else if class_name.eq_ignore_ascii_case("STATIC") {
            Some(Self::Static)
        } else {
            None
        }
    }
}

struct HeadlessWindow {
    class_name: String,
    builtin: Option<BuiltinClass>,
    text: String,
    style: WindowStyle,
    extended_style: ExtendedStyle,
    parent: Option<NativeHandle>,
    rect: Rect,
    control_id: u16,
    visible: bool,
    creation_target: Option<TargetRef>,
    user_data: Option<TargetRef>,
    subclassed: bool,
    icon: RawResource,
    font: RawResource,
}

struct HeadlessResource {
    kind: ResourceKind,
    name: String,
}

#[derive(Default)]
struct HeadlessState {
    windows: SlotMap<DefaultKey, HeadlessWindow>,
    classes: HashSet<String>,
    queue: VecDeque<Event>,
    quit: Option<i32>,
    resources: SlotMap<DefaultKey, HeadlessResource>,

    // Journals and failure injection
    class_registrations: Vec<String>,
    destroyed: Vec<NativeHandle>,
    released: Vec<RawResource>,
    default_handled: Vec<Event>,
    rejected_classes: HashSet<String>,
    rejected_creations: HashSet<String>,
    missing_resources: HashSet<String>,
}

impl HeadlessState {
    fn window(&self, handle: NativeHandle) -> Option<&HeadlessWindow> {
        self.windows.get(key_of(handle.as_raw()))
    }

    fn window_mut(&mut self, handle: NativeHandle) -> Option<&mut HeadlessWindow> {
        self.windows.get_mut(key_of(handle.as_raw()))
    }
}

fn key_of(raw: usize) -> DefaultKey {
    DefaultKey::from(KeyData::from_ffi(raw as u64))
}

fn handle_of(key: DefaultKey) -> NativeHandle {
    NativeHandle::from_raw(key.data().as_ffi() as usize)
}

fn resource_of(key: DefaultKey) -> RawResource {
    RawResource::from_raw(key.data().as_ffi() as usize)
}

/// Simulated windowing subsystem for tests and non-Windows hosts
#[derive(Default)]
pub struct HeadlessPlatform {
    state: RefCell<HeadlessState>,
}

impl HeadlessPlatform {
    /// Create an empty subsystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Class names registered so far, in registration order
    pub fn class_registrations(&self) -> Vec<String> {
        self.state.borrow().class_registrations.clone()
    }

    /// Handles destroyed so far, in destruction order
    pub fn destroyed_windows(&self) -> Vec<NativeHandle> {
        self.state.borrow().destroyed.clone()
    }

    /// Resources released so far, in release order
    pub fn released_resources(&self) -> Vec<RawResource> {
        self.state.borrow().released.clone()
    }

    /// Envelopes that reached default handling, in order
    pub fn default_handled(&self) -> Vec<Event> {
        self.state.borrow().default_handled.clone()
    }

    /// Number of live windows
    pub fn window_count(&self) -> usize {
        self.state.borrow().windows.len()
    }

    /// Number of live resources
    pub fn live_resource_count(&self) -> usize {
        self.state.borrow().resources.len()
    }

    /// True while `raw` names a live resource
    pub fn is_resource_live(&self, raw: RawResource) -> bool {
        self.state.borrow().resources.contains_key(key_of(raw.as_raw()))
    }

    /// Direct children of `handle`
    pub fn children(&self, handle: NativeHandle) -> Vec<NativeHandle> {
        let state = self.state.borrow();
        state
            .windows
            .iter()
            .filter(|(_, window)| window.parent == Some(handle))
            .map(|(key, _)| handle_of(key))
            .collect()
    }

    /// Style flags of a live window
    pub fn style(&self, handle: NativeHandle) -> Option<WindowStyle> {
        self.state.borrow().window(handle).map(|w| w.style)
    }

    /// Extended style flags of a live window
    pub fn extended_style(&self, handle: NativeHandle) -> Option<ExtendedStyle> {
        self.state.borrow().window(handle).map(|w| w.extended_style)
    }

    /// Control identifier of a live window
    pub fn control_id(&self, handle: NativeHandle) -> Option<u16> {
        self.state.borrow().window(handle).map(|w| w.control_id)
    }

    /// Visibility of a live window
    pub fn is_visible(&self, handle: NativeHandle) -> bool {
        self.state.borrow().window(handle).is_some_and(|w| w.visible)
    }

    /// Icon currently assigned to a window
    pub fn icon(&self, handle: NativeHandle) -> RawResource {
        self.state
            .borrow()
            .window(handle)
            .map_or(RawResource::NULL, |w| w.icon)
    }

    /// Font currently assigned to a window
    pub fn font(&self, handle: NativeHandle) -> RawResource {
        self.state
            .borrow()
            .window(handle)
            .map_or(RawResource::NULL, |w| w.font)
    }

    /// Number of queued envelopes
    pub fn pending_messages(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Make class registration fail for `class_name`
    pub fn reject_class(&self, class_name: &str) {
        self.state
            .borrow_mut()
            .rejected_classes
            .insert(class_name.to_string());
    }

    /// Make window creation fail for `class_name`
    pub fn reject_creation(&self, class_name: &str) {
        self.state
            .borrow_mut()
            .rejected_creations
            .insert(class_name.to_string());
    }

    /// Make loading the stock resource `name` fail
    pub fn mark_missing_resource(&self, name: &str) {
        self.state
            .borrow_mut()
            .missing_resources
            .insert(name.to_string());
    }

    /// Simulate the user resizing a window's client area
    pub fn resize(&self, handle: NativeHandle, size: Size) -> PlatformResult<()> {
        let origin = self
            .window_rect(handle)
            .ok_or(PlatformError::InvalidHandle(handle))?
            .origin();
        self.set_window_rect(handle, Rect::from_parts(origin, size))
    }

    /// Simulate the user clicking a button control
    pub fn click(&self, handle: NativeHandle) -> PlatformResult<()> {
        if !self.is_window(handle) {
            return Err(PlatformError::InvalidHandle(handle));
        }
        self.notify_parent(handle, notifications::CLICKED);
        Ok(())
    }

    /// Send a command notification from `child` to its parent
    fn notify_parent(&self, child: NativeHandle, notification: u16) {
        let route = {
            let state = self.state.borrow();
            state
                .window(child)
                .and_then(|w| w.parent.map(|parent| (parent, w.control_id)))
        };
        if let Some((parent, control_id)) = route {
            self.send(Event::command(parent, control_id, notification, child));
        }
    }

    fn builtin_of(&self, handle: NativeHandle) -> Option<BuiltinClass> {
        self.state.borrow().window(handle).and_then(|w| w.builtin)
    }

    /// Default procedure of the emulated edit control
    fn edit_proc(&self, event: &Event) -> isize {
        if event.code() != codes::CHAR {
            return 0;
        }
        let handle = event.target();
        let changed = {
            let mut state = self.state.borrow_mut();
            let Some(window) = state.window_mut(handle) else {
                return 0;
            };
            match char::from_u32(event.word_param() as u32) {
                Some(ch) if ch as u32 == keys::BACK => window.text.pop().is_some(),
                Some(ch) if !ch.is_control() => {
                    window.text.push(ch);
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.notify_parent(handle, notifications::TEXT_CHANGED);
        }
        0
    }
}

/// Character a key-down composes into, if any
///
/// Only keys whose virtual code equals their character produce one;
/// navigation and editing keys in the same range (arrows, Delete) do not.
fn composed_char(key_code: u32) -> Option<u32> {
    let composes = key_code == keys::BACK
        || key_code == keys::SPACE
        || (u32::from(b'0')..=u32::from(b'9')).contains(&key_code)
        || (u32::from(b'A')..=u32::from(b'Z')).contains(&key_code);
    composes.then_some(key_code)
}

impl Platform for HeadlessPlatform {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn class_name(&self, handle: NativeHandle) -> Option<String> {
        self.state.borrow().window(handle).map(|w| w.class_name.clone())
    }

    fn register_class(&self, class_name: &str) -> PlatformResult<()> {
        let mut state = self.state.borrow_mut();
        if state.rejected_classes.contains(class_name) {
            return Err(PlatformError::ClassRegistration(format!(
                "class `{class_name}` was rejected"
            )));
        }
        if !state.classes.insert(class_name.to_string()) {
            return Err(PlatformError::ClassRegistration(format!(
                "class `{class_name}` already exists"
            )));
        }
        state.class_registrations.push(class_name.to_string());
        Ok(())
    }

    fn create_window(
        &self,
        params: &CreateParams<'_>,
        creation_target: Option<TargetRef>,
    ) -> PlatformResult<NativeHandle> {
        let builtin = BuiltinClass::lookup(params.class_name);
        let handle = {
            let mut state = self.state.borrow_mut();
            if state.rejected_creations.contains(params.class_name) {
                return Err(PlatformError::WindowCreation(format!(
                    "creation of `{}` was rejected",
                    params.class_name
                )));
            }
            if builtin.is_none() && !state.classes.contains(params.class_name) {
                return Err(PlatformError::WindowCreation(format!(
                    "class `{}` is not registered",
                    params.class_name
                )));
            }
            if let Some(parent) = params.parent {
                if state.window(parent).is_none() {
                    return Err(PlatformError::InvalidHandle(parent));
                }
            } else if params.style.contains(WindowStyle::CHILD) {
                return Err(PlatformError::WindowCreation(
                    "child window requires a parent".to_string(),
                ));
            }
            let key = state.windows.insert(HeadlessWindow {
                class_name: params.class_name.to_string(),
                builtin,
                text: params.title.to_string(),
                style: params.style,
                extended_style: params.extended_style,
                parent: params.parent,
                rect: params.rect,
                control_id: params.control_id,
                visible: params.style.contains(WindowStyle::VISIBLE),
                creation_target,
                user_data: None,
                subclassed: false,
                icon: RawResource::NULL,
                font: RawResource::NULL,
            });
            handle_of(key)
        };

        // Builtin classes run their own procedure and never see the trampoline
        if builtin.is_none() {
            if dispatch::route(self, Event::create(handle, 0)) == 0 {
                let mut state = self.state.borrow_mut();
                state.windows.remove(key_of(handle.as_raw()));
                return Err(PlatformError::CreationRejected);
            }
            dispatch::route(self, Event::resize(handle, params.rect.size()));
        }
        Ok(handle)
    }

    fn destroy_window(&self, handle: NativeHandle) -> bool {
        if !self.is_window(handle) {
            return false;
        }
        dispatch::route(self, Event::destroy(handle));
        for child in self.children(handle) {
            self.destroy_window(child);
        }
        let mut state = self.state.borrow_mut();
        if state.windows.remove(key_of(handle.as_raw())).is_some() {
            state.destroyed.push(handle);
            true
        } else {
            false
        }
    }

    fn is_window(&self, handle: NativeHandle) -> bool {
        self.state.borrow().window(handle).is_some()
    }

    fn take_creation_target(&self, event: &Event) -> Option<TargetRef> {
        if event.code() != codes::CREATE {
            return None;
        }
        self.state
            .borrow_mut()
            .window_mut(event.target())
            .and_then(|w| w.creation_target.take())
    }

    fn attach(&self, handle: NativeHandle, target: TargetRef) {
        if let Some(window) = self.state.borrow_mut().window_mut(handle) {
            window.user_data = Some(target);
        }
    }

    fn attached(&self, handle: NativeHandle) -> Option<TargetRef> {
        self.state
            .borrow()
            .window(handle)
            .and_then(|w| w.user_data.clone())
    }

    fn detach(&self, handle: NativeHandle) {
        if let Some(window) = self.state.borrow_mut().window_mut(handle) {
            window.user_data = None;
        }
    }

    fn subclass(&self, handle: NativeHandle, target: TargetRef) -> PlatformResult<()> {
        let mut state = self.state.borrow_mut();
        let window = state
            .window_mut(handle)
            .ok_or(PlatformError::InvalidHandle(handle))?;
        if window.subclassed || window.user_data.is_some() {
            return Err(PlatformError::AlreadySubclassed(handle));
        }
        window.subclassed = true;
        window.user_data = Some(target);
        Ok(())
    }

    fn default_proc(&self, event: &Event) -> isize {
        self.state.borrow_mut().default_handled.push(*event);
        let handle = event.target();
        match self.builtin_of(handle) {
            Some(BuiltinClass::Edit) => self.edit_proc(event),
            Some(BuiltinClass::Button | BuiltinClass::Static) => 0,
            None => match event.code() {
                codes::CREATE => 1,
                codes::CLOSE => {
                    self.destroy_window(handle);
                    0
                }
                _ => 0,
            },
        }
    }

    fn parent(&self, handle: NativeHandle) -> Option<NativeHandle> {
        self.state.borrow().window(handle).and_then(|w| w.parent)
    }

    fn set_parent(&self, child: NativeHandle, parent: Option<NativeHandle>) -> PlatformResult<()> {
        let mut state = self.state.borrow_mut();
        if let Some(parent) = parent {
            if state.window(parent).is_none() {
                return Err(PlatformError::InvalidHandle(parent));
            }
        }
        let window = state
            .window_mut(child)
            .ok_or(PlatformError::InvalidHandle(child))?;
        window.parent = parent;
        Ok(())
    }

    fn window_rect(&self, handle: NativeHandle) -> Option<Rect> {
        self.state.borrow().window(handle).map(|w| w.rect)
    }

    fn client_size(&self, handle: NativeHandle) -> Option<Size> {
        self.window_rect(handle).map(|rect| rect.size())
    }

    fn set_window_rect(&self, handle: NativeHandle, rect: Rect) -> PlatformResult<()> {
        let resized = {
            let mut state = self.state.borrow_mut();
            let window = state
                .window_mut(handle)
                .ok_or(PlatformError::InvalidHandle(handle))?;
            let resized = window.rect.size() != rect.size();
            window.rect = rect;
            resized
        };
        if resized {
            self.send(Event::resize(handle, rect.size()));
        }
        Ok(())
    }

    fn text(&self, handle: NativeHandle) -> String {
        self.state
            .borrow()
            .window(handle)
            .map(|w| w.text.clone())
            .unwrap_or_default()
    }

    fn set_text(&self, handle: NativeHandle, text: &str) -> PlatformResult<()> {
        let changed = {
            let mut state = self.state.borrow_mut();
            let window = state
                .window_mut(handle)
                .ok_or(PlatformError::InvalidHandle(handle))?;
            let changed = window.text != text;
            window.text = text.to_string();
            changed
        };
        if changed && self.builtin_of(handle) == Some(BuiltinClass::Edit) {
            self.notify_parent(handle, notifications::TEXT_CHANGED);
        }
        Ok(())
    }

    fn show(&self, handle: NativeHandle, visible: bool) {
        if let Some(window) = self.state.borrow_mut().window_mut(handle) {
            window.visible = visible;
        }
    }

    fn set_icon(&self, handle: NativeHandle, icon: RawResource) {
        if let Some(window) = self.state.borrow_mut().window_mut(handle) {
            window.icon = icon;
        }
    }

    fn set_font(&self, handle: NativeHandle, font: RawResource) {
        if let Some(window) = self.state.borrow_mut().window_mut(handle) {
            window.font = font;
        }
    }

    fn load_resource(&self, kind: ResourceKind, name: &str) -> PlatformResult<RawResource> {
        let mut state = self.state.borrow_mut();
        if state.missing_resources.contains(name) {
            return Err(PlatformError::ResourceUnavailable(name.to_string()));
        }
        let key = state.resources.insert(HeadlessResource {
            kind,
            name: name.to_string(),
        });
        Ok(resource_of(key))
    }

    fn duplicate_resource(&self, kind: ResourceKind, raw: RawResource) -> PlatformResult<RawResource> {
        let mut state = self.state.borrow_mut();
        let name = match state.resources.get(key_of(raw.as_raw())) {
            Some(resource) if resource.kind == kind => resource.name.clone(),
            _ => return Err(PlatformError::ResourceUnavailable(format!("{kind} {raw:?}"))),
        };
        let key = state.resources.insert(HeadlessResource { kind, name });
        Ok(resource_of(key))
    }

    fn release_resource(&self, kind: ResourceKind, raw: RawResource) -> bool {
        let mut state = self.state.borrow_mut();
        let key = key_of(raw.as_raw());
        match state.resources.get(key) {
            Some(resource) if resource.kind == kind => {
                state.resources.remove(key);
                state.released.push(raw);
                true
            }
            _ => false,
        }
    }

    fn next_message(&self) -> PlatformResult<NativeMessage> {
        let mut state = self.state.borrow_mut();
        if let Some(event) = state.queue.pop_front() {
            return Ok(NativeMessage::Event(event));
        }
        state
            .quit
            .take()
            .map(NativeMessage::Quit)
            .ok_or(PlatformError::QueueExhausted)
    }

    fn translate(&self, event: &Event) {
        let Some(key) = event.as_key() else {
            return;
        };
        if let Some(ch) = composed_char(key.key_code()) {
            self.state
                .borrow_mut()
                .queue
                .push_front(Event::char(event.target(), ch));
        }
    }

    fn dispatch(&self, event: &Event) -> isize {
        self.send(*event)
    }

    fn post(&self, event: Event) {
        self.state.borrow_mut().queue.push_back(event);
    }

    fn post_quit(&self, exit_code: i32) {
        self.state.borrow_mut().quit = Some(exit_code);
    }

    fn send(&self, event: Event) -> isize {
        if self.is_window(event.target()) {
            dispatch::route(self, event)
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params<'a>(class_name: &'a str, parent: Option<NativeHandle>) -> CreateParams<'a> {
        CreateParams {
            class_name,
            title: "",
            style: if parent.is_some() {
                WindowStyle::CHILD | WindowStyle::VISIBLE
            } else {
                WindowStyle::OVERLAPPED_WINDOW
            },
            extended_style: ExtendedStyle::empty(),
            rect: Rect::new(0, 0, 100, 50),
            parent,
            control_id: 7,
        }
    }

    #[test]
    fn test_unregistered_class_is_rejected() {
        let platform = HeadlessPlatform::new();
        let result = platform.create_window(&params("Nope", None), None);
        assert!(matches!(result, Err(PlatformError::WindowCreation(_))));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let platform = HeadlessPlatform::new();
        platform.register_class("Frame").unwrap();
        assert!(platform.register_class("Frame").is_err());
        assert_eq!(platform.class_registrations(), vec!["Frame".to_string()]);
    }

    #[test]
    fn test_destroy_removes_children_and_journals_once() {
        let platform = HeadlessPlatform::new();
        platform.register_class("Frame").unwrap();
        let parent = platform.create_window(&params("Frame", None), None).unwrap();
        let child = platform
            .create_window(&params("EDIT", Some(parent)), None)
            .unwrap();

        assert!(platform.destroy_window(parent));
        assert!(!platform.destroy_window(parent));
        assert!(!platform.is_window(child));
        assert_eq!(platform.destroyed_windows(), vec![child, parent]);
    }

    #[test]
    fn test_stale_handle_is_not_live() {
        let platform = HeadlessPlatform::new();
        platform.register_class("Frame").unwrap();
        let first = platform.create_window(&params("Frame", None), None).unwrap();
        platform.destroy_window(first);
        let second = platform.create_window(&params("Frame", None), None).unwrap();

        // Slot reuse bumps the version, so the old handle stays dead
        assert_ne!(first, second);
        assert!(!platform.is_window(first));
        assert!(platform.is_window(second));
    }

    #[test]
    fn test_quit_is_retrieved_after_queued_events() {
        let platform = HeadlessPlatform::new();
        platform.post_quit(3);
        platform.post(Event::close(NativeHandle::from_raw(1)));

        assert!(matches!(platform.next_message(), Ok(NativeMessage::Event(_))));
        assert_eq!(platform.next_message(), Ok(NativeMessage::Quit(3)));
        assert_eq!(platform.next_message(), Err(PlatformError::QueueExhausted));
    }

    #[test]
    fn test_resource_duplicate_and_release() {
        let platform = HeadlessPlatform::new();
        let original = platform.load_resource(ResourceKind::Icon, "application").unwrap();
        let copy = platform
            .duplicate_resource(ResourceKind::Icon, original)
            .unwrap();

        assert_ne!(original, copy);
        assert!(platform.release_resource(ResourceKind::Icon, original));
        assert!(!platform.release_resource(ResourceKind::Icon, original));
        assert!(platform.is_resource_live(copy));
        assert!(!platform.release_resource(ResourceKind::Font, copy));
    }

    #[test]
    fn test_navigation_keys_compose_nothing() {
        let platform = HeadlessPlatform::new();
        let target = NativeHandle::from_raw(9);
        for key in [keys::LEFT, keys::DELETE, keys::RETURN, keys::ESCAPE] {
            platform.translate(&Event::key_down(target, key));
        }
        platform.translate(&Event::key_down(target, keys::SPACE));
        platform.translate(&Event::key_down(target, u32::from(b'7')));

        assert_eq!(platform.pending_messages(), 2);
    }

    #[test]
    fn test_translate_queues_character_first() {
        let platform = HeadlessPlatform::new();
        let target = NativeHandle::from_raw(9);
        platform.post(Event::close(target));
        platform.translate(&Event::key_down(target, u32::from(b'A')));

        assert_eq!(
            platform.next_message(),
            Ok(NativeMessage::Event(Event::char(target, u32::from(b'A'))))
        );
    }
}
