//! Native event envelopes
//!
//! Every notification the windowing protocol delivers has the same fixed
//! shape: a target handle, a message code and two machine-word parameters.
//! [`Event`] is an immutable copy of that envelope. Typed views such as
//! [`ResizeEvent`] decode the parameters for the few codes the core interprets;
//! every other code is carried through untouched and handed to the platform's
//! default handler.

pub mod handlers;

pub use handlers::{EventHandlerList, SubscriptionId};

use crate::foundation::Size;
use crate::platform::NativeHandle;

/// Message codes interpreted by the core
///
/// Values follow the native protocol so envelopes can be passed through to
/// the operating system unchanged.
pub mod codes {
    /// First notification delivered to a freshly created handle
    pub const CREATE: u32 = 0x0081;
    /// The handle is being destroyed
    pub const DESTROY: u32 = 0x0002;
    /// The client area changed size
    pub const SIZE: u32 = 0x0005;
    /// Replace the window text
    pub const SET_TEXT: u32 = 0x000C;
    /// The user asked to close the window
    pub const CLOSE: u32 = 0x0010;
    /// Loop termination signal
    pub const QUIT: u32 = 0x0012;
    /// Assign a font to a control
    pub const SET_FONT: u32 = 0x0030;
    /// Assign an icon to a window
    pub const SET_ICON: u32 = 0x0080;
    /// A key went down
    pub const KEY_DOWN: u32 = 0x0100;
    /// A composed character (produced by translation of `KEY_DOWN`)
    pub const CHAR: u32 = 0x0102;
    /// A child control sent a notification to its parent
    pub const COMMAND: u32 = 0x0111;
}

/// Notification codes carried in the high word of a command notification
pub mod notifications {
    /// A push button was clicked
    pub const CLICKED: u16 = 0x0000;
    /// The text of an edit control changed
    pub const TEXT_CHANGED: u16 = 0x0300;
}

/// Virtual key codes used by the bundled widgets
pub mod keys {
    /// Backspace
    pub const BACK: u32 = 0x08;
    /// Enter / Return
    pub const RETURN: u32 = 0x0D;
    /// Escape
    pub const ESCAPE: u32 = 0x1B;
    /// Space bar
    pub const SPACE: u32 = 0x20;
    /// Left arrow
    pub const LEFT: u32 = 0x25;
    /// Delete
    pub const DELETE: u32 = 0x2E;
}

/// Low 16 bits of a word
#[inline]
pub const fn loword(value: usize) -> u16 {
    (value & 0xFFFF) as u16
}

/// Bits 16..32 of a word
#[inline]
pub const fn hiword(value: usize) -> u16 {
    ((value >> 16) & 0xFFFF) as u16
}

/// Pack two 16-bit halves into one word, low half first
#[inline]
pub const fn make_word(low: u16, high: u16) -> usize {
    (low as usize) | ((high as usize) << 16)
}

/// Coarse classification of a message code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// [`codes::CREATE`]
    Create,
    /// [`codes::DESTROY`]
    Destroy,
    /// [`codes::SIZE`]
    Resize,
    /// [`codes::CLOSE`]
    Close,
    /// [`codes::COMMAND`]
    Command,
    /// [`codes::KEY_DOWN`]
    KeyDown,
    /// [`codes::CHAR`]
    Char,
    /// Anything the core does not interpret
    Other(u32),
}

impl From<u32> for MessageKind {
    fn from(code: u32) -> Self {
        match code {
            codes::CREATE => Self::Create,
            codes::DESTROY => Self::Destroy,
            codes::SIZE => Self::Resize,
            codes::CLOSE => Self::Close,
            codes::COMMAND => Self::Command,
            codes::KEY_DOWN => Self::KeyDown,
            codes::CHAR => Self::Char,
            other => Self::Other(other),
        }
    }
}

/// One native event envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Event {
    target: NativeHandle,
    code: u32,
    word_param: usize,
    long_param: isize,
}

impl Event {
    /// Wrap a raw envelope
    pub const fn new(target: NativeHandle, code: u32, word_param: usize, long_param: isize) -> Self {
        Self {
            target,
            code,
            word_param,
            long_param,
        }
    }

    /// Creation notification carrying an opaque creation parameter
    pub const fn create(target: NativeHandle, creation_param: isize) -> Self {
        Self::new(target, codes::CREATE, 0, creation_param)
    }

    /// Destroy notification
    pub const fn destroy(target: NativeHandle) -> Self {
        Self::new(target, codes::DESTROY, 0, 0)
    }

    /// Close request
    pub const fn close(target: NativeHandle) -> Self {
        Self::new(target, codes::CLOSE, 0, 0)
    }

    /// Resize notification for a new client size
    pub const fn resize(target: NativeHandle, size: Size) -> Self {
        let packed = make_word(size.width as u16, size.height as u16);
        Self::new(target, codes::SIZE, 0, packed as isize)
    }

    /// Key-down notification
    pub const fn key_down(target: NativeHandle, key_code: u32) -> Self {
        Self::new(target, codes::KEY_DOWN, key_code as usize, 1)
    }

    /// Character notification
    pub const fn char(target: NativeHandle, ch: u32) -> Self {
        Self::new(target, codes::CHAR, ch as usize, 1)
    }

    /// Command notification sent to `parent` on behalf of the child `source`
    pub const fn command(
        parent: NativeHandle,
        control_id: u16,
        notification: u16,
        source: NativeHandle,
    ) -> Self {
        Self::new(
            parent,
            codes::COMMAND,
            make_word(control_id, notification),
            source.as_raw() as isize,
        )
    }

    /// Handle the event is addressed to
    pub const fn target(&self) -> NativeHandle {
        self.target
    }

    /// Raw message code
    pub const fn code(&self) -> u32 {
        self.code
    }

    /// First machine-word parameter
    pub const fn word_param(&self) -> usize {
        self.word_param
    }

    /// Second machine-word parameter
    pub const fn long_param(&self) -> isize {
        self.long_param
    }

    /// Classify the message code
    pub fn kind(&self) -> MessageKind {
        MessageKind::from(self.code)
    }

    /// View as a resize notification
    pub fn as_resize(&self) -> Option<ResizeEvent> {
        (self.code == codes::SIZE).then_some(ResizeEvent(*self))
    }

    /// View as a key-down notification
    pub fn as_key(&self) -> Option<KeyEvent> {
        (self.code == codes::KEY_DOWN).then_some(KeyEvent(*self))
    }

    /// View as a child command notification
    pub fn as_command(&self) -> Option<CommandEvent> {
        (self.code == codes::COMMAND && self.long_param != 0).then_some(CommandEvent(*self))
    }
}

/// Client-area size change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent(Event);

impl ResizeEvent {
    /// New client width
    pub const fn width(&self) -> i32 {
        loword(self.0.long_param as usize) as i32
    }

    /// New client height
    pub const fn height(&self) -> i32 {
        hiword(self.0.long_param as usize) as i32
    }

    /// New client size
    pub const fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Resize reason (restored, minimized, maximized...) as the raw code
    pub const fn reason(&self) -> usize {
        self.0.word_param
    }

    /// Underlying envelope
    pub const fn event(&self) -> &Event {
        &self.0
    }
}

/// Key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent(Event);

impl KeyEvent {
    /// Virtual key code
    pub const fn key_code(&self) -> u32 {
        self.0.word_param as u32
    }

    /// Auto-repeat count for this envelope
    pub const fn repeat_count(&self) -> u16 {
        loword(self.0.long_param as usize)
    }

    /// True when the key was already down before this envelope
    pub const fn is_repeat(&self) -> bool {
        (self.0.long_param >> 30) & 1 == 1
    }

    /// Underlying envelope
    pub const fn event(&self) -> &Event {
        &self.0
    }
}

/// Notification a child control sent to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEvent(Event);

impl CommandEvent {
    /// Control identifier assigned to the child at creation
    pub const fn control_id(&self) -> u16 {
        loword(self.0.word_param)
    }

    /// Notification code, see [`notifications`]
    pub const fn notification(&self) -> u16 {
        hiword(self.0.word_param)
    }

    /// Handle of the child that sent the notification
    pub const fn source(&self) -> NativeHandle {
        NativeHandle::from_raw(self.0.long_param as usize)
    }

    /// Underlying envelope
    pub const fn event(&self) -> &Event {
        &self.0
    }
}

/// Value returned to the operating system for a handled envelope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EventResult(isize);

impl EventResult {
    /// Handled, nothing further to report
    pub const OK: Self = Self(0);

    /// Wrap a raw protocol result
    pub const fn from_raw(value: isize) -> Self {
        Self(value)
    }

    /// Raw protocol result
    pub const fn raw(&self) -> isize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_view_decodes_size() {
        let event = Event::resize(NativeHandle::from_raw(7), Size::new(120, 100));
        let resize = event.as_resize().expect("resize view");
        assert_eq!(resize.width(), 120);
        assert_eq!(resize.height(), 100);
        assert!(event.as_key().is_none());
    }

    #[test]
    fn test_command_view_decodes_source() {
        let parent = NativeHandle::from_raw(1);
        let child = NativeHandle::from_raw(0x0001_0003);
        let event = Event::command(parent, 42, notifications::TEXT_CHANGED, child);
        let command = event.as_command().expect("command view");
        assert_eq!(command.control_id(), 42);
        assert_eq!(command.notification(), notifications::TEXT_CHANGED);
        assert_eq!(command.source(), child);
        assert_eq!(event.target(), parent);
    }

    #[test]
    fn test_menu_command_has_no_source() {
        // Menu and accelerator commands carry no child handle
        let event = Event::new(NativeHandle::from_raw(1), codes::COMMAND, 5, 0);
        assert!(event.as_command().is_none());
    }

    #[test]
    fn test_key_view() {
        let event = Event::key_down(NativeHandle::from_raw(3), keys::RETURN);
        let key = event.as_key().expect("key view");
        assert_eq!(key.key_code(), keys::RETURN);
        assert_eq!(key.repeat_count(), 1);
        assert!(!key.is_repeat());
        assert_eq!(event.kind(), MessageKind::KeyDown);
    }

    #[test]
    fn test_unknown_code_classified_as_other() {
        let event = Event::new(NativeHandle::from_raw(3), 0x0F, 0, 0);
        assert_eq!(event.kind(), MessageKind::Other(0x0F));
    }
}
