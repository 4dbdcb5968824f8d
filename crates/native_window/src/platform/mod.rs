//! Native windowing back-ends
//!
//! This module defines the contract between the object model (windows,
//! layouts, resources, the message loop) and the operating system's windowing
//! protocol. The object model never talks to the OS directly; it goes through
//! [`Platform`].
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │  Window / Layout / MessageLoop  │
//! └─────────────┬───────────────────┘
//!               │ Uses
//!      ┌────────▼────────┐
//!      │ Platform trait  │ ← this module
//!      └────────┬────────┘
//!               │ Implemented by
//!   ┌───────────▼───────────┐
//!   │ win32::Win32Platform  │ ← the native protocol (Windows only)
//!   │ headless::Headless... │ ← in-process simulation of the same protocol
//!   └───────────────────────┘
//! ```
//!
//! # Thread Safety
//! Platforms are `!Send`: every call must happen on the thread that runs the
//! message loop.

pub mod headless;
#[cfg(windows)]
pub mod win32;

pub use headless::HeadlessPlatform;
#[cfg(windows)]
pub use win32::Win32Platform;

use std::rc::Weak;

use bitflags::bitflags;
use thiserror::Error;

use crate::events::Event;
use crate::foundation::{Rect, Size};
use crate::resources::ResourceKind;
use crate::window::EventTarget;

/// Opaque OS-level identifier of a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(usize);

impl NativeHandle {
    /// The null handle
    pub const NULL: Self = Self(0);

    /// Wrap a raw handle value
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Raw handle value
    pub const fn as_raw(&self) -> usize {
        self.0
    }

    /// True for the null handle
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// Opaque OS-level identifier of a graphics resource (icon, font...)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RawResource(usize);

impl RawResource {
    /// The null resource
    pub const NULL: Self = Self(0);

    /// Wrap a raw resource value
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Raw resource value
    pub const fn as_raw(&self) -> usize {
        self.0
    }

    /// True for the null resource
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// Non-owning back-reference from a native handle to the object handling it
pub type TargetRef = Weak<dyn EventTarget>;

bitflags! {
    /// Window style flags
    ///
    /// The low 16 bits are class specific (edit or button styles) and can be
    /// set with [`WindowStyle::from_bits_retain`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowStyle: u32 {
        /// Top-level pop-up window
        const POPUP = 0x8000_0000;
        /// Child window; requires a parent
        const CHILD = 0x4000_0000;
        /// Initially visible
        const VISIBLE = 0x1000_0000;
        /// Exclude children from the parent's painting
        const CLIP_CHILDREN = 0x0200_0000;
        /// Title bar (implies border)
        const CAPTION = 0x00C0_0000;
        /// Thin border
        const BORDER = 0x0080_0000;
        /// Window menu in the title bar
        const SYSTEM_MENU = 0x0008_0000;
        /// Resizable frame
        const THICK_FRAME = 0x0004_0000;
        /// Minimize button
        const MINIMIZE_BOX = 0x0002_0000;
        /// Maximize button
        const MAXIMIZE_BOX = 0x0001_0000;
        /// Standard resizable top-level frame
        const OVERLAPPED_WINDOW = Self::CAPTION.bits()
            | Self::SYSTEM_MENU.bits()
            | Self::THICK_FRAME.bits()
            | Self::MINIMIZE_BOX.bits()
            | Self::MAXIMIZE_BOX.bits();
    }
}

bitflags! {
    /// Extended window style flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExtendedStyle: u32 {
        /// Raised border
        const WINDOW_EDGE = 0x0000_0100;
        /// Sunken border, used by edit controls
        const CLIENT_EDGE = 0x0000_0200;
        /// Tab navigation recurses into this window's children
        const CONTROL_PARENT = 0x0001_0000;
        /// Forces a taskbar button
        const APP_WINDOW = 0x0004_0000;
    }
}

/// Everything the platform needs to create one native window
#[derive(Debug, Clone, Copy)]
pub struct CreateParams<'a> {
    /// Registered or builtin class name
    pub class_name: &'a str,
    /// Initial window text
    pub title: &'a str,
    /// Style flags
    pub style: WindowStyle,
    /// Extended style flags
    pub extended_style: ExtendedStyle,
    /// Initial rectangle, relative to the parent's client area for children
    pub rect: Rect,
    /// Parent handle, if any
    pub parent: Option<NativeHandle>,
    /// Identifier reported in command notifications (children only)
    pub control_id: u16,
}

/// One item retrieved from the native queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeMessage {
    /// An envelope to translate and dispatch
    Event(Event),
    /// The quit signal with its exit code
    Quit(i32),
}

/// Failures reported by a platform
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The OS refused to register a window class
    #[error("class registration failed: {0}")]
    ClassRegistration(String),

    /// The OS refused to create a window
    #[error("window creation failed: {0}")]
    WindowCreation(String),

    /// The window procedure rejected the creation notification
    #[error("creation notification was rejected by the window procedure")]
    CreationRejected,

    /// The handle does not name a live window
    #[error("invalid native handle {0:?}")]
    InvalidHandle(NativeHandle),

    /// The handle's window procedure has already been replaced
    #[error("handle {0:?} is already subclassed")]
    AlreadySubclassed(NativeHandle),

    /// Nothing left to retrieve and no quit signal was posted
    #[error("message queue exhausted without a quit signal")]
    QueueExhausted,

    /// A named resource could not be loaded or duplicated
    #[error("resource `{0}` is not available")]
    ResourceUnavailable(String),

    /// A native call failed with an OS error code
    #[error("native call `{call}` failed with error code {code}")]
    Os {
        /// Name of the failing call
        call: &'static str,
        /// OS error code
        code: u32,
    },
}

/// Result type for platform calls
pub type PlatformResult<T> = Result<T, PlatformError>;

/// The windowing protocol as seen by the object model
///
/// Implementations deliver every envelope addressed to a window created with a
/// creation target (or subclassed) to [`crate::window::dispatch::route`], the
/// redispatch trampoline. Calls may re-enter: `route` can be invoked from
/// inside `create_window`, `destroy_window`, `set_window_rect`, `set_text`,
/// `send` and `default_proc`, so implementations must not hold internal
/// borrows across those calls.
pub trait Platform {
    /// Short name for diagnostics
    fn name(&self) -> &'static str;

    /// Register a window class whose procedure is the redispatch trampoline
    fn register_class(&self, class_name: &str) -> PlatformResult<()>;

    /// Create a native window
    ///
    /// When `creation_target` is given it travels with the creation
    /// notification and is handed back by [`Platform::take_creation_target`].
    /// Builtin classes pass `None`; they are attached with
    /// [`Platform::subclass`] afterwards.
    fn create_window(
        &self,
        params: &CreateParams<'_>,
        creation_target: Option<TargetRef>,
    ) -> PlatformResult<NativeHandle>;

    /// Destroy a native window and its children
    ///
    /// Returns false when the handle was already gone.
    fn destroy_window(&self, handle: NativeHandle) -> bool;

    /// True while `handle` names a live window
    fn is_window(&self, handle: NativeHandle) -> bool;

    /// Class name of a live window
    fn class_name(&self, handle: NativeHandle) -> Option<String>;

    /// Recover the creation target carried by a creation notification
    ///
    /// Returns it at most once per handle.
    fn take_creation_target(&self, event: &Event) -> Option<TargetRef>;

    /// Store the back-reference in the handle's user-data slot
    fn attach(&self, handle: NativeHandle, target: TargetRef);

    /// Read the handle's user-data slot
    fn attached(&self, handle: NativeHandle) -> Option<TargetRef>;

    /// Clear the handle's user-data slot
    fn detach(&self, handle: NativeHandle);

    /// Route a builtin control's envelopes through the trampoline
    ///
    /// Envelopes the target does not consume still reach the control's own
    /// procedure through [`Platform::default_proc`].
    fn subclass(&self, handle: NativeHandle, target: TargetRef) -> PlatformResult<()>;

    /// Default handling for an envelope nobody consumed
    fn default_proc(&self, event: &Event) -> isize;

    /// Current parent of `handle`
    fn parent(&self, handle: NativeHandle) -> Option<NativeHandle>;

    /// Reparent `child`
    fn set_parent(&self, child: NativeHandle, parent: Option<NativeHandle>) -> PlatformResult<()>;

    /// Window rectangle relative to the parent's client area
    fn window_rect(&self, handle: NativeHandle) -> Option<Rect>;

    /// Client-area size
    fn client_size(&self, handle: NativeHandle) -> Option<Size>;

    /// Move and resize; a size change sends a resize notification
    fn set_window_rect(&self, handle: NativeHandle, rect: Rect) -> PlatformResult<()>;

    /// Window text
    fn text(&self, handle: NativeHandle) -> String;

    /// Replace the window text
    fn set_text(&self, handle: NativeHandle, text: &str) -> PlatformResult<()>;

    /// Show or hide
    fn show(&self, handle: NativeHandle, visible: bool);

    /// Assign an icon; the caller keeps ownership
    fn set_icon(&self, handle: NativeHandle, icon: RawResource);

    /// Assign a font; the caller keeps ownership
    fn set_font(&self, handle: NativeHandle, font: RawResource);

    /// Load a named stock resource; the caller owns the result
    fn load_resource(&self, kind: ResourceKind, name: &str) -> PlatformResult<RawResource>;

    /// Duplicate a resource into a new, independently owned one
    fn duplicate_resource(&self, kind: ResourceKind, raw: RawResource) -> PlatformResult<RawResource>;

    /// Release a resource; returns false when it was not live
    fn release_resource(&self, kind: ResourceKind, raw: RawResource) -> bool;

    /// Block until the next envelope or the quit signal
    fn next_message(&self) -> PlatformResult<NativeMessage>;

    /// Character composition for a retrieved envelope
    fn translate(&self, event: &Event);

    /// Hand a retrieved envelope to its window procedure
    fn dispatch(&self, event: &Event) -> isize;

    /// Queue an envelope
    fn post(&self, event: Event);

    /// Queue the quit signal
    fn post_quit(&self, exit_code: i32);

    /// Deliver an envelope synchronously
    fn send(&self, event: Event) -> isize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapped_window_composition() {
        let style = WindowStyle::OVERLAPPED_WINDOW;
        assert!(style.contains(WindowStyle::CAPTION));
        assert!(style.contains(WindowStyle::THICK_FRAME));
        assert!(!style.contains(WindowStyle::CHILD));
    }

    #[test]
    fn test_class_specific_bits_survive() {
        let style = WindowStyle::CHILD | WindowStyle::from_bits_retain(0x0080);
        assert_eq!(style.bits() & 0xFFFF, 0x0080);
    }

    #[test]
    fn test_null_handle() {
        assert!(NativeHandle::NULL.is_null());
        assert!(!NativeHandle::from_raw(4).is_null());
        assert_eq!(NativeHandle::default(), NativeHandle::NULL);
    }
}
