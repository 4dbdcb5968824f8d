//! # Native Window
//!
//! A thin object model over the native windowing protocol.
//!
//! ## Features
//!
//! - **Handle ownership**: every native window is owned by exactly one
//!   [`window::Window`] and destroyed exactly once
//! - **Redispatch**: native envelopes are routed to the Rust object bound to
//!   the handle, starting with the creation notification
//! - **Layouts**: containers that stack their children and keep them in place
//!   on resize
//! - **Resources**: icons and fonts released exactly once, duplicated on
//!   demand
//! - **Message loop**: ordered, short-circuiting message filters
//! - **Two back-ends**: the Win32 protocol on Windows and an in-process
//!   headless platform everywhere (used by the tests)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use native_window::prelude::*;
//!
//! fn main() -> Result<(), ShellError> {
//!     let (system, _platform) = WindowSystem::headless(ContractPolicy::default());
//!     let frame = VerticalLayout::create(
//!         &system,
//!         &WindowConfig::new("BrowserFrame").with_title("Browser"),
//!     )?;
//!     frame.set_content_margins(Margins::uniform(8))?;
//!
//!     let input = TextInput::create(&system, frame.window().native_handle(), "", Size::new(200, 24))?;
//!     input.text_changed().subscribe(|text| println!("location: {text}"));
//!     frame.add_element_with(&input, ItemConstraints::new().fill_width())?;
//!     frame.window().show(true);
//!
//!     let exit_code = MessageLoop::new(&system).run()?;
//!     std::process::exit(exit_code);
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod events;
pub mod foundation;
pub mod layout;
pub mod message_loop;
pub mod platform;
pub mod resources;
pub mod widgets;
pub mod window;

#[cfg(test)]
mod tests;

pub use error::{ShellError, ShellResult};

/// Common imports for shell authors
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, ShellConfig},
        error::{ShellError, ShellResult},
        events::{Event, EventHandlerList, EventResult, KeyEvent, ResizeEvent, SubscriptionId},
        foundation::{Margins, Point, Rect, Size},
        layout::{HorizontalLayout, ItemConstraints, Layout, LayoutError, Length, VerticalLayout},
        message_loop::{Filter, MessageLoop},
        platform::{HeadlessPlatform, NativeHandle, Platform},
        resources::{Font, Icon, ResourceAcquisitionError},
        widgets::{Button, TextInput},
        window::{
            default_event, ContractPolicy, ContractViolation, EventTarget, Window, WindowConfig,
            WindowCreationError, WindowSystem,
        },
    };
}
