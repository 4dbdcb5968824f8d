//! Layout containers
//!
//! A [`Layout`] is a child window that owns an ordered list of child windows
//! and positions them inside its client area whenever it is resized. The
//! positioning strategy is a type parameter: [`VerticalLayout`] and
//! [`HorizontalLayout`] stack their items; the plain [`Layout`] only holds
//! margins, spacing and items and leaves geometry alone.
//!
//! A layout also forwards command notifications coming from its direct
//! children to the child object that sent them, so widgets can react to their
//! own notifications even though the protocol delivers them to the parent.

pub mod constraints;
pub mod stack;

pub use constraints::{ItemConstraints, Length};
pub use stack::{Arrange, Axis, HorizontalStack, Unarranged, VerticalStack};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;

use crate::events::{Event, EventResult, ResizeEvent};
use crate::foundation::{Margins, Rect, Size};
use crate::platform::{NativeHandle, PlatformError, TargetRef};
use crate::window::{
    default_event, ContractViolation, EventTarget, Window, WindowConfig, WindowCreationError,
    WindowSystem,
};

/// Failures of layout operations
#[derive(Error, Debug)]
pub enum LayoutError {
    /// The caller broke a layout contract
    #[error("layout contract violated: {0}")]
    Contract(#[from] ContractViolation),

    /// The platform refused an operation
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// One child managed by a layout
#[derive(Debug, Clone)]
pub struct LayoutItem {
    target: TargetRef,
    handle: NativeHandle,
    preferred: Size,
    constraints: ItemConstraints,
}

impl LayoutItem {
    /// Handle of the child
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    /// Size the child had when it was added
    pub fn preferred(&self) -> Size {
        self.preferred
    }

    /// Sizing rules of the child
    pub fn constraints(&self) -> &ItemConstraints {
        &self.constraints
    }

    /// Item with no backing window, for exercising arrangements
    #[cfg(test)]
    pub(crate) fn detached(preferred: Size, constraints: ItemConstraints) -> Self {
        let target: TargetRef = std::rc::Weak::<Layout>::new();
        Self {
            target,
            handle: NativeHandle::NULL,
            preferred,
            constraints,
        }
    }
}

/// Container window positioning its children with strategy `A`
pub struct Layout<A: Arrange = Unarranged> {
    window: Window,
    items: RefCell<Vec<LayoutItem>>,
    margins: Cell<Margins>,
    spacing: Cell<i32>,
    arrangement: A,
}

/// Children stacked top to bottom
pub type VerticalLayout = Layout<VerticalStack>;

/// Children stacked left to right
pub type HorizontalLayout = Layout<HorizontalStack>;

impl<A: Arrange + Default> Layout<A> {
    /// Create a layout window
    pub fn create(
        system: &Rc<WindowSystem>,
        config: &WindowConfig,
    ) -> Result<Rc<Self>, WindowCreationError> {
        Self::with_arrangement(system, config, A::default())
    }
}

impl<A: Arrange> Layout<A> {
    /// Create a layout window with an explicit strategy value
    pub fn with_arrangement(
        system: &Rc<WindowSystem>,
        config: &WindowConfig,
        arrangement: A,
    ) -> Result<Rc<Self>, WindowCreationError> {
        Window::create(system, config, |window| Self {
            window,
            items: RefCell::new(Vec::new()),
            margins: Cell::new(Margins::default()),
            spacing: Cell::new(0),
            arrangement,
        })
    }

    /// Append `child` with default constraints
    pub fn add_element<T: EventTarget>(&self, child: &Rc<T>) -> Result<(), LayoutError> {
        self.add_element_with(child, ItemConstraints::default())
    }

    /// Append `child` with explicit constraints
    ///
    /// The child is reparented into the layout when needed, remembered with its
    /// current size as preferred size, and everything is repositioned.
    pub fn add_element_with<T: EventTarget>(
        &self,
        child: &Rc<T>,
        constraints: ItemConstraints,
    ) -> Result<(), LayoutError> {
        let system = self.window.system();
        if !constraints.padding.is_non_negative() {
            return Err(system
                .report(ContractViolation::NegativePadding(constraints.padding))
                .into());
        }
        let Some(child_handle) = child.window().handle() else {
            return Err(system.report(ContractViolation::UnattachedChild).into());
        };
        let own = self
            .window
            .handle()
            .ok_or(PlatformError::InvalidHandle(NativeHandle::NULL))?;

        let platform = system.platform();
        if platform.parent(child_handle) != Some(own) {
            platform.set_parent(child_handle, Some(own))?;
            log::debug!("Reparented {child_handle:?} into layout {own:?}");
        }
        let preferred = platform
            .window_rect(child_handle)
            .map(|rect| rect.size())
            .unwrap_or_default();

        let target = Rc::downgrade(child) as TargetRef;
        self.items.borrow_mut().push(LayoutItem {
            target,
            handle: child_handle,
            preferred,
            constraints,
        });
        self.reposition();
        Ok(())
    }

    /// Stop managing `child`; returns false when it was not an item
    ///
    /// The child keeps its parent and its current geometry.
    pub fn remove_element<T: EventTarget>(&self, child: &Rc<T>) -> bool {
        let Some(handle) = child.window().handle() else {
            return false;
        };
        let removed = {
            let mut items = self.items.borrow_mut();
            let before = items.len();
            items.retain(|item| item.handle != handle);
            items.len() != before
        };
        if removed {
            self.reposition();
        }
        removed
    }

    /// Set the gap between the client-area edges and the items
    pub fn set_content_margins(&self, margins: Margins) -> Result<(), ContractViolation> {
        if !margins.is_non_negative() {
            return Err(self
                .window
                .system()
                .report(ContractViolation::NegativeMargins(margins)));
        }
        self.margins.set(margins);
        self.reposition();
        Ok(())
    }

    /// Set the gap between consecutive items
    pub fn set_content_spacing(&self, spacing: i32) -> Result<(), ContractViolation> {
        if spacing < 0 {
            return Err(self
                .window
                .system()
                .report(ContractViolation::NegativeSpacing(spacing)));
        }
        self.spacing.set(spacing);
        self.reposition();
        Ok(())
    }

    /// Current content margins
    pub fn content_margins(&self) -> Margins {
        self.margins.get()
    }

    /// Current item spacing
    pub fn content_spacing(&self) -> i32 {
        self.spacing.get()
    }

    /// Number of managed children
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// True when no child is managed
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Handles of the managed children, in order
    pub fn item_handles(&self) -> Vec<NativeHandle> {
        self.items.borrow().iter().map(LayoutItem::handle).collect()
    }

    /// Frames the strategy wants for the current client area
    ///
    /// Empty when the layout has no handle or its client area is empty.
    pub fn compute_frames(&self) -> Vec<(NativeHandle, Rect)> {
        let Some(handle) = self.window.handle() else {
            return Vec::new();
        };
        let Some(size) = self.window.system().platform().client_size(handle) else {
            return Vec::new();
        };
        if size.is_empty() {
            return Vec::new();
        }
        let content = Rect::from_size(size).inset(self.margins.get());
        let items = self.items.borrow();
        let frames = self
            .arrangement
            .arrange(content, self.spacing.get(), &items);
        items.iter().map(LayoutItem::handle).zip(frames).collect()
    }

    /// Apply [`Layout::compute_frames`] to the children
    ///
    /// Each move may re-enter this layout (a resized child is notified on the
    /// spot), so no item borrow is held while frames are applied.
    pub fn reposition(&self) {
        let frames = self.compute_frames();
        let platform = self.window.system().platform();
        for (handle, frame) in frames {
            if let Err(error) = platform.set_window_rect(handle, frame) {
                log::warn!("Could not position layout item {handle:?}: {error}");
            }
        }
    }

    /// Object behind the direct child that sent a command notification
    fn child_target(&self, source: NativeHandle) -> Option<Rc<dyn EventTarget>> {
        let own = self.window.handle()?;
        if self.window.system().platform().parent(source) != Some(own) {
            return None;
        }
        let items = self.items.borrow();
        items
            .iter()
            .find(|item| item.handle == source)
            .and_then(|item| item.target.upgrade())
    }
}

impl<A: Arrange> EventTarget for Layout<A> {
    fn window(&self) -> &Window {
        &self.window
    }

    fn on_event(&self, event: &Event) -> EventResult {
        if let Some(command) = event.as_command() {
            if let Some(child) = self.child_target(command.source()) {
                return child.on_event(event);
            }
        }
        default_event(self, event)
    }

    fn on_resize(&self, _event: &ResizeEvent) -> Option<EventResult> {
        self.reposition();
        Some(EventResult::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::window::ContractPolicy;

    fn child_config(parent: NativeHandle, size: Size) -> WindowConfig {
        WindowConfig::child("Pane", parent).with_size(size)
    }

    #[test]
    fn test_negative_spacing_is_rejected_without_change() {
        let (system, _platform) = WindowSystem::headless(ContractPolicy::Report);
        let layout = VerticalLayout::create(&system, &WindowConfig::new("Stack")).unwrap();

        let result = layout.set_content_spacing(-3);

        assert_eq!(result, Err(ContractViolation::NegativeSpacing(-3)));
        assert_eq!(layout.content_spacing(), 0);
    }

    #[test]
    fn test_add_element_reparents_child() {
        let (system, platform) = WindowSystem::headless(ContractPolicy::Report);
        let layout = VerticalLayout::create(&system, &WindowConfig::new("Stack")).unwrap();
        let other = Layout::<Unarranged>::create(&system, &WindowConfig::new("Stack")).unwrap();
        let child = Layout::<Unarranged>::create(
            &system,
            &child_config(other.window().native_handle(), Size::new(10, 10)),
        )
        .unwrap();

        layout.add_element(&child).unwrap();

        assert_eq!(
            platform.parent(child.window().native_handle()),
            Some(layout.window().native_handle())
        );
        assert_eq!(layout.len(), 1);
    }

    #[test]
    fn test_zero_client_area_leaves_children_alone() {
        let (system, platform) = WindowSystem::headless(ContractPolicy::Report);
        let config = WindowConfig::new("Stack").with_size(Size::new(0, 0));
        let layout = VerticalLayout::create(&system, &config).unwrap();
        let child = Layout::<Unarranged>::create(
            &system,
            &child_config(layout.window().native_handle(), Size::new(10, 10))
                .with_position(crate::foundation::Point::new(7, 7)),
        )
        .unwrap();

        layout.add_element(&child).unwrap();

        assert!(layout.compute_frames().is_empty());
        assert_eq!(
            platform.window_rect(child.window().native_handle()),
            Some(Rect::new(7, 7, 10, 10))
        );
    }

    #[test]
    fn test_remove_element_keeps_child_alive() {
        let (system, platform) = WindowSystem::headless(ContractPolicy::Report);
        let layout = VerticalLayout::create(&system, &WindowConfig::new("Stack")).unwrap();
        let child = Layout::<Unarranged>::create(
            &system,
            &child_config(layout.window().native_handle(), Size::new(10, 10)),
        )
        .unwrap();
        layout.add_element(&child).unwrap();

        assert!(layout.remove_element(&child));
        assert!(!layout.remove_element(&child));
        assert!(layout.is_empty());
        assert!(platform.is_window(child.window().native_handle()));
    }
}
