//! Icon and font values

use std::fmt;
use std::marker::PhantomData;

use super::{ResourceAcquisitionError, ResourceBackend, ResourceHandle, ResourceKind};
use crate::platform::RawResource;
use crate::window::WindowSystem;

/// Marker tying a [`Resource`] to one [`ResourceKind`]
pub trait ResourceClass {
    /// Kind of the native resource
    const KIND: ResourceKind;
}

/// Marker for icons
#[derive(Debug)]
pub enum IconClass {}

impl ResourceClass for IconClass {
    const KIND: ResourceKind = ResourceKind::Icon;
}

/// Marker for fonts
#[derive(Debug)]
pub enum FontClass {}

impl ResourceClass for FontClass {
    const KIND: ResourceKind = ResourceKind::Font;
}

/// A possibly-empty graphics resource of class `C`
///
/// Moving transfers ownership and leaves nothing behind to release; use
/// [`Resource::take`] to move out of a place that must stay valid.
pub struct Resource<C: ResourceClass> {
    backend: ResourceBackend,
    _class: PhantomData<C>,
}

/// Window icon
pub type Icon = Resource<IconClass>;

/// Text font
pub type Font = Resource<FontClass>;

impl<C: ResourceClass> Resource<C> {
    /// A value holding no resource
    pub fn empty() -> Self {
        Self::from_backend(ResourceBackend::Empty)
    }

    fn from_backend(backend: ResourceBackend) -> Self {
        Self {
            backend,
            _class: PhantomData,
        }
    }

    /// Wrap an owned handle
    ///
    /// A handle of a different kind is rejected and handed back.
    pub fn from_handle(handle: ResourceHandle) -> Result<Self, ResourceHandle> {
        if handle.kind() == C::KIND {
            Ok(Self::from_backend(ResourceBackend::Owned(handle)))
        } else {
            Err(handle)
        }
    }

    /// Load the stock resource `name`, see [`super::stock`]
    pub fn load(system: &WindowSystem, name: &str) -> Result<Self, ResourceAcquisitionError> {
        ResourceHandle::load(system.platform_rc(), C::KIND, name)
            .map(|handle| Self::from_backend(ResourceBackend::Owned(handle)))
    }

    /// Raw value, or the null resource when empty
    pub fn raw(&self) -> RawResource {
        self.backend.raw()
    }

    /// True when no resource is held
    pub fn is_empty(&self) -> bool {
        self.backend.is_empty()
    }

    /// Independent copy; duplicates the native resource when one is held
    pub fn try_clone(&self) -> Result<Self, ResourceAcquisitionError> {
        self.backend.try_clone().map(Self::from_backend)
    }

    /// Move the resource out, leaving this value empty
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl<C: ResourceClass> Default for Resource<C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<C: ResourceClass> fmt::Debug for Resource<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("kind", &C::KIND)
            .field("handle", &self.raw())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::stock;
    use crate::window::ContractPolicy;

    #[test]
    fn test_default_is_empty() {
        let icon = Icon::default();
        assert!(icon.is_empty());
        assert!(icon.raw().is_null());
    }

    #[test]
    fn test_clone_of_empty_is_empty() {
        let font = Font::default();
        assert!(font.try_clone().unwrap().is_empty());
    }

    #[test]
    fn test_clone_duplicates_and_both_release() {
        let (system, platform) = WindowSystem::headless(ContractPolicy::Report);
        let icon = Icon::load(&system, stock::APPLICATION_ICON).unwrap();
        let copy = icon.try_clone().unwrap();

        assert_ne!(icon.raw(), copy.raw());
        assert_eq!(platform.live_resource_count(), 2);

        drop(icon);
        drop(copy);
        assert_eq!(platform.live_resource_count(), 0);
        assert_eq!(platform.released_resources().len(), 2);
    }

    #[test]
    fn test_take_leaves_source_empty_and_releases_once() {
        let (system, platform) = WindowSystem::headless(ContractPolicy::Report);
        let mut font = Font::load(&system, stock::DEFAULT_GUI_FONT).unwrap();
        let raw = font.raw();

        let moved = font.take();

        assert!(font.is_empty());
        assert_eq!(moved.raw(), raw);
        drop(font);
        assert!(platform.released_resources().is_empty());
        drop(moved);
        assert_eq!(platform.released_resources(), vec![raw]);
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let (system, _platform) = WindowSystem::headless(ContractPolicy::Report);
        let handle =
            ResourceHandle::load(system.platform_rc(), ResourceKind::Font, "default_gui").unwrap();
        assert!(Icon::from_handle(handle).is_err());
    }
}
