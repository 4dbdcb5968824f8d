//! Owning wrapper around one native resource

use std::fmt;
use std::rc::Rc;

use super::{ResourceAcquisitionError, ResourceKind};
use crate::platform::{Platform, RawResource};

/// Sole owner of one native resource
///
/// Move-only. Dropping it releases the resource through the platform that
/// produced it.
pub struct ResourceHandle {
    platform: Rc<dyn Platform>,
    kind: ResourceKind,
    raw: RawResource,
}

impl ResourceHandle {
    /// Take ownership of `raw`
    ///
    /// Returns `None` for the null resource, which has nothing to release.
    pub fn adopt(platform: Rc<dyn Platform>, kind: ResourceKind, raw: RawResource) -> Option<Self> {
        (!raw.is_null()).then_some(Self { platform, kind, raw })
    }

    /// Load the stock resource `name`
    pub fn load(
        platform: Rc<dyn Platform>,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Self, ResourceAcquisitionError> {
        let raw = platform
            .load_resource(kind, name)
            .map_err(|source| ResourceAcquisitionError {
                kind,
                name: name.to_string(),
                source,
            })?;
        log::trace!("Loaded {kind} `{name}` as {raw:?}");
        Ok(Self { platform, kind, raw })
    }

    /// Duplicate into a new, independently owned resource
    pub fn duplicate(&self) -> Result<Self, ResourceAcquisitionError> {
        let raw = self
            .platform
            .duplicate_resource(self.kind, self.raw)
            .map_err(|source| ResourceAcquisitionError {
                kind: self.kind,
                name: format!("{:?}", self.raw),
                source,
            })?;
        Ok(Self {
            platform: Rc::clone(&self.platform),
            kind: self.kind,
            raw,
        })
    }

    /// Kind of the owned resource
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Raw value of the owned resource
    pub fn raw(&self) -> RawResource {
        self.raw
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        if !self.platform.release_resource(self.kind, self.raw) {
            log::warn!("Releasing {} {:?} failed", self.kind, self.raw);
        }
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("kind", &self.kind)
            .field("raw", &self.raw)
            .finish()
    }
}

/// Backing store of a resource value
#[derive(Debug, Default)]
pub enum ResourceBackend {
    /// No resource
    #[default]
    Empty,
    /// An owned native resource
    Owned(ResourceHandle),
}

impl ResourceBackend {
    /// Raw value, or the null resource when empty
    pub fn raw(&self) -> RawResource {
        match self {
            Self::Empty => RawResource::NULL,
            Self::Owned(handle) => handle.raw(),
        }
    }

    /// True when no resource is held
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Empty stays empty; an owned resource is duplicated
    pub fn try_clone(&self) -> Result<Self, ResourceAcquisitionError> {
        match self {
            Self::Empty => Ok(Self::Empty),
            Self::Owned(handle) => handle.duplicate().map(Self::Owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessPlatform;

    #[test]
    fn test_drop_releases_exactly_once() {
        let platform = Rc::new(HeadlessPlatform::new());
        let handle =
            ResourceHandle::load(platform.clone(), ResourceKind::Icon, "application").unwrap();
        let raw = handle.raw();

        drop(handle);

        assert_eq!(platform.released_resources(), vec![raw]);
        assert_eq!(platform.live_resource_count(), 0);
    }

    #[test]
    fn test_adopting_null_yields_nothing() {
        let platform: Rc<dyn Platform> = Rc::new(HeadlessPlatform::new());
        assert!(ResourceHandle::adopt(platform, ResourceKind::Font, RawResource::NULL).is_none());
    }

    #[test]
    fn test_missing_resource_reports_name() {
        let platform = Rc::new(HeadlessPlatform::new());
        platform.mark_missing_resource("ghost");

        let error = ResourceHandle::load(platform, ResourceKind::Icon, "ghost").unwrap_err();

        assert_eq!(error.kind, ResourceKind::Icon);
        assert_eq!(error.name, "ghost");
    }
}
