//! Integer geometry types
//!
//! All coordinates are native client-area pixels with a top-left origin. Child
//! rectangles are expressed relative to their parent's client area.

use serde::{Deserialize, Serialize};

/// A position in client coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset in pixels
    pub x: i32,
    /// Vertical offset in pixels
    pub y: i32,
}

impl Point {
    /// Create a new point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl Size {
    /// Create a new size
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero or negative
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl Rect {
    /// Create a rectangle from origin and extent
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle at the origin covering `size`
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Rectangle with the given origin and size
    pub const fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Top-left corner
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Shrink the rectangle by `margins` on every side
    ///
    /// The resulting extent never goes below zero; coordinates saturate.
    pub fn inset(&self, margins: Margins) -> Self {
        Self {
            x: self.x.saturating_add(margins.left),
            y: self.y.saturating_add(margins.top),
            width: self.width.saturating_sub(margins.horizontal()).max(0),
            height: self.height.saturating_sub(margins.vertical()).max(0),
        }
    }
}

/// Spacing around the four edges of a box
///
/// Stored signed so that a caller-supplied negative value can be detected and
/// rejected instead of silently wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Margins {
    /// Top edge
    pub top: i32,
    /// Right edge
    pub right: i32,
    /// Bottom edge
    pub bottom: i32,
    /// Left edge
    pub left: i32,
}

impl Margins {
    /// Margins with explicit values for each side, in CSS order
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self { top, right, bottom, left }
    }

    /// The same margin on all four sides
    pub const fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Left plus right, saturating
    pub const fn horizontal(&self) -> i32 {
        self.left.saturating_add(self.right)
    }

    /// Top plus bottom, saturating
    pub const fn vertical(&self) -> i32 {
        self.top.saturating_add(self.bottom)
    }

    /// True when no side is negative
    pub const fn is_non_negative(&self) -> bool {
        self.top >= 0 && self.right >= 0 && self.bottom >= 0 && self.left >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inset_subtracts_margins() {
        let rect = Rect::new(0, 0, 120, 100);
        let content = rect.inset(Margins::new(1, 2, 3, 4));
        assert_eq!(content, Rect::new(4, 1, 114, 96));
    }

    #[test]
    fn test_inset_never_goes_negative() {
        let rect = Rect::new(0, 0, 5, 5);
        let content = rect.inset(Margins::uniform(10));
        assert_eq!(content.size(), Size::new(0, 0));
    }

    #[test]
    fn test_huge_margins_saturate() {
        let huge = Margins::uniform(i32::MAX);
        assert_eq!(huge.horizontal(), i32::MAX);
        assert_eq!(huge.vertical(), i32::MAX);

        let content = Rect::new(10, 10, 120, 100).inset(huge);
        assert_eq!(content, Rect::new(i32::MAX, i32::MAX, 0, 0));
    }

    #[test]
    fn test_negative_margins_detected() {
        assert!(Margins::uniform(0).is_non_negative());
        assert!(!Margins::new(0, -1, 0, 0).is_non_negative());
    }
}
