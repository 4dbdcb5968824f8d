//! Per-item sizing rules

use crate::foundation::{Margins, Size};

/// Sizing mode of an item along one axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Length {
    /// The size the child had when it was added
    #[default]
    Preferred,
    /// A fixed number of pixels
    Fixed(i32),
    /// Take a share of the space left over (primary axis) or the whole
    /// content extent (secondary axis)
    Fill,
}

impl Length {
    /// Whether this length takes part in distributing left-over space
    pub fn is_fill(&self) -> bool {
        matches!(self, Self::Fill)
    }
}

/// Size bounds and sizing modes of one laid-out child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemConstraints {
    /// Horizontal sizing mode
    pub width: Length,
    /// Vertical sizing mode
    pub height: Length,
    /// Lower bound for the final size
    pub min_size: Size,
    /// Upper bound for the final size
    pub max_size: Size,
    /// Space kept free around the item
    pub padding: Margins,
}

impl Default for ItemConstraints {
    fn default() -> Self {
        Self {
            width: Length::Preferred,
            height: Length::Preferred,
            min_size: Size::new(0, 0),
            max_size: Size::new(i32::MAX, i32::MAX),
            padding: Margins::default(),
        }
    }
}

impl ItemConstraints {
    /// Preferred size on both axes, no bounds, no padding
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal sizing mode
    pub fn with_width(mut self, width: Length) -> Self {
        self.width = width;
        self
    }

    /// Set the vertical sizing mode
    pub fn with_height(mut self, height: Length) -> Self {
        self.height = height;
        self
    }

    /// Stretch horizontally
    pub fn fill_width(self) -> Self {
        self.with_width(Length::Fill)
    }

    /// Stretch vertically
    pub fn fill_height(self) -> Self {
        self.with_height(Length::Fill)
    }

    /// Set the lower size bound
    pub fn with_min_size(mut self, min_size: Size) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set the upper size bound
    pub fn with_max_size(mut self, max_size: Size) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the padding around the item
    pub fn with_padding(mut self, padding: Margins) -> Self {
        self.padding = padding;
        self
    }
}

/// Clamp `value` into `[min, max]`; the lower bound wins when they cross
pub(crate) fn clamp_extent(value: i32, min: i32, max: i32) -> i32 {
    value.min(max).max(min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded_preferred() {
        let constraints = ItemConstraints::default();
        assert_eq!(constraints.width, Length::Preferred);
        assert_eq!(constraints.max_size, Size::new(i32::MAX, i32::MAX));
    }

    #[test]
    fn test_clamp_prefers_lower_bound_when_crossed() {
        assert_eq!(clamp_extent(50, 10, 40), 40);
        assert_eq!(clamp_extent(5, 10, 40), 10);
        assert_eq!(clamp_extent(30, 60, 40), 60);
    }
}
