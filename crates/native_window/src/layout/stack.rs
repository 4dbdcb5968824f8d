//! Arrangement strategies
//!
//! An [`Arrange`] implementation turns a content box, a spacing value and the
//! list of items into one frame per item. It is pure: applying the frames is
//! the layout's job.

use super::constraints::{clamp_extent, Length};
use super::LayoutItem;
use crate::foundation::{Margins, Rect, Size};

/// Strategy that computes item frames
pub trait Arrange: 'static {
    /// One frame per item, in item order
    fn arrange(&self, content: Rect, spacing: i32, items: &[LayoutItem]) -> Vec<Rect>;
}

/// Leaves children where they are
#[derive(Debug, Clone, Copy, Default)]
pub struct Unarranged;

impl Arrange for Unarranged {
    fn arrange(&self, _content: Rect, _spacing: i32, _items: &[LayoutItem]) -> Vec<Rect> {
        Vec::new()
    }
}

/// Primary axis of a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Left to right
    Horizontal,
    /// Top to bottom
    Vertical,
}

impl Axis {
    fn main(self, size: Size) -> i32 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    fn cross(self, size: Size) -> i32 {
        match self {
            Self::Horizontal => size.height,
            Self::Vertical => size.width,
        }
    }

    fn main_origin(self, rect: Rect) -> i32 {
        match self {
            Self::Horizontal => rect.x,
            Self::Vertical => rect.y,
        }
    }

    fn cross_origin(self, rect: Rect) -> i32 {
        match self {
            Self::Horizontal => rect.y,
            Self::Vertical => rect.x,
        }
    }

    /// Leading and trailing padding along the axis
    fn main_padding(self, padding: Margins) -> (i32, i32) {
        match self {
            Self::Horizontal => (padding.left, padding.right),
            Self::Vertical => (padding.top, padding.bottom),
        }
    }

    fn cross_padding(self, padding: Margins) -> (i32, i32) {
        match self {
            Self::Horizontal => (padding.top, padding.bottom),
            Self::Vertical => (padding.left, padding.right),
        }
    }

    fn main_length(self, item: &LayoutItem) -> Length {
        match self {
            Self::Horizontal => item.constraints.width,
            Self::Vertical => item.constraints.height,
        }
    }

    fn cross_length(self, item: &LayoutItem) -> Length {
        match self {
            Self::Horizontal => item.constraints.height,
            Self::Vertical => item.constraints.width,
        }
    }

    fn compose(self, main_pos: i32, cross_pos: i32, main: i32, cross: i32) -> Rect {
        match self {
            Self::Horizontal => Rect::new(main_pos, cross_pos, main, cross),
            Self::Vertical => Rect::new(cross_pos, main_pos, cross, main),
        }
    }
}

/// Stack items one after another along `axis`
///
/// Items take their preferred or fixed extent along the axis; `Fill` items
/// share what is left equally, the first ones absorbing the remainder. Across
/// the axis every item is clamped to the content box.
pub fn stack(axis: Axis, content: Rect, spacing: i32, items: &[LayoutItem]) -> Vec<Rect> {
    if items.is_empty() {
        return Vec::new();
    }
    let available = axis.main(content.size());
    let cross_available = axis.cross(content.size());
    let gap_count = i32::try_from(items.len() - 1).unwrap_or(i32::MAX);

    // All sums saturate: huge spacing or padding pushes items out of view
    let mut claimed = spacing.saturating_mul(gap_count);
    let mut fill_count = 0;
    for item in items {
        let (lead, trail) = axis.main_padding(item.constraints.padding);
        claimed = claimed.saturating_add(lead).saturating_add(trail);
        match axis.main_length(item) {
            Length::Fill => fill_count += 1,
            Length::Fixed(extent) => claimed = claimed.saturating_add(extent),
            Length::Preferred => claimed = claimed.saturating_add(axis.main(item.preferred)),
        }
    }
    let left_over = available.saturating_sub(claimed).max(0);
    let (share, mut remainder) = if fill_count > 0 {
        (left_over / fill_count, left_over % fill_count)
    } else {
        (0, 0)
    };

    let mut offset = axis.main_origin(content);
    let mut frames = Vec::with_capacity(items.len());
    for item in items {
        let constraints = &item.constraints;
        let (lead, trail) = axis.main_padding(constraints.padding);
        let (cross_lead, cross_trail) = axis.cross_padding(constraints.padding);

        let main = match axis.main_length(item) {
            Length::Fill => {
                let bonus = i32::from(remainder > 0);
                remainder -= bonus;
                share + bonus
            }
            Length::Fixed(extent) => extent,
            Length::Preferred => axis.main(item.preferred),
        };
        let main = clamp_extent(
            main,
            axis.main(constraints.min_size),
            axis.main(constraints.max_size),
        )
        .max(0);

        let cross_room = cross_available
            .saturating_sub(cross_lead)
            .saturating_sub(cross_trail)
            .max(0);
        let cross = match axis.cross_length(item) {
            Length::Fill => cross_room,
            Length::Fixed(extent) => extent,
            Length::Preferred => axis.cross(item.preferred),
        };
        let cross = clamp_extent(
            cross,
            axis.cross(constraints.min_size),
            axis.cross(constraints.max_size),
        )
        .min(cross_room)
        .max(0);

        frames.push(axis.compose(
            offset.saturating_add(lead),
            axis.cross_origin(content).saturating_add(cross_lead),
            main,
            cross,
        ));
        offset = offset
            .saturating_add(lead)
            .saturating_add(main)
            .saturating_add(trail)
            .saturating_add(spacing);
    }
    frames
}

/// Top-to-bottom stack
#[derive(Debug, Clone, Copy, Default)]
pub struct VerticalStack;

impl Arrange for VerticalStack {
    fn arrange(&self, content: Rect, spacing: i32, items: &[LayoutItem]) -> Vec<Rect> {
        stack(Axis::Vertical, content, spacing, items)
    }
}

/// Left-to-right stack
#[derive(Debug, Clone, Copy, Default)]
pub struct HorizontalStack;

impl Arrange for HorizontalStack {
    fn arrange(&self, content: Rect, spacing: i32, items: &[LayoutItem]) -> Vec<Rect> {
        stack(Axis::Horizontal, content, spacing, items)
    }
}
