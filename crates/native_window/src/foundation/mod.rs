//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Integer geometry in native client coordinates
//! - Logging utilities

pub mod geometry;
pub mod logging;

pub use geometry::{Margins, Point, Rect, Size};
