//! Coordinate space marker types.
//!
//! These are zero-sized types (ZSTs) used as type parameters to tell
//! detector-relative boxes apart from boxes already placed on a frame.

use std::fmt;

/// Marker type for pixel coordinates (absolute positions on the image).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker type for normalized coordinates (fractions of width/height).
///
/// Detection engines report boxes in this space.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
