//! Bounding boxes in the `(ymin, xmin, ymax, xmax)` order used by
//! detection engines.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use super::{Normalized, Pixel};

/// An axis-aligned bounding box.
///
/// The `TSpace` parameter should be either [`Pixel`] or [`Normalized`].
///
/// The constructor does not enforce `min <= max`: detectors occasionally
/// emit degenerate boxes and the annotator draws whatever it is given.
#[derive(Clone, Copy, PartialEq)]
pub struct BBox<TSpace> {
    pub ymin: f64,
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBox<TSpace> {
    /// Creates a box from coordinates in detector order.
    #[inline]
    pub fn from_yxyx(ymin: f64, xmin: f64, ymax: f64, xmax: f64) -> Self {
        Self {
            ymin,
            xmin,
            ymax,
            xmax,
            _space: PhantomData,
        }
    }

    /// Returns the coordinates as `[ymin, xmin, ymax, xmax]`.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.ymin, self.xmin, self.ymax, self.xmax]
    }

    /// Returns the width of the box. Negative if the box is malformed.
    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Returns the height of the box. Negative if the box is malformed.
    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

impl BBox<Normalized> {
    /// Scales normalized coordinates to pixel coordinates.
    pub fn to_pixel(&self, image_width: f64, image_height: f64) -> BBox<Pixel> {
        BBox::from_yxyx(
            self.ymin * image_height,
            self.xmin * image_width,
            self.ymax * image_height,
            self.xmax * image_width,
        )
    }
}

impl BBox<Pixel> {
    /// Left edge.
    #[inline]
    pub fn left(&self) -> f64 {
        self.xmin
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.xmax
    }

    /// Top edge.
    #[inline]
    pub fn top(&self) -> f64 {
        self.ymin
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.ymax
    }

    /// The closed outline as a 5-point polyline:
    /// top-left, bottom-left, bottom-right, top-right, top-left.
    pub fn outline(&self) -> [(f64, f64); 5] {
        let (left, right, top, bottom) = (self.left(), self.right(), self.top(), self.bottom());
        [
            (left, top),
            (left, bottom),
            (right, bottom),
            (right, top),
            (left, top),
        ]
    }
}

impl<TSpace> std::fmt::Debug for BBox<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBox")
            .field("ymin", &self.ymin)
            .field("xmin", &self.xmin)
            .field("ymax", &self.ymax)
            .field("xmax", &self.xmax)
            .finish()
    }
}

impl<TSpace> Default for BBox<TSpace> {
    fn default() -> Self {
        Self::from_yxyx(0.0, 0.0, 0.0, 0.0)
    }
}

// Serialized as a bare `[ymin, xmin, ymax, xmax]` array, matching engine output rows.
impl<TSpace> Serialize for BBox<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de, TSpace> Deserialize<'de> for BBox<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [ymin, xmin, ymax, xmax] = <[f64; 4]>::deserialize(deserializer)?;
        Ok(BBox::from_yxyx(ymin, xmin, ymax, xmax))
    }
}
