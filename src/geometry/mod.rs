//! Box geometry shared by detections and the annotator.
//!
//! Boxes carry a type-level marker for their coordinate space so a
//! normalized detector box cannot be drawn as if it were already in pixels.
//!
//! ```
//! use facebox::geometry::{BBox, Normalized};
//!
//! let det: BBox<Normalized> = BBox::from_yxyx(0.1, 0.2, 0.5, 0.6);
//! let px = det.to_pixel(100.0, 100.0);
//! assert_eq!(px.left().round(), 20.0);
//! assert_eq!(px.top().round(), 10.0);
//! ```

mod bbox;
mod space;

pub use bbox::BBox;
pub use space::{Normalized, Pixel};
