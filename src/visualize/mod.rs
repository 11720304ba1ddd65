//! Drawing bounding boxes and stacked labels onto RGB images.
//!
//! All drawing mutates the caller's [`RgbImage`] in place; nothing keeps a
//! reference to the image after a call returns.
//!
//! # Label layout
//!
//! Display strings are stacked above a box's top edge, last string lowest.
//! Each string sits on a filled background in the box color with black text.
//! With the default [`LabelStride::Compatible`] consecutive label
//! backgrounds overlap by `4 * margin` pixels, as in the classic
//! TensorFlow Object Detection visualizer output. [`LabelStride::Padded`]
//! stacks them without overlap.

mod color;
mod font;

pub use color::{Color, UnknownColor, STANDARD_COLORS};
pub use font::{LabelFont, DEFAULT_FONT_NAME, DEFAULT_FONT_SIZE};

use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use ndarray::{ArrayBase, ArrayView2, Data, Dimension, Ix2};

use crate::detection::Detection;
use crate::error::FaceboxError;
use crate::geometry::{BBox, Normalized, Pixel};
use crate::label_map::CategoryIndex;

/// How far the label cursor moves up after each stacked display string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelStride {
    /// `text_height - 2 * margin`; stacked backgrounds overlap.
    #[default]
    Compatible,
    /// `text_height + 2 * margin`, one full background per string.
    Padded,
}

/// Style of a single box.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawOptions {
    pub color: Color,
    /// Outline width in pixels.
    pub thickness: u32,
    /// Interpret coordinates as fractions of the image size.
    pub use_normalized_coordinates: bool,
    pub label_stride: LabelStride,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            color: Color::RED,
            thickness: 4,
            use_normalized_coordinates: true,
            label_stride: LabelStride::Compatible,
        }
    }
}

/// Filtering and styling for [`BoxAnnotator::visualize_detections`].
#[derive(Clone, Debug, PartialEq)]
pub struct VisualizeOptions {
    /// Only the first this-many detections are considered. `None` = all.
    pub max_boxes_to_draw: Option<usize>,
    /// Detections must score strictly above this to be drawn.
    pub min_score_thresh: f32,
    /// Ignore classes: one color, score-only labels.
    pub agnostic_mode: bool,
    pub line_thickness: u32,
    pub label_stride: LabelStride,
}

impl Default for VisualizeOptions {
    fn default() -> Self {
        Self {
            max_boxes_to_draw: Some(20),
            min_score_thresh: 0.5,
            agnostic_mode: false,
            line_thickness: 4,
            label_stride: LabelStride::Compatible,
        }
    }
}

/// Renders boxes and labels with a fixed font.
#[derive(Clone, Debug)]
pub struct BoxAnnotator {
    font: LabelFont,
}

impl Default for BoxAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxAnnotator {
    /// Uses [`DEFAULT_FONT_NAME`] at [`DEFAULT_FONT_SIZE`], or the built-in
    /// font if that is unavailable.
    pub fn new() -> Self {
        Self::with_font(LabelFont::load_or_default(
            DEFAULT_FONT_NAME,
            DEFAULT_FONT_SIZE,
        ))
    }

    pub fn with_font(font: LabelFont) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &LabelFont {
        &self.font
    }

    /// Draws one box with its display strings stacked above the top edge.
    ///
    /// Coordinates are `(ymin, xmin, ymax, xmax)`, normalized or absolute
    /// according to [`DrawOptions::use_normalized_coordinates`].
    #[allow(clippy::too_many_arguments)]
    pub fn draw_bounding_box_on_image<S: AsRef<str>>(
        &self,
        image: &mut RgbImage,
        ymin: f64,
        xmin: f64,
        ymax: f64,
        xmax: f64,
        options: &DrawOptions,
        display_strs: &[S],
    ) {
        let bbox = if options.use_normalized_coordinates {
            BBox::<Normalized>::from_yxyx(ymin, xmin, ymax, xmax)
                .to_pixel(image.width() as f64, image.height() as f64)
        } else {
            BBox::<Pixel>::from_yxyx(ymin, xmin, ymax, xmax)
        };
        self.draw_pixel_box(image, &bbox, options, display_strs);
    }

    /// Draws every row of an `[N, 4]` array of normalized
    /// `(ymin, xmin, ymax, xmax)` boxes, row 0 first.
    ///
    /// A zero-dimensional array or an array with no rows draws nothing.
    ///
    /// # Errors
    /// - [`FaceboxError::InvalidShape`] unless `boxes` is 2-D with 4 columns.
    /// - [`FaceboxError::DisplayStringsMismatch`] if `display_str_list_list`
    ///   does not have one entry per row.
    ///
    /// The image is untouched when an error is returned.
    pub fn draw_bounding_boxes_on_image<A, D>(
        &self,
        image: &mut RgbImage,
        boxes: &ArrayBase<A, D>,
        options: &DrawOptions,
        display_str_list_list: Option<&[Vec<String>]>,
    ) -> Result<(), FaceboxError>
    where
        A: Data<Elem = f32>,
        D: Dimension,
    {
        let row_options = DrawOptions {
            use_normalized_coordinates: true,
            ..options.clone()
        };
        for_each_box(boxes, display_str_list_list, |coords, display_strs| {
            let [ymin, xmin, ymax, xmax] = coords.map(f64::from);
            self.draw_bounding_box_on_image(
                image,
                ymin,
                xmin,
                ymax,
                xmax,
                &row_options,
                display_strs,
            );
        })
    }

    /// Draws scored detections with `"{name}: {percent}%"` labels.
    ///
    /// Detections sharing identical coordinates are merged into one box
    /// carrying all their labels. Returns the number of boxes drawn.
    pub fn visualize_detections(
        &self,
        image: &mut RgbImage,
        detections: &[Detection],
        category_index: &CategoryIndex,
        options: &VisualizeOptions,
    ) -> usize {
        let limit = options.max_boxes_to_draw.unwrap_or(detections.len());
        let mut groups: Vec<BoxGroup> = Vec::new();

        for detection in detections.iter().take(limit) {
            // NaN scores never pass.
            if !(detection.score > options.min_score_thresh) {
                continue;
            }

            let percent = (100.0 * detection.score) as i64;
            let (display_str, color) = if options.agnostic_mode {
                (format!("score: {}%", percent), Color::DARK_ORANGE)
            } else {
                let class_name = category_index.name(detection.class_id).unwrap_or("N/A");
                (
                    format!("{}: {}%", class_name, percent),
                    Color::standard(detection.class_id.as_u32()),
                )
            };

            let key = box_key(&detection.bbox);
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => {
                    group.color = color;
                    group.display_strs.push(display_str);
                }
                None => groups.push(BoxGroup {
                    key,
                    bbox: detection.bbox,
                    color,
                    display_strs: vec![display_str],
                }),
            }
        }

        for group in &groups {
            let draw_options = DrawOptions {
                color: group.color,
                thickness: options.line_thickness,
                use_normalized_coordinates: true,
                label_stride: options.label_stride,
            };
            let [ymin, xmin, ymax, xmax] = group.bbox.to_array();
            self.draw_bounding_box_on_image(
                image,
                ymin,
                xmin,
                ymax,
                xmax,
                &draw_options,
                group.display_strs.as_slice(),
            );
        }

        groups.len()
    }

    fn draw_pixel_box<S: AsRef<str>>(
        &self,
        image: &mut RgbImage,
        bbox: &BBox<Pixel>,
        options: &DrawOptions,
        display_strs: &[S],
    ) {
        let color = options.color.to_rgb();

        for edge in bbox.outline().windows(2) {
            draw_thick_segment(image, edge[0], edge[1], options.thickness, color);
        }

        let left = bbox.left();
        let mut text_bottom = bbox.top();
        for display_str in display_strs.iter().rev() {
            let display_str = display_str.as_ref();
            let (text_width, text_height) = self.font.text_size(display_str);
            let (text_width, text_height) = (text_width as f64, text_height as f64);
            let margin = (0.05 * text_height).ceil();

            fill_rect_inclusive(
                image,
                (left, text_bottom - text_height - 2.0 * margin),
                (left + text_width, text_bottom),
                color,
            );
            self.font.draw_text(
                image,
                Color::BLACK.to_rgb(),
                to_pixel_i32(left + margin),
                to_pixel_i32(text_bottom - text_height - margin),
                display_str,
            );

            text_bottom -= match options.label_stride {
                LabelStride::Compatible => text_height - 2.0 * margin,
                LabelStride::Padded => text_height + 2.0 * margin,
            };
        }
    }
}

struct BoxGroup {
    key: [u64; 4],
    bbox: BBox<Normalized>,
    color: Color,
    display_strs: Vec<String>,
}

fn box_key(bbox: &BBox<Normalized>) -> [u64; 4] {
    bbox.to_array().map(f64::to_bits)
}

/// Validates `boxes` (and labels) up front, then calls `draw` once per row.
fn for_each_box<A, D, F>(
    boxes: &ArrayBase<A, D>,
    display_str_list_list: Option<&[Vec<String>]>,
    mut draw: F,
) -> Result<(), FaceboxError>
where
    A: Data<Elem = f32>,
    D: Dimension,
    F: FnMut([f32; 4], &[String]),
{
    if boxes.ndim() == 0 {
        return Ok(());
    }

    let rows: ArrayView2<'_, f32> = boxes
        .view()
        .into_dimensionality::<Ix2>()
        .ok()
        .filter(|rows| rows.ncols() == 4)
        .ok_or_else(|| FaceboxError::InvalidShape {
            expected: "[N, 4]",
            shape: boxes.shape().to_vec(),
        })?;

    if let Some(lists) = display_str_list_list {
        if lists.len() != rows.nrows() {
            return Err(FaceboxError::DisplayStringsMismatch {
                boxes: rows.nrows(),
                labels: lists.len(),
            });
        }
    }

    for (i, row) in rows.outer_iter().enumerate() {
        let display_strs: &[String] = match display_str_list_list {
            Some(lists) => &lists[i],
            None => &[],
        };
        draw([row[0], row[1], row[2], row[3]], display_strs);
    }

    Ok(())
}

/// Draws one edge of an axis-aligned box as a band `thickness` pixels wide
/// centered on the edge.
fn draw_thick_segment(
    image: &mut RgbImage,
    from: (f64, f64),
    to: (f64, f64),
    thickness: u32,
    color: Rgb<u8>,
) {
    let t = i64::from(thickness.max(1));
    let half = t / 2;
    let (x0, y0) = (to_pixel_i64(from.0), to_pixel_i64(from.1));
    let (x1, y1) = (to_pixel_i64(to.0), to_pixel_i64(to.1));

    let (min_x, max_x) = (x0.min(x1), x0.max(x1));
    let (min_y, max_y) = (y0.min(y1), y0.max(y1));
    fill_rect(
        image,
        min_x - half,
        min_y - half,
        max_x - min_x + t,
        max_y - min_y + t,
        color,
    );
}

/// Fills the rectangle with both corners included.
fn fill_rect_inclusive(image: &mut RgbImage, a: (f64, f64), b: (f64, f64), color: Rgb<u8>) {
    let (x0, y0) = (to_pixel_i64(a.0), to_pixel_i64(a.1));
    let (x1, y1) = (to_pixel_i64(b.0), to_pixel_i64(b.1));
    let (min_x, max_x) = (x0.min(x1), x0.max(x1));
    let (min_y, max_y) = (y0.min(y1), y0.max(y1));
    fill_rect(
        image,
        min_x,
        min_y,
        max_x - min_x + 1,
        max_y - min_y + 1,
        color,
    );
}

/// Fills `[x, x + w) x [y, y + h)` clipped to the image.
fn fill_rect(image: &mut RgbImage, x: i64, y: i64, w: i64, h: i64, color: Rgb<u8>) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = x.saturating_add(w).min(image.width() as i64);
    let y1 = y.saturating_add(h).min(image.height() as i64);
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let rect = Rect::at(x0 as i32, y0 as i32).of_size((x1 - x0) as u32, (y1 - y0) as u32);
    draw_filled_rect_mut(image, rect, color);
}

/// Pixel coordinates are clamped to `[-COORD_LIMIT, COORD_LIMIT]` so band
/// and rectangle arithmetic cannot overflow.
const COORD_LIMIT: f64 = (1u32 << 30) as f64;

#[inline]
fn to_pixel_i64(v: f64) -> i64 {
    v.round().clamp(-COORD_LIMIT, COORD_LIMIT) as i64
}

#[inline]
fn to_pixel_i32(v: f64) -> i32 {
    v.round().clamp(-COORD_LIMIT, COORD_LIMIT) as i32
}

/// Saves an image as PNG.
pub fn save_image_as_png(image: &RgbImage, path: &Path) -> Result<(), FaceboxError> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| FaceboxError::Image {
            path: path.to_path_buf(),
            source,
        })
}

/// Encodes an image as PNG bytes.
pub fn encode_image_as_png(image: &RgbImage) -> Result<Vec<u8>, FaceboxError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ColorType::Rgb8,
        )
        .map_err(FaceboxError::ImageEncode)?;
    Ok(bytes)
}
