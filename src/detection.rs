//! Detection records produced by an external inference engine.
//!
//! Engines typically return four tensors per frame: `boxes` `[1, N, 4]`,
//! `scores` `[1, N]`, `classes` `[1, N]` (as floats) and `num_detections`.
//! [`detections_from_tensors`] turns those into [`Detection`] records.
//!
//! For offline use the same data can be stored as JSON:
//!
//! ```json
//! [
//!   { "box": [0.1, 0.2, 0.5, 0.6], "score": 0.97, "class_id": 1 }
//! ]
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::{ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};

use crate::error::FaceboxError;
use crate::geometry::{BBox, Normalized};
use crate::label_map::CategoryId;

/// One detected object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Normalized `(ymin, xmin, ymax, xmax)`.
    #[serde(rename = "box")]
    pub bbox: BBox<Normalized>,
    pub score: f32,
    pub class_id: CategoryId,
}

impl Detection {
    pub fn new(bbox: BBox<Normalized>, score: f32, class_id: impl Into<CategoryId>) -> Self {
        Self {
            bbox,
            score,
            class_id: class_id.into(),
        }
    }
}

/// Builds detections from raw engine output.
///
/// Leading unit dimensions are ignored, so both `[1, N, 4]` and `[N, 4]`
/// boxes are accepted. At most `num_detections` records are returned.
/// Class values are rounded to the nearest integer id.
///
/// # Errors
/// Returns [`FaceboxError::InvalidShape`] if the arrays do not describe the
/// same number of detections.
pub fn detections_from_tensors<SB, DB, SS, DS, SC, DC>(
    boxes: &ArrayBase<SB, DB>,
    scores: &ArrayBase<SS, DS>,
    classes: &ArrayBase<SC, DC>,
    num_detections: usize,
) -> Result<Vec<Detection>, FaceboxError>
where
    SB: Data<Elem = f32>,
    DB: Dimension,
    SS: Data<Elem = f32>,
    DS: Dimension,
    SC: Data<Elem = f32>,
    DC: Dimension,
{
    let box_shape = squeeze_leading(boxes.shape(), 2).filter(|s| s[1] == 4).ok_or_else(|| {
        FaceboxError::InvalidShape {
            expected: "[1, N, 4] or [N, 4]",
            shape: boxes.shape().to_vec(),
        }
    })?;
    let n = box_shape[0];

    for (array_shape, name) in [(scores.shape(), "scores"), (classes.shape(), "classes")] {
        match squeeze_leading(array_shape, 1) {
            Some(s) if s[0] == n => {}
            _ => {
                tracing::debug!(tensor = name, shape = ?array_shape, boxes = n, "tensor shape mismatch");
                return Err(FaceboxError::InvalidShape {
                    expected: "[1, N] or [N] matching boxes",
                    shape: array_shape.to_vec(),
                });
            }
        }
    }

    let coords: Vec<f32> = boxes.iter().copied().collect();
    let detections = coords
        .chunks_exact(4)
        .zip(scores.iter())
        .zip(classes.iter())
        .take(num_detections)
        .map(|((c, &score), &class)| {
            let bbox = BBox::from_yxyx(c[0].into(), c[1].into(), c[2].into(), c[3].into());
            Detection::new(bbox, score, CategoryId(class.round() as u32))
        })
        .collect();

    Ok(detections)
}

/// Drops leading size-1 axes until `ndim` axes remain.
fn squeeze_leading(shape: &[usize], ndim: usize) -> Option<&[usize]> {
    let mut shape = shape;
    while shape.len() > ndim && shape[0] == 1 {
        shape = &shape[1..];
    }
    (shape.len() == ndim).then_some(shape)
}

/// Reads detections from a JSON file.
pub fn read_detections_json(path: &Path) -> Result<Vec<Detection>, FaceboxError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| FaceboxError::DetectionsJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads detections from a JSON string.
pub fn from_detections_json_str(json: &str) -> Result<Vec<Detection>, FaceboxError> {
    serde_json::from_str(json).map_err(|source| FaceboxError::DetectionsJsonParse {
        path: Path::new("<string>").to_path_buf(),
        source,
    })
}
