//! Label maps and the category index built from them.
//!
//! A label map defines the mapping from integer class ids to
//! human-readable names. Files are protobuf `StringIntLabelMap` messages,
//! normally in text format:
//!
//! ```text
//! item {
//!   id: 1
//!   name: 'face'
//! }
//! ```
//!
//! The binary protobuf encoding of the same schema is accepted as a
//! fallback when the text parse fails.
//!
//! # Typical use
//!
//! ```no_run
//! use std::path::Path;
//! use facebox::label_map::{
//!     convert_label_map_to_categories, create_category_index, load_labelmap, CategoryId,
//! };
//!
//! let label_map = load_labelmap(Path::new("face_label_map.pbtxt"))?;
//! let categories = convert_label_map_to_categories(Some(&label_map), 2, true);
//! let index = create_category_index(&categories);
//! println!("{:?}", index.name(CategoryId(1)));
//! # Ok::<(), facebox::FaceboxError>(())
//! ```

mod category;
pub mod proto;
mod text;

pub use category::{
    convert_label_map_to_categories, create_category_index, Category, CategoryId, CategoryIndex,
};
pub use text::TextFormatError;

#[cfg(feature = "fuzzing")]
pub use text::fuzz_parse_text;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::FaceboxError;

/// One `item` of a label map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelMapEntry {
    /// Class id. Loaded label maps guarantee `id >= 1`.
    pub id: i32,
    pub name: String,
    pub display_name: Option<String>,
}

impl LabelMapEntry {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(
        id: i32,
        name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            display_name: Some(display_name.into()),
        }
    }
}

/// A parsed label map: entries in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelMap {
    pub items: Vec<LabelMapEntry>,
}

/// Loads and validates a label map file.
///
/// # Errors
/// - [`FaceboxError::Io`] if the file cannot be read.
/// - [`FaceboxError::LabelMapParse`] if the contents are neither a valid
///   text-format nor a valid binary label map.
/// - [`FaceboxError::InvalidLabelMap`] if any entry has `id < 1`.
pub fn load_labelmap(path: &Path) -> Result<LabelMap, FaceboxError> {
    let bytes = fs::read(path)?;
    parse_label_map(&bytes, path)
}

/// Reads a label map from a string. Useful for testing without file I/O.
pub fn from_label_map_str(input: &str) -> Result<LabelMap, FaceboxError> {
    from_label_map_slice(input.as_bytes())
}

/// Reads a label map from raw bytes, text or binary.
pub fn from_label_map_slice(bytes: &[u8]) -> Result<LabelMap, FaceboxError> {
    parse_label_map(bytes, Path::new("<bytes>"))
}

/// Reads a label map and returns a mapping from name to id.
///
/// If several entries share a name, the last one wins.
pub fn get_label_map_dict(path: &Path) -> Result<BTreeMap<String, i32>, FaceboxError> {
    let label_map = load_labelmap(path)?;
    Ok(label_map
        .items
        .into_iter()
        .map(|item| (item.name, item.id))
        .collect())
}

fn parse_label_map(bytes: &[u8], path: &Path) -> Result<LabelMap, FaceboxError> {
    let text_result = match std::str::from_utf8(bytes) {
        Ok(input) => text::parse(input).map_err(|e| e.to_string()),
        Err(e) => Err(format!("invalid UTF-8: {}", e)),
    };

    let label_map = match text_result {
        Ok(label_map) => label_map,
        Err(text_error) => {
            tracing::debug!(
                path = %path.display(),
                error = %text_error,
                "label map is not text format, trying binary"
            );
            proto::decode(bytes).map_err(|e| FaceboxError::LabelMapParse {
                path: path.to_path_buf(),
                text: text_error,
                binary: e.to_string(),
            })?
        }
    };

    validate_label_map(&label_map, path)?;
    Ok(label_map)
}

fn validate_label_map(label_map: &LabelMap, path: &Path) -> Result<(), FaceboxError> {
    match label_map.items.iter().find(|item| item.id < 1) {
        Some(item) => Err(FaceboxError::InvalidLabelMap {
            path: path.to_path_buf(),
            id: item.id,
        }),
        None => Ok(()),
    }
}
