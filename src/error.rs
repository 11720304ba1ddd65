use std::path::PathBuf;
use thiserror::Error;

/// The main error type for facebox operations.
#[derive(Debug, Error)]
pub enum FaceboxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse label map {path}: not valid text format ({text}) and not valid binary protobuf ({binary})")]
    LabelMapParse {
        path: PathBuf,
        text: String,
        binary: String,
    },

    #[error("Invalid label map {path}: label map ids should be >= 1, found {id}")]
    InvalidLabelMap { path: PathBuf, id: i32 },

    #[error("Invalid shape: expected {expected}, got {shape:?}")]
    InvalidShape {
        expected: &'static str,
        shape: Vec<usize>,
    },

    #[error("Display strings do not match boxes: {boxes} box(es) but {labels} display string list(s)")]
    DisplayStringsMismatch { boxes: usize, labels: usize },

    #[error("Image error for {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode image: {0}")]
    ImageEncode(#[source] image::ImageError),

    #[error("Failed to parse detections JSON from {path}: {source}")]
    DetectionsJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write JSON output: {0}")]
    JsonOutput(#[source] serde_json::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_output_error_is_not_reported_as_io() {
        let source = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = FaceboxError::JsonOutput(source);
        assert!(err.to_string().starts_with("Failed to write JSON output: "));
        assert!(std::error::Error::source(&err).is_some());
    }
}
