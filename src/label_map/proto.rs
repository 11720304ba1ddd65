//! Binary protobuf schema for `StringIntLabelMap`.
//!
//! Mirrors the TensorFlow Object Detection `string_int_label_map.proto`:
//!
//! ```text
//! message StringIntLabelMapItem {
//!   optional string name = 1;
//!   optional int32 id = 2;
//!   optional string display_name = 3;
//! }
//! message StringIntLabelMap {
//!   repeated StringIntLabelMapItem item = 1;
//! }
//! ```
//!
//! Fields added by later revisions of the schema (keypoints, ancestor ids,
//! ...) are skipped by prost as unknown fields.

use prost::Message;

use super::{LabelMap, LabelMapEntry};

/// One entry of a binary label map.
#[derive(Clone, PartialEq, Message)]
pub struct StringIntLabelMapItem {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(int32, optional, tag = "2")]
    pub id: Option<i32>,
    #[prost(string, optional, tag = "3")]
    pub display_name: Option<String>,
}

/// A binary label map.
#[derive(Clone, PartialEq, Message)]
pub struct StringIntLabelMap {
    #[prost(message, repeated, tag = "1")]
    pub item: Vec<StringIntLabelMapItem>,
}

impl From<StringIntLabelMap> for LabelMap {
    fn from(proto: StringIntLabelMap) -> Self {
        let items = proto
            .item
            .into_iter()
            .map(|item| LabelMapEntry {
                id: item.id.unwrap_or_default(),
                name: item.name.unwrap_or_default(),
                display_name: item.display_name,
            })
            .collect();
        LabelMap { items }
    }
}

impl From<&LabelMap> for StringIntLabelMap {
    fn from(label_map: &LabelMap) -> Self {
        let item = label_map
            .items
            .iter()
            .map(|entry| StringIntLabelMapItem {
                name: Some(entry.name.clone()),
                id: Some(entry.id),
                display_name: entry.display_name.clone(),
            })
            .collect();
        StringIntLabelMap { item }
    }
}

/// Decodes a binary `StringIntLabelMap`.
pub(super) fn decode(bytes: &[u8]) -> Result<LabelMap, prost::DecodeError> {
    StringIntLabelMap::decode(bytes).map(LabelMap::from)
}

/// Encodes a label map in the binary form.
pub fn encode(label_map: &LabelMap) -> Vec<u8> {
    StringIntLabelMap::from(label_map).encode_to_vec()
}
