//! Categories derived from a label map, and the id-keyed index used when
//! rendering detections.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{load_labelmap, LabelMap};
use crate::error::FaceboxError;

/// Offset between zero-based class slots and one-based category ids.
const LABEL_ID_OFFSET: u32 = 1;

/// Identifier of a detection class.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u32);

impl CategoryId {
    /// Creates a new CategoryId.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying u32 value.
    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for CategoryId {
    fn from(id: u32) -> Self {
        CategoryId::new(id)
    }
}

impl fmt::Debug for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CategoryId({})", self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved `{id, name}` pair used for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    /// Creates a new category.
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Lookup table from category id to [`Category`].
///
/// Built once with [`create_category_index`] (or
/// [`CategoryIndex::from_label_map_file`]) and read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryIndex {
    categories: BTreeMap<CategoryId, Category>,
}

impl CategoryIndex {
    /// Loads a label map, converts it to categories and indexes them.
    pub fn from_label_map_file(
        path: &Path,
        max_num_classes: u32,
        use_display_name: bool,
    ) -> Result<Self, FaceboxError> {
        let label_map = load_labelmap(path)?;
        let categories =
            convert_label_map_to_categories(Some(&label_map), max_num_classes, use_display_name);
        Ok(create_category_index(&categories))
    }

    /// Returns the category for `id`, if present.
    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(&id)
    }

    /// Returns the display name for `id`, if present.
    pub fn name(&self, id: CategoryId) -> Option<&str> {
        self.get(id).map(|c| c.name.as_str())
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.categories.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Iterates categories in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }
}

/// Converts a label map into the category list used for display.
///
/// With no label map, `max_num_classes` placeholder categories named
/// `category_{id}` are synthesized. Otherwise entries are taken in file
/// order; ids outside `[1, max_num_classes]` are skipped, and when several
/// entries share an id only the first one is kept.
///
/// # Example
/// ```
/// use facebox::label_map::{convert_label_map_to_categories, LabelMap, LabelMapEntry};
///
/// let label_map = LabelMap { items: vec![LabelMapEntry::new(1, "face")] };
/// let categories = convert_label_map_to_categories(Some(&label_map), 2, true);
/// assert_eq!(categories.len(), 1);
/// assert_eq!(categories[0].name, "face");
/// ```
pub fn convert_label_map_to_categories(
    label_map: Option<&LabelMap>,
    max_num_classes: u32,
    use_display_name: bool,
) -> Vec<Category> {
    let Some(label_map) = label_map else {
        return (0..max_num_classes)
            .map(|class_id| {
                let id = class_id + LABEL_ID_OFFSET;
                Category::new(id, format!("category_{}", id))
            })
            .collect();
    };

    let mut categories: Vec<Category> = Vec::new();
    for item in &label_map.items {
        let in_range = item.id > 0 && i64::from(item.id) <= i64::from(max_num_classes);
        if !in_range {
            tracing::info!(
                id = item.id,
                "Ignore item {} since it falls outside of requested label range.",
                item.id
            );
            continue;
        }

        let id = CategoryId(item.id as u32);
        if categories.iter().any(|c| c.id == id) {
            continue;
        }

        let name = match (&item.display_name, use_display_name) {
            (Some(display_name), true) => display_name.clone(),
            _ => item.name.clone(),
        };
        categories.push(Category { id, name });
    }

    categories
}

/// Indexes categories by id.
///
/// If `categories` contains the same id more than once, the last one wins.
pub fn create_category_index(categories: &[Category]) -> CategoryIndex {
    let mut index = BTreeMap::new();
    for category in categories {
        index.insert(category.id, category.clone());
    }
    CategoryIndex { categories: index }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label_map::LabelMapEntry;

    fn label_map(entries: Vec<LabelMapEntry>) -> LabelMap {
        LabelMap { items: entries }
    }

    #[test]
    fn synthesizes_categories_without_label_map() {
        let categories = convert_label_map_to_categories(None, 3, true);
        assert_eq!(
            categories,
            vec![
                Category::new(1, "category_1"),
                Category::new(2, "category_2"),
                Category::new(3, "category_3"),
            ]
        );
    }

    #[test]
    fn zero_classes_synthesizes_nothing() {
        assert!(convert_label_map_to_categories(None, 0, true).is_empty());
    }

    #[test]
    fn present_but_empty_label_map_yields_nothing() {
        let empty = label_map(vec![]);
        assert!(convert_label_map_to_categories(Some(&empty), 5, true).is_empty());
    }

    #[test]
    fn single_face_entry_with_two_classes() {
        let map = label_map(vec![LabelMapEntry::new(1, "face")]);
        let categories = convert_label_map_to_categories(Some(&map), 2, true);
        assert_eq!(categories, vec![Category::new(1, "face")]);
    }

    #[test]
    fn display_name_preference() {
        let map = label_map(vec![LabelMapEntry::with_display_name(1, "a", "b")]);
        assert_eq!(
            convert_label_map_to_categories(Some(&map), 1, true)[0].name,
            "b"
        );
        assert_eq!(
            convert_label_map_to_categories(Some(&map), 1, false)[0].name,
            "a"
        );
    }

    #[test]
    fn display_name_falls_back_to_name_when_absent() {
        let map = label_map(vec![LabelMapEntry::new(1, "a")]);
        assert_eq!(
            convert_label_map_to_categories(Some(&map), 1, true)[0].name,
            "a"
        );
    }

    #[test]
    fn skips_ids_outside_requested_range() {
        let map = label_map(vec![
            LabelMapEntry::new(3, "three"),
            LabelMapEntry::new(1, "one"),
            LabelMapEntry::new(0, "zero"),
            LabelMapEntry::new(2, "two"),
        ]);
        let categories = convert_label_map_to_categories(Some(&map), 2, false);
        assert_eq!(
            categories,
            vec![Category::new(1, "one"), Category::new(2, "two")]
        );
    }

    #[test]
    fn conversion_keeps_first_duplicate() {
        let map = label_map(vec![
            LabelMapEntry::new(1, "first"),
            LabelMapEntry::new(2, "other"),
            LabelMapEntry::new(1, "second"),
        ]);
        let categories = convert_label_map_to_categories(Some(&map), 5, false);
        assert_eq!(
            categories,
            vec![Category::new(1, "first"), Category::new(2, "other")]
        );
    }

    #[test]
    fn index_keeps_last_duplicate() {
        let categories = vec![
            Category::new(1, "first"),
            Category::new(2, "other"),
            Category::new(1, "second"),
        ];
        let index = create_category_index(&categories);
        assert_eq!(index.len(), 2);
        assert_eq!(index.name(CategoryId(1)), Some("second"));
        assert_eq!(index.name(CategoryId(2)), Some("other"));
        assert!(index.get(CategoryId(3)).is_none());
    }

    #[test]
    fn index_iterates_in_id_order() {
        let index = create_category_index(&[
            Category::new(5, "e"),
            Category::new(2, "b"),
            Category::new(9, "i"),
        ]);
        let ids: Vec<u32> = index.iter().map(|c| c.id.as_u32()).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn index_serializes_as_id_keyed_map() {
        let index = create_category_index(&[Category::new(1, "face")]);
        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(json, r#"{"1":{"id":1,"name":"face"}}"#);
    }
}
