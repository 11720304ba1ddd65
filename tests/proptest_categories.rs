use std::collections::BTreeSet;

use facebox::label_map::{
    convert_label_map_to_categories, create_category_index, from_label_map_slice, proto,
    CategoryId,
};
use proptest::prelude::*;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn synthesized_categories_cover_every_id(max_num_classes in 0u32..50) {
        let categories = convert_label_map_to_categories(None, max_num_classes, true);
        prop_assert_eq!(categories.len(), max_num_classes as usize);
        for (i, category) in categories.iter().enumerate() {
            let id = i as u32 + 1;
            prop_assert_eq!(category.id, CategoryId(id));
            prop_assert_eq!(&category.name, &format!("category_{}", id));
        }
    }

    #[test]
    fn converted_ids_are_unique_and_in_range(
        label_map in proptest_helpers::arb_label_map(16),
        max_num_classes in 0u32..12,
    ) {
        let categories = convert_label_map_to_categories(Some(&label_map), max_num_classes, true);

        let mut seen = BTreeSet::new();
        for category in &categories {
            prop_assert!(category.id.as_u32() >= 1);
            prop_assert!(category.id.as_u32() <= max_num_classes);
            prop_assert!(seen.insert(category.id), "duplicate id {}", category.id);
        }

        let expected: BTreeSet<CategoryId> = label_map
            .items
            .iter()
            .filter(|item| item.id as u32 <= max_num_classes)
            .map(|item| CategoryId(item.id as u32))
            .collect();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn first_entry_wins_for_duplicate_ids(
        label_map in proptest_helpers::arb_label_map(16),
        use_display_name in any::<bool>(),
    ) {
        let categories = convert_label_map_to_categories(Some(&label_map), 12, use_display_name);
        let index = create_category_index(&categories);

        for category in &categories {
            let first = label_map
                .items
                .iter()
                .find(|item| item.id as u32 == category.id.as_u32())
                .expect("category comes from an item");
            let expected = match (&first.display_name, use_display_name) {
                (Some(display_name), true) => display_name,
                _ => &first.name,
            };
            prop_assert_eq!(&category.name, expected);
            prop_assert_eq!(index.name(category.id), Some(expected.as_str()));
        }
        prop_assert_eq!(index.len(), categories.len());
    }

    #[test]
    fn binary_encoding_reloads_identically(label_map in proptest_helpers::arb_label_map(8)) {
        let bytes = proto::encode(&label_map);
        let restored = from_label_map_slice(&bytes);
        prop_assert!(restored.is_ok(), "{:?}", restored);
        prop_assert_eq!(restored.unwrap(), label_map);
    }
}
