#![allow(dead_code)]

use facebox::label_map::{LabelMap, LabelMapEntry};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_entry() -> impl Strategy<Value = LabelMapEntry> {
    (
        1i32..=12,
        "[a-z_]{1,8}",
        proptest::option::of("[A-Z][a-z]{0,6}"),
    )
        .prop_map(|(id, name, display_name)| LabelMapEntry {
            id,
            name,
            display_name,
        })
}

/// Label maps with small, frequently colliding ids.
pub fn arb_label_map(max_items: usize) -> impl Strategy<Value = LabelMap> {
    proptest::collection::vec(arb_entry(), 0..=max_items).prop_map(|items| LabelMap { items })
}
