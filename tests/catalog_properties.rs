//! Property tests for filter and suggest over generated catalogs.

use hteng_catalog::{Catalog, FilterField, ProductFilter, ProductRecord, SUGGEST_LIMIT};
use proptest::prelude::*;

fn record_strategy() -> impl Strategy<Value = ProductRecord> {
    (
        "[A-Ca-c]{1,3}-[0-9]",
        prop::sample::select(vec!["전자식", "디지털"]),
        prop::option::of(prop::sample::select(vec!["O", "X"])),
    )
        .prop_map(|(name, family, comm)| {
            ProductRecord::new()
                .with_field("제품", Some(name.as_str()))
                .with_field("제품군", Some(family))
                .with_field("통신여부", comm)
        })
}

fn catalog_strategy() -> impl Strategy<Value = Vec<ProductRecord>> {
    prop::collection::vec(record_strategy(), 0..40)
}

fn is_subsequence(sub: &[&ProductRecord], all: &[ProductRecord]) -> bool {
    let mut it = all.iter();
    sub.iter().all(|s| it.any(|a| std::ptr::eq(a, *s)))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn proptest_conjunction_is_intersection(
        records in catalog_strategy(),
        family in prop::sample::select(vec!["전자식", "디지털"]),
        comm in prop::sample::select(vec!["O", "X"]),
    ) {
        let catalog = Catalog::from_records(records);
        let by_family = ProductFilter::new().with_equals(FilterField::ProductFamily, family);
        let by_comm = ProductFilter::new().with_equals(FilterField::Communication, comm);
        let both = by_family.clone().with_equals(FilterField::Communication, comm);

        let left = catalog.filter(&by_family).items;
        let right = catalog.filter(&by_comm).items;
        let expected: Vec<&ProductRecord> = left
            .iter()
            .copied()
            .filter(|p| right.iter().any(|r| std::ptr::eq(*r, *p)))
            .collect();

        let actual = catalog.filter(&both).items;
        prop_assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            prop_assert!(std::ptr::eq(*a, *e));
        }
    }

    #[test]
    fn proptest_filter_preserves_load_order(
        records in catalog_strategy(),
        needle in "[A-C]{1,2}",
    ) {
        let catalog = Catalog::from_records(records);
        let result = catalog.filter(&ProductFilter::new().name_contains(needle.clone()));

        prop_assert!(is_subsequence(&result.items, catalog.list()));
        prop_assert_eq!(result.total_matches, result.items.len());
        for product in &result.items {
            prop_assert!(product.name().unwrap().contains(needle.as_str()));
        }
    }

    #[test]
    fn proptest_match_all_equals_list(records in catalog_strategy()) {
        let catalog = Catalog::from_records(records);
        let filter = ProductFilter::from_params([("제품군", "모든 조건"), ("통신여부", "*")]);
        prop_assert_eq!(catalog.filter(&filter).items.len(), catalog.len());
    }

    #[test]
    fn proptest_suggest_is_distinct_capped_and_contains(
        records in catalog_strategy(),
        q in "[a-cA-C]{1,2}",
    ) {
        let catalog = Catalog::from_records(records);
        let suggestions = catalog.suggest(Some(&q));

        prop_assert!(suggestions.len() <= SUGGEST_LIMIT);

        let mut sorted = suggestions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), suggestions.len());

        let needle = q.to_lowercase();
        for name in &suggestions {
            prop_assert!(name.to_lowercase().contains(&needle));
        }

        // Suggestions follow first occurrence in load order.
        let mut expected: Vec<&str> = Vec::new();
        for name in catalog.list().iter().filter_map(|p| p.name()) {
            if name.to_lowercase().contains(&needle) && !expected.contains(&name) {
                expected.push(name);
            }
        }
        expected.truncate(SUGGEST_LIMIT);
        prop_assert_eq!(suggestions, expected);
    }
}
