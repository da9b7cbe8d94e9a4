use disclosure_index::{Descriptor, MetadataIndex};
use proptest::prelude::*;

fn field() -> impl Strategy<Value = String> {
    "[a-cA-C上下文 -]{0,8}"
}

fn descriptor_set() -> impl Strategy<Value = Vec<Descriptor>> {
    prop::collection::vec(
        (field(), field(), prop::collection::vec(field(), 0..3), 0u64..5000),
        0..12,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, description, tags, weight))| {
                Descriptor::new(format!("item-{i}"), name, weight)
                    .with_description(description)
                    .with_tags(tags)
            })
            .collect()
    })
}

fn expected_match(descriptor: &Descriptor, query: &str) -> bool {
    let q = query.to_lowercase();
    descriptor.name.to_lowercase().contains(&q)
        || descriptor.description.to_lowercase().contains(&q)
        || descriptor.tags.iter().any(|t| t.to_lowercase().contains(&q))
}

proptest! {
    #[test]
    fn search_returns_exactly_the_matching_descriptors(
        descriptors in descriptor_set(),
        query in "[a-cA-C上下]{1,3}",
    ) {
        let index = MetadataIndex::from_descriptors(descriptors.clone()).unwrap();
        let found: Vec<String> = index.search(&query).into_iter().map(|c| c.id).collect();
        let expected: Vec<String> = descriptors
            .iter()
            .filter(|d| expected_match(d, &query))
            .map(|d| d.id.clone())
            .collect();

        prop_assert_eq!(found, expected);
    }

    #[test]
    fn search_is_deterministic(descriptors in descriptor_set(), query in "[a-c]{0,2}") {
        let index = MetadataIndex::from_descriptors(descriptors).unwrap();
        prop_assert_eq!(index.search(&query), index.search(&query));
    }

    #[test]
    fn preview_never_exceeds_limit_plus_marker(
        description in "[a-z上下文 ]{0,40}",
        max_length in 0usize..50,
    ) {
        let index = MetadataIndex::from_descriptors(vec![
            Descriptor::new("p", "P", 1).with_description(description.clone()),
        ])
        .unwrap();
        let preview = index.preview("p", max_length).unwrap();
        let len = description.chars().count();

        if len > max_length {
            prop_assert_eq!(preview.chars().count(), max_length + 3);
            prop_assert!(preview.ends_with("..."));
        } else {
            prop_assert_eq!(preview, description);
        }
    }
}

#[test]
fn empty_query_matches_everything() {
    let index = MetadataIndex::from_descriptors(vec![
        Descriptor::new("a", "A", 1),
        Descriptor::new("b", "B", 2),
    ])
    .unwrap();
    assert_eq!(index.search("").len(), 2);
}
