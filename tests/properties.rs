//! Property tests for the directory views and the record codec.

use proptest::prelude::*;
use reclaim::{
    codec, DirectorySnapshot, Item, ItemFilter, ItemId, OwnerId, Photo, Status, Timestamp,
};

fn arb_status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Lost),
        Just(Status::Found),
        Just(Status::Claimed),
    ]
}

fn arb_filter() -> impl Strategy<Value = ItemFilter> {
    prop_oneof![
        Just(ItemFilter::All),
        Just(ItemFilter::LostOnly),
        Just(ItemFilter::FoundOnly),
    ]
}

fn arb_opt_text() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), "[a-zA-Z0-9 ]{1,12}".prop_map(Some)]
}

fn arb_photo() -> impl Strategy<Value = Option<Photo>> {
    prop_oneof![
        Just(None),
        "[a-z0-9]{1,10}".prop_map(|s| Some(Photo::Url(format!("https://example.com/{s}.jpg")))),
    ]
}

fn arb_item() -> impl Strategy<Value = Item> {
    (
        "[a-zA-Z ]{0,16}",
        "[a-zA-Z ]{0,24}",
        arb_opt_text(),
        arb_status(),
        0usize..4,
        arb_photo(),
    )
        .prop_map(|(title, description, location, status, owner, photo)| Item {
            id: None,
            owner_id: OwnerId(format!("owner-{owner}")),
            title,
            description,
            location,
            contact_name: "Sam".to_string(),
            contact_phone: "555-0101".to_string(),
            contact_email: None,
            status,
            photo,
            created_at: Timestamp(1),
            updated_at: Timestamp(2),
        })
}

fn arb_snapshot() -> impl Strategy<Value = DirectorySnapshot> {
    prop::collection::vec(arb_item(), 0..24).prop_map(|mut items| {
        for (ix, item) in items.iter_mut().enumerate() {
            item.id = Some(ItemId(format!("id{ix}")));
        }
        DirectorySnapshot::new(items)
    })
}

fn item_ids(items: &[Item]) -> Vec<String> {
    items
        .iter()
        .map(|i| i.id.as_ref().unwrap().as_str().to_string())
        .collect()
}

proptest! {
    #[test]
    fn prop_filter_all_excludes_claimed_and_is_subset(snapshot in arb_snapshot()) {
        let filtered = snapshot.filtered(ItemFilter::All);

        prop_assert!(filtered.iter().all(|item| item.status != Status::Claimed));
        prop_assert!(filtered.len() <= snapshot.len());
        for item in &filtered {
            prop_assert!(snapshot.items().iter().any(|s| s.id == item.id));
        }
    }

    #[test]
    fn prop_empty_query_equals_filter(snapshot in arb_snapshot(), filter in arb_filter()) {
        prop_assert_eq!(
            item_ids(&snapshot.search("", filter)),
            item_ids(&snapshot.filtered(filter))
        );
    }

    #[test]
    fn prop_search_hits_only_searchable_fields(
        snapshot in arb_snapshot(),
        query in "[a-zA-Z]{1,6}",
    ) {
        let q = query.to_lowercase();
        for hit in snapshot.search(&query, ItemFilter::All) {
            let matched = hit.title.to_lowercase().contains(&q)
                || hit.description.to_lowercase().contains(&q)
                || hit
                    .location
                    .as_deref()
                    .is_some_and(|loc| loc.to_lowercase().contains(&q));
            prop_assert!(matched, "hit {:?} does not match query {q}", hit.id);
        }
    }

    #[test]
    fn prop_filter_preserves_snapshot_order(snapshot in arb_snapshot(), filter in arb_filter()) {
        let filtered = item_ids(&snapshot.filtered(filter));
        let mut expected: Vec<String> = item_ids(&snapshot.filtered(filter));
        expected.sort_by_key(|id| {
            snapshot
                .items()
                .iter()
                .position(|item| item.id.as_ref().unwrap().as_str() == id)
                .unwrap()
        });
        prop_assert_eq!(filtered, expected);
    }

    #[test]
    fn prop_codec_roundtrip_without_encoded_photo(item in arb_item()) {
        let mut item = item;
        item.id = Some(ItemId::from("item-1"));

        let redecoded = codec::decode("item-1", &codec::encode(&item)).unwrap();
        prop_assert_eq!(item, redecoded);
    }
}
