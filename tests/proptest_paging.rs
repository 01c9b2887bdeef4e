//! Property-based tests using proptest
//!
//! These tests verify pager token handling, tag merge semantics and filter
//! parsing using randomized inputs.

use armsim::clock::ManualClock;
use armsim::models::{tags, GenericResource, ProvisioningState, ResourceGroupParams, ResourceParams, Tags, TagsResource};
use armsim::operations::ResourceFilter;
use armsim::paging::ItemPaged;
use armsim::{ClientOptions, ResourceManagementClient, StaticCredential};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use std::sync::Arc;

fn arb_tags() -> impl Strategy<Value = Tags> {
    prop::collection::hash_map("[a-z]{1,6}", "[A-Za-z0-9]{0,6}", 0..8)
}

fn resource_with(tags: Tags, resource_type: &str) -> GenericResource {
    let now = Utc::now();
    GenericResource {
        id: "/subscriptions/S/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/sa".to_string(),
        name: "sa".to_string(),
        resource_type: resource_type.to_string(),
        location: "uksouth".to_string(),
        tags: Some(tags),
        properties: None,
        kind: None,
        managed_by: None,
        sku: None,
        plan: None,
        identity: None,
        provisioning_state: ProvisioningState::Succeeded,
        created_time: now,
        changed_time: now,
    }
}

proptest! {
    /// Concatenating every page yields the snapshot, in order
    #[test]
    fn test_pages_cover_snapshot(items in prop::collection::vec(any::<u32>(), 0..200), size in 1usize..40) {
        let paged = ItemPaged::new(items.clone(), size);
        let pages: Vec<_> = paged.by_page(None).unwrap().collect();

        let flat: Vec<u32> = pages.iter().flat_map(|p| p.items.clone()).collect();
        prop_assert_eq!(flat, items.clone());
        prop_assert!(pages.iter().all(|p| !p.items.is_empty() && p.items.len() <= size));
        if let Some(last) = pages.last() {
            prop_assert!(last.continuation_token.is_none());
        }
        prop_assert_eq!(pages.len(), items.len().div_ceil(size));
    }

    /// Resuming from any issued token continues exactly where the page ended
    #[test]
    fn test_resume_from_any_token(items in prop::collection::vec(any::<u8>(), 1..120), size in 1usize..16) {
        let paged = ItemPaged::new(items.clone(), size);
        let mut seen = 0;
        for page in paged.by_page(None).unwrap() {
            seen += page.items.len();
            if let Some(token) = page.continuation_token {
                let resumed: Vec<u8> = paged
                    .by_page(Some(&token))
                    .unwrap()
                    .flat_map(|p| p.items)
                    .collect();
                prop_assert_eq!(&resumed[..], &items[seen..]);
            }
        }
        prop_assert_eq!(seen, items.len());
    }

    /// Non-numeric tokens are rejected
    #[test]
    fn test_garbage_token_rejected(token in "[a-z]{1,10}") {
        let paged = ItemPaged::new(vec![1, 2, 3], 2);
        prop_assert!(paged.by_page(Some(&token)).is_err());
    }

    /// Merging through the tags service keeps old keys, lets new values win
    /// and stamps the change time
    #[test]
    fn test_tag_merge_through_service(old in arb_tags(), new in arb_tags()) {
        tokio_test::block_on(async {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let clock = Arc::new(ManualClock::new(start));
            let client = ResourceManagementClient::new(
                &StaticCredential::new("t"),
                "S",
                ClientOptions::offline().with_clock(clock.clone()),
            )
            .await
            .unwrap();
            client
                .resource_groups
                .create_or_update("rg", ResourceGroupParams::new("uksouth"))
                .await
                .unwrap();
            let created = client
                .resources
                .create_or_update(
                    "rg",
                    "Microsoft.Storage",
                    "storageAccounts",
                    "sa",
                    ResourceParams::new("uksouth").with_tags(old.clone()),
                )
                .await
                .unwrap();

            clock.advance(Duration::seconds(30));
            let returned = client
                .tags
                .create_or_update_at_scope(&created.id, TagsResource::new(new.clone()))
                .await
                .unwrap();
            let stored = client.store().get_resource(&created.id).unwrap();
            let stored_tags = stored.tags.clone().unwrap_or_default();

            for (k, v) in &new {
                prop_assert_eq!(stored_tags.get(k), Some(v));
            }
            for (k, v) in &old {
                if !new.contains_key(k) {
                    prop_assert_eq!(stored_tags.get(k), Some(v));
                }
            }
            prop_assert!(stored_tags.keys().all(|k| old.contains_key(k) || new.contains_key(k)));
            prop_assert_eq!(returned.tags(), &stored_tags);
            prop_assert_eq!(stored.created_time, start);
            prop_assert_eq!(stored.changed_time, start + Duration::seconds(30));
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// `tagName eq` matches exactly the resources carrying the key
    #[test]
    fn test_tag_name_filter(resource_tags in arb_tags(), key in "[a-z]{1,6}") {
        let filter = ResourceFilter::parse(&format!("tagName eq '{}'", key)).unwrap();
        prop_assert_eq!(&filter, &ResourceFilter::TagName(key.clone()));

        let resource = resource_with(resource_tags.clone(), "Microsoft.Storage/storageAccounts");
        prop_assert_eq!(filter.matches(&resource), resource_tags.contains_key(&key));
    }

    /// `tagName ... and tagValue ...` requires the exact value
    #[test]
    fn test_tag_value_filter(key in "[a-z]{1,6}", value in "[A-Za-z0-9]{1,6}", other in "[A-Za-z0-9]{1,6}") {
        let expr = format!("tagName eq '{}' and tagValue eq '{}'", key, value);
        let filter = ResourceFilter::parse(&expr).unwrap();

        let hit = resource_with(tags([(key.as_str(), value.as_str())]), "Microsoft.Web/sites");
        prop_assert!(filter.matches(&hit));

        let miss = resource_with(tags([(key.as_str(), other.as_str())]), "Microsoft.Web/sites");
        prop_assert_eq!(filter.matches(&miss), other == value);
    }

    /// Resource type filters ignore case
    #[test]
    fn test_resource_type_filter_case(upper in any::<bool>()) {
        let ty = if upper { "MICROSOFT.WEB/SITES" } else { "microsoft.web/sites" };
        let filter = ResourceFilter::parse(&format!("resourceType eq '{}'", ty)).unwrap();
        prop_assert!(filter.matches(&resource_with(Tags::new(), "Microsoft.Web/sites")));
        prop_assert!(!filter.matches(&resource_with(Tags::new(), "Microsoft.Storage/storageAccounts")));
    }

    /// Text outside the grammar never parses
    #[test]
    fn test_unknown_syntax(field in "(location|name|kind)", value in "[a-z]{1,8}") {
        let expr = format!("{} eq '{}'", field, value);
        prop_assert!(ResourceFilter::parse(&expr).is_none());
    }
}
