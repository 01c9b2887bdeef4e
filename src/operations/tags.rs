//! Tags operations
//!
//! Tags are addressed by scope, i.e. a resource id. Updates merge into the
//! existing mapping; deletes clear it to an empty mapping.

use crate::arm::client::ServiceContext;
use crate::error::{Error, Result};
use crate::fault::OpKind;
use crate::models::TagsResource;
use std::sync::Arc;

/// Operations for tags at scope
#[derive(Clone)]
pub struct TagsOperations {
    ctx: Arc<ServiceContext>,
}

impl TagsOperations {
    pub(crate) fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Merge `params` into the tags at `scope`; new values win on conflict
    pub async fn create_or_update_at_scope(&self, scope: &str, params: TagsResource) -> Result<TagsResource> {
        tracing::debug!("tags.create_or_update_at_scope: {}", scope);
        self.ctx.faults.evaluate(OpKind::CreateTags, scope).await?;

        let now = self.ctx.clock.now();
        self.ctx
            .store
            .update_resource(scope, |resource| {
                let tags = resource.tags.get_or_insert_with(Default::default);
                tags.extend(params.properties.tags);
                resource.changed_time = now;
                TagsResource::new(tags.clone())
            })
            .ok_or_else(|| scope_not_found(scope))
    }

    /// Current tags at `scope`, empty if none were ever set
    pub async fn get_at_scope(&self, scope: &str) -> Result<TagsResource> {
        tracing::debug!("tags.get_at_scope: {}", scope);
        self.ctx.faults.evaluate(OpKind::GetTags, scope).await?;

        self.ctx
            .store
            .get_resource(scope)
            .map(|r| TagsResource::new(r.tags.unwrap_or_default()))
            .ok_or_else(|| scope_not_found(scope))
    }

    /// Clear all tags at `scope`
    pub async fn delete_at_scope(&self, scope: &str) -> Result<()> {
        tracing::debug!("tags.delete_at_scope: {}", scope);
        self.ctx.faults.evaluate(OpKind::DeleteTags, scope).await?;

        let now = self.ctx.clock.now();
        self.ctx
            .store
            .update_resource(scope, |resource| {
                resource.tags = Some(Default::default());
                resource.changed_time = now;
            })
            .ok_or_else(|| scope_not_found(scope))
    }
}

fn scope_not_found(scope: &str) -> Error {
    Error::NotFound(format!("Resource with scope '{}' not found", scope))
}

#[cfg(test)]
mod tests {
    use crate::arm::auth::StaticCredential;
    use crate::arm::client::{ClientOptions, ResourceManagementClient};
    use crate::clock::ManualClock;
    use crate::models::{tags, GenericResource, ResourceGroupParams, ResourceParams, TagsResource};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    async fn setup(clock: Arc<ManualClock>) -> (ResourceManagementClient, GenericResource) {
        let client = ResourceManagementClient::new(
            &StaticCredential::new("t"),
            "S",
            ClientOptions::offline().with_clock(clock),
        )
        .await
        .unwrap();
        client
            .resource_groups
            .create_or_update("rg", ResourceGroupParams::new("uksouth"))
            .await
            .unwrap();
        let resource = client
            .resources
            .create_or_update(
                "rg",
                "Microsoft.KeyVault",
                "vaults",
                "kv",
                ResourceParams::new("uksouth").with_tags(tags([("a", "1")])),
            )
            .await
            .unwrap();
        (client, resource)
    }

    #[tokio::test]
    async fn test_merge_overwrites_and_unions() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let (client, resource) = setup(clock.clone()).await;

        clock.advance(Duration::seconds(30));
        let merged = client
            .tags
            .create_or_update_at_scope(&resource.id, TagsResource::new(tags([("a", "2"), ("b", "3")])))
            .await
            .unwrap();
        assert_eq!(merged.tags(), &tags([("a", "2"), ("b", "3")]));

        let stored = client.resources.get_by_id(&resource.id).await.unwrap();
        assert_eq!(stored.changed_time, start + Duration::seconds(30));
        assert_eq!(stored.created_time, start);
    }

    #[tokio::test]
    async fn test_delete_clears_to_empty() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (client, resource) = setup(clock).await;

        client.tags.delete_at_scope(&resource.id).await.unwrap();
        let stored = client.resources.get_by_id(&resource.id).await.unwrap();
        assert_eq!(stored.tags, Some(Default::default()));
        assert!(client.tags.get_at_scope(&resource.id).await.unwrap().tags().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_scope() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (client, _) = setup(clock).await;
        let scope = "/subscriptions/S/resourceGroups/rg/providers/X/y/missing";

        let err = client
            .tags
            .create_or_update_at_scope(scope, TagsResource::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(client.tags.get_at_scope(scope).await.unwrap_err().status_code(), 404);
        assert_eq!(client.tags.delete_at_scope(scope).await.unwrap_err().status_code(), 404);
    }
}
