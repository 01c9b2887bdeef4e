//! Resources operations

use super::filter;
use crate::arm::client::ServiceContext;
use crate::arm::ids;
use crate::error::{Error, Result};
use crate::fault::OpKind;
use crate::models::{GenericResource, ProvisioningState, ResourceParams};
use crate::paging::ItemPaged;
use std::sync::Arc;

/// Location used when create parameters omit one
pub const DEFAULT_LOCATION: &str = "uksouth";

/// Operations for resources
#[derive(Clone)]
pub struct ResourcesOperations {
    ctx: Arc<ServiceContext>,
}

impl ResourcesOperations {
    pub(crate) fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    fn resource_id(&self, group: &str, namespace: &str, resource_type: &str, name: &str) -> String {
        ids::resource_id(&self.ctx.subscription_id, group, namespace, resource_type, name)
    }

    /// Create or fully replace a resource
    ///
    /// Fails with `NotFound` when the group does not exist, before any failure
    /// rule is evaluated. Replacing a resource keeps its `created_time`.
    pub async fn create_or_update(
        &self,
        resource_group: &str,
        provider_namespace: &str,
        resource_type: &str,
        name: &str,
        params: ResourceParams,
    ) -> Result<GenericResource> {
        tracing::debug!(
            "resources.create_or_update: {}/{}/{}/{}",
            resource_group,
            provider_namespace,
            resource_type,
            name
        );
        self.ctx.faults.delay(OpKind::CreateResource).await;

        if !self.ctx.store.contains_group(resource_group) {
            return Err(Error::NotFound(format!(
                "Resource group '{}' not found",
                resource_group
            )));
        }

        let id = self.resource_id(resource_group, provider_namespace, resource_type, name);
        self.ctx.faults.check(OpKind::CreateResource, name)?;

        let now = self.ctx.clock.now();
        self.ctx.store.upsert_resource(resource_group, &id, |previous| GenericResource {
            id: id.clone(),
            name: name.to_string(),
            resource_type: format!("{}/{}", provider_namespace, resource_type),
            location: params
                .location
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            tags: Some(params.tags.unwrap_or_default()),
            properties: Some(params.properties.unwrap_or_default()),
            kind: params.kind,
            managed_by: params.managed_by,
            sku: params.sku,
            plan: params.plan,
            identity: params.identity,
            provisioning_state: ProvisioningState::Succeeded,
            created_time: previous.map(|p| p.created_time).unwrap_or(now),
            changed_time: now,
        })
    }

    pub async fn get(
        &self,
        resource_group: &str,
        provider_namespace: &str,
        resource_type: &str,
        name: &str,
    ) -> Result<GenericResource> {
        let id = self.resource_id(resource_group, provider_namespace, resource_type, name);
        self.get_by_id(&id).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<GenericResource> {
        tracing::debug!("resources.get: {}", id);
        self.ctx.faults.evaluate(OpKind::GetResource, id).await?;
        self.ctx
            .store
            .get_resource(id)
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(
        &self,
        resource_group: &str,
        provider_namespace: &str,
        resource_type: &str,
        name: &str,
    ) -> Result<()> {
        let id = self.resource_id(resource_group, provider_namespace, resource_type, name);
        self.delete_by_id(&id).await
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        tracing::debug!("resources.delete: {}", id);
        if !self.ctx.store.contains_resource(id) {
            return Err(not_found(id));
        }
        self.ctx.faults.evaluate(OpKind::DeleteResource, id).await?;

        self.ctx
            .store
            .delete_resource(id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    /// Snapshot listing of every resource, optionally filtered
    pub async fn list(&self, filter: Option<&str>) -> Result<ItemPaged<GenericResource>> {
        tracing::debug!("resources.list: filter={:?}", filter);
        let filter = filter::resolve(filter, self.ctx.strict_filters)?;
        self.ctx.faults.evaluate(OpKind::ListResources, "resources").await?;

        let items = self
            .ctx
            .store
            .list_resources(|r| filter.as_ref().map_or(true, |f| f.matches(r)));
        Ok(self.ctx.paged(items))
    }

    /// Snapshot listing of the resources in one group
    ///
    /// An unknown group yields an empty listing.
    pub async fn list_by_resource_group(
        &self,
        resource_group: &str,
        filter: Option<&str>,
    ) -> Result<ItemPaged<GenericResource>> {
        tracing::debug!("resources.list_by_resource_group: {}", resource_group);
        let filter = filter::resolve(filter, self.ctx.strict_filters)?;
        self.ctx.faults.evaluate(OpKind::ListResources, resource_group).await?;

        let mut items = self.ctx.store.list_group_resources(resource_group);
        if let Some(filter) = filter {
            items.retain(|r| filter.matches(r));
        }
        Ok(self.ctx.paged(items))
    }
}

fn not_found(id: &str) -> Error {
    let name = ids::ResourceId::parse(id).map(|r| r.name).unwrap_or(id);
    Error::NotFound(format!("Resource '{}' not found", name))
}
