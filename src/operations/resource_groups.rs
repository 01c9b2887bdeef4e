//! Resource Groups operations

use crate::arm::client::ServiceContext;
use crate::arm::ids;
use crate::error::{Error, Result};
use crate::fault::OpKind;
use crate::models::{ProvisioningState, ResourceGroup, ResourceGroupParams};
use crate::paging::ItemPaged;
use serde_json::Value;
use std::sync::Arc;

/// Operations for resource groups
#[derive(Clone)]
pub struct ResourceGroupsOperations {
    ctx: Arc<ServiceContext>,
}

impl ResourceGroupsOperations {
    pub(crate) fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Create or fully replace a resource group
    ///
    /// `params.location` is required. Existing resources in the group are kept.
    pub async fn create_or_update(&self, name: &str, params: ResourceGroupParams) -> Result<ResourceGroup> {
        tracing::debug!("resource_groups.create_or_update: {}", name);
        self.ctx.faults.delay(OpKind::CreateResourceGroup).await;

        let Some(location) = params.location else {
            return Err(Error::Validation(
                "Location is required for resource group".to_string(),
            ));
        };

        self.ctx.faults.check(OpKind::CreateResourceGroup, name)?;

        let mut properties = params.properties.unwrap_or_default();
        properties.insert(
            "provisioningState".to_string(),
            Value::String(ProvisioningState::Succeeded.as_str().to_string()),
        );

        let group = ResourceGroup {
            id: ids::resource_group_id(&self.ctx.subscription_id, name),
            name: name.to_string(),
            location,
            tags: params.tags,
            properties: Some(properties),
            managed_by: params.managed_by,
        };
        self.ctx.store.put_group(group.clone());
        Ok(group)
    }

    pub async fn get(&self, name: &str) -> Result<ResourceGroup> {
        tracing::debug!("resource_groups.get: {}", name);
        self.ctx.faults.evaluate(OpKind::GetResourceGroup, name).await?;

        self.ctx
            .store
            .get_group(name)
            .ok_or_else(|| Error::NotFound(format!("Resource group '{}' not found", name)))
    }

    /// Delete a group and every resource in it
    pub async fn delete(&self, name: &str) -> Result<()> {
        tracing::debug!("resource_groups.delete: {}", name);
        self.ctx.faults.evaluate(OpKind::DeleteResourceGroup, name).await?;

        let Some((_, removed)) = self.ctx.store.delete_group(name) else {
            return Err(Error::NotFound(format!(
                "Resource group '{}' not found",
                name
            )));
        };
        tracing::info!("Deleted resource group {} with {} resources", name, removed.len());
        Ok(())
    }

    /// Snapshot listing of all groups in creation order
    pub async fn list(&self) -> Result<ItemPaged<ResourceGroup>> {
        tracing::debug!("resource_groups.list");
        self.ctx.faults.evaluate(OpKind::ListResourceGroups, "resourceGroups").await?;
        Ok(self.ctx.paged(self.ctx.store.list_groups()))
    }

    /// Whether a group exists; never fails
    pub async fn check_existence(&self, name: &str) -> bool {
        tracing::debug!("resource_groups.check_existence: {}", name);
        self.ctx.faults.delay(OpKind::CheckResourceGroupExistence).await;
        self.ctx.store.contains_group(name)
    }
}
