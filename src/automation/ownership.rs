//! Ownership lookup and transfer
//!
//! Ownership lives in the `owner` tag. A transfer rewrites it through the
//! tags service and leaves an audit trail in `previous_owner` and
//! `ownership_transferred`.

use super::progress::{ProgressObserver, ProgressTracker};
use crate::arm::client::ResourceManagementClient;
use crate::error::Result;
use crate::models::{GenericResource, TagsResource};
use chrono::SecondsFormat;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

pub const OWNER_TAG: &str = "owner";
pub const PREVIOUS_OWNER_TAG: &str = "previous_owner";
pub const TRANSFERRED_AT_TAG: &str = "ownership_transferred";

/// Outcome of an ownership transfer
#[derive(Debug, Clone, Serialize)]
pub struct TransferSummary {
    pub total_resources: usize,
    pub successfully_transferred: usize,
    pub failed_transfers: usize,
    pub transferred_resources: Vec<GenericResource>,
    pub errors: Vec<String>,
    pub duration_seconds: f64,
}

/// Resources whose `owner` tag equals `owner`, ignoring case
///
/// Fails only if the resource listing itself fails.
pub async fn find_resources_by_owner(
    client: &ResourceManagementClient,
    owner: &str,
) -> Result<Vec<GenericResource>> {
    let wanted = owner.to_lowercase();
    let mut listing = client.resources.list(None).await?;

    let mut owned = Vec::new();
    while let Some(resource) = listing.next().await {
        if resource
            .tag(OWNER_TAG)
            .is_some_and(|o| o.to_lowercase() == wanted)
        {
            owned.push(resource);
        }
    }
    Ok(owned)
}

/// Move every resource owned by `from_owner` to `to_owner`
pub async fn transfer_ownership(
    client: &ResourceManagementClient,
    from_owner: &str,
    to_owner: &str,
    observer: Option<ProgressObserver>,
) -> Result<TransferSummary> {
    transfer_ownership_with_cancel(client, from_owner, to_owner, observer, &CancellationToken::new()).await
}

/// Like [`transfer_ownership`], stopping between resources once `cancel` fires
pub async fn transfer_ownership_with_cancel(
    client: &ResourceManagementClient,
    from_owner: &str,
    to_owner: &str,
    observer: Option<ProgressObserver>,
    cancel: &CancellationToken,
) -> Result<TransferSummary> {
    let resources = find_resources_by_owner(client, from_owner).await?;
    tracing::info!(
        "Transferring {} resources from {} to {}",
        resources.len(),
        from_owner,
        to_owner
    );

    let tracker = ProgressTracker::with_observer(resources.len(), observer);
    let mut transferred = Vec::new();

    for resource in &resources {
        if cancel.is_cancelled() {
            tracing::info!("Ownership transfer cancelled after {} resources", tracker.processed());
            break;
        }

        let mut tags = resource.tags.clone().unwrap_or_default();
        tags.insert(OWNER_TAG.to_string(), to_owner.to_string());
        tags.insert(PREVIOUS_OWNER_TAG.to_string(), from_owner.to_string());
        tags.insert(
            TRANSFERRED_AT_TAG.to_string(),
            client.now().to_rfc3339_opts(SecondsFormat::Micros, true),
        );

        match client
            .tags
            .create_or_update_at_scope(&resource.id, TagsResource::new(tags))
            .await
        {
            Ok(updated) => {
                let current = client.store().get_resource(&resource.id).unwrap_or_else(|| {
                    let mut stale = resource.clone();
                    stale.tags = Some(updated.properties.tags);
                    stale
                });
                transferred.push(current);
                tracker.record_success();
            }
            Err(e) => {
                tracing::warn!("Failed to transfer {}: {}", resource.id, e);
                tracker.record_failure(format!("{}: {}", resource.id, e));
            }
        }
    }

    Ok(TransferSummary {
        total_resources: resources.len(),
        successfully_transferred: tracker.completed(),
        failed_transfers: tracker.failed(),
        transferred_resources: transferred,
        errors: tracker.errors(),
        duration_seconds: tracker.elapsed().as_secs_f64(),
    })
}
