//! Bulk resource creation
//!
//! Best effort, not a transaction: every input is attempted once and its
//! outcome recorded, regardless of earlier failures.

use super::progress::{ProgressObserver, ProgressTracker};
use crate::arm::client::ResourceManagementClient;
use crate::arm::ids::split_resource_type;
use crate::models::{tags, Properties, ResourceGroupParams, ResourceParams, Tags};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Resources created between two batch pauses
pub const BATCH_SIZE: usize = 50;

/// Pause inserted after every batch
pub const BATCH_PAUSE: Duration = Duration::from_millis(500);

/// Location of resource groups created on demand
const GROUP_LOCATION: &str = "uksouth";

fn default_location() -> String {
    GROUP_LOCATION.to_string()
}

/// One resource to create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkResourceSpec {
    pub name: String,
    /// `Namespace/type`, or a bare type under `Microsoft.Resources`
    pub resource_type: String,
    pub resource_group: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub properties: Properties,
}

impl BulkResourceSpec {
    pub fn new(name: &str, resource_type: &str, resource_group: &str) -> Self {
        Self {
            name: name.to_string(),
            resource_type: resource_type.to_string(),
            resource_group: resource_group.to_string(),
            location: default_location(),
            tags: Tags::new(),
            properties: Properties::new(),
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = location.to_string();
        self
    }
}

/// Tuning for [`bulk_create_resources_with`]
#[derive(Debug, Clone)]
pub struct BulkOptions {
    pub batch_size: usize,
    pub batch_pause: Duration,
    /// Checked before each resource; remaining resources are skipped once fired
    pub cancel: CancellationToken,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            batch_pause: BATCH_PAUSE,
            cancel: CancellationToken::new(),
        }
    }
}

/// Create every referenced group, then every resource, tracking outcomes
pub async fn bulk_create_resources(
    client: &ResourceManagementClient,
    specs: &[BulkResourceSpec],
    observer: Option<ProgressObserver>,
) -> ProgressTracker {
    bulk_create_resources_with(client, specs, BulkOptions::default(), observer).await
}

pub async fn bulk_create_resources_with(
    client: &ResourceManagementClient,
    specs: &[BulkResourceSpec],
    options: BulkOptions,
    observer: Option<ProgressObserver>,
) -> ProgressTracker {
    tracing::info!("Bulk creating {} resources", specs.len());
    ensure_resource_groups(client, specs).await;

    let tracker = ProgressTracker::with_observer(specs.len(), observer);
    for (i, spec) in specs.iter().enumerate() {
        if options.cancel.is_cancelled() {
            tracing::info!("Bulk create cancelled after {} of {} resources", i, specs.len());
            break;
        }

        let (namespace, resource_type) = split_resource_type(&spec.resource_type);
        let params = ResourceParams {
            location: Some(spec.location.clone()),
            tags: Some(spec.tags.clone()),
            properties: Some(spec.properties.clone()),
            ..Default::default()
        };

        match client
            .resources
            .create_or_update(&spec.resource_group, namespace, resource_type, &spec.name, params)
            .await
        {
            Ok(_) => tracker.record_success(),
            Err(e) => {
                tracing::warn!("Failed to create {}: {}", spec.name, e);
                tracker.record_failure(format!("{}: {}", spec.name, e));
            }
        }

        if options.batch_size > 0 && (i + 1) % options.batch_size == 0 && !options.batch_pause.is_zero() {
            tokio::time::sleep(options.batch_pause).await;
        }
    }

    tracing::info!(
        "Bulk create finished: {} completed, {} failed in {:?}",
        tracker.completed(),
        tracker.failed(),
        tracker.elapsed()
    );
    tracker
}

/// Create each distinct group that does not exist yet; failures are logged only
async fn ensure_resource_groups(client: &ResourceManagementClient, specs: &[BulkResourceSpec]) {
    let groups: IndexSet<&str> = specs.iter().map(|s| s.resource_group.as_str()).collect();

    for name in groups {
        if client.resource_groups.check_existence(name).await {
            continue;
        }
        let params = ResourceGroupParams::new(GROUP_LOCATION)
            .with_tags(tags([("created_by", "bulk_migration")]));
        if let Err(e) = client.resource_groups.create_or_update(name, params).await {
            tracing::warn!("Could not create resource group {}: {}", name, e);
        }
    }
}
