//! Resource Management Client
//!
//! Entry point of the simulated control plane. A client owns one store, one
//! fault injector and one clock; separate clients never share state, so
//! several simulated subscriptions can coexist in one process.

use super::auth::{TokenCredential, DEFAULT_SCOPES};
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::fault::{FaultInjector, FaultProfile};
use crate::operations::{ResourceGroupsOperations, ResourcesOperations, TagsOperations};
use crate::paging::{ItemPaged, DEFAULT_PAGE_DELAY, DEFAULT_PAGE_SIZE};
use crate::store::ResourceStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Default API version reported by the client
pub const DEFAULT_API_VERSION: &str = "2021-04-01";

/// Client construction options
#[derive(Clone)]
pub struct ClientOptions {
    pub api_version: String,
    pub page_size: usize,
    /// Delay at each page boundary during flat iteration
    pub page_delay: Duration,
    pub fault_profile: FaultProfile,
    /// Seed for the fault injector; `None` draws one from entropy
    pub seed: Option<u64>,
    /// Reject unrecognized filter expressions instead of ignoring them
    pub strict_filters: bool,
    pub clock: Arc<dyn Clock>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: DEFAULT_PAGE_DELAY,
            fault_profile: FaultProfile::reference(),
            seed: None,
            strict_filters: false,
            clock: Arc::new(SystemClock),
        }
    }
}

impl ClientOptions {
    /// No latency and no injected failures
    pub fn offline() -> Self {
        Self {
            page_delay: Duration::ZERO,
            fault_profile: FaultProfile::none(),
            seed: Some(0),
            ..Self::default()
        }
    }

    pub fn with_faults(mut self, profile: FaultProfile) -> Self {
        self.fault_profile = profile;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_strict_filters(mut self, strict: bool) -> Self {
        self.strict_filters = strict;
        self
    }
}

/// State shared by the operation services of one client
pub(crate) struct ServiceContext {
    pub subscription_id: String,
    pub store: ResourceStore,
    pub faults: FaultInjector,
    pub clock: Arc<dyn Clock>,
    pub page_size: usize,
    pub page_delay: Duration,
    pub strict_filters: bool,
}

impl ServiceContext {
    pub fn paged<T: Clone>(&self, items: Vec<T>) -> ItemPaged<T> {
        ItemPaged::new(items, self.page_size).with_page_delay(self.page_delay)
    }
}

/// Simulated resource management client
#[derive(Clone)]
pub struct ResourceManagementClient {
    pub resource_groups: ResourceGroupsOperations,
    pub resources: ResourcesOperations,
    pub tags: TagsOperations,
    context: Arc<ServiceContext>,
    api_version: String,
}

impl ResourceManagementClient {
    /// Create a client, authenticating once with `credential`
    pub async fn new(
        credential: &dyn TokenCredential,
        subscription_id: &str,
        options: ClientOptions,
    ) -> Result<Self> {
        credential
            .get_token(DEFAULT_SCOPES)
            .await
            .map_err(|e| Error::Authentication(format!("Failed to authenticate: {}", e.message())))?;

        let faults = FaultInjector::new(options.fault_profile, options.seed);
        tracing::info!(
            "Client ready for subscription {} (api {}, fault seed {})",
            subscription_id,
            options.api_version,
            faults.seed()
        );

        let context = Arc::new(ServiceContext {
            subscription_id: subscription_id.to_string(),
            store: ResourceStore::new(),
            faults,
            clock: options.clock,
            page_size: options.page_size,
            page_delay: options.page_delay,
            strict_filters: options.strict_filters,
        });

        Ok(Self {
            resource_groups: ResourceGroupsOperations::new(context.clone()),
            resources: ResourcesOperations::new(context.clone()),
            tags: TagsOperations::new(context.clone()),
            context,
            api_version: options.api_version,
        })
    }

    pub fn subscription_id(&self) -> &str {
        &self.context.subscription_id
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Seed used by this client's fault injector
    pub fn fault_seed(&self) -> u64 {
        self.context.faults.seed()
    }

    /// Current time on this client's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.context.clock.now()
    }

    /// Direct read access to the backing store
    pub fn store(&self) -> &ResourceStore {
        &self.context.store
    }

    /// Tear down the store. Clones of this client observe an empty store.
    pub fn close(self) {
        tracing::debug!("Closing client for subscription {}", self.context.subscription_id);
        self.context.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::auth::StaticCredential;
    use crate::models::ResourceGroupParams;

    #[tokio::test]
    async fn test_failing_credential_blocks_construction() {
        let result =
            ResourceManagementClient::new(&StaticCredential::failing(), "S", ClientOptions::offline()).await;
        let err = result.err().unwrap();
        assert_eq!(err.status_code(), 401);
        assert!(err.message().starts_with("Failed to authenticate"));
    }

    #[tokio::test]
    async fn test_clients_do_not_share_state() {
        let credential = StaticCredential::new("t");
        let a = ResourceManagementClient::new(&credential, "sub-a", ClientOptions::offline())
            .await
            .unwrap();
        let b = ResourceManagementClient::new(&credential, "sub-b", ClientOptions::offline())
            .await
            .unwrap();

        a.resource_groups
            .create_or_update("rg", ResourceGroupParams::new("uksouth"))
            .await
            .unwrap();
        assert!(a.resource_groups.check_existence("rg").await);
        assert!(!b.resource_groups.check_existence("rg").await);
        assert_eq!(b.subscription_id(), "sub-b");
    }

    #[tokio::test]
    async fn test_close_clears_store() {
        let client = ResourceManagementClient::new(&StaticCredential::new("t"), "S", ClientOptions::offline())
            .await
            .unwrap();
        let other = client.clone();
        client
            .resource_groups
            .create_or_update("rg", ResourceGroupParams::new("uksouth"))
            .await
            .unwrap();
        client.close();
        assert_eq!(other.store().group_count(), 0);
    }
}
