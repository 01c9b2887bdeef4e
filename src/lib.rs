//! armsim - a simulated Azure Resource Manager control plane
//!
//! An in-memory store of resource groups and resources behind operation
//! services that mimic the management API, with simulated latency, injected
//! transient failures and paged listings. The [`automation`] module drives
//! bulk workflows (provisioning, ownership transfer, compliance) against it.

pub mod arm;
pub mod automation;
pub mod clock;
pub mod config;
pub mod error;
pub mod fault;
pub mod models;
pub mod operations;
pub mod paging;
pub mod store;

pub use arm::auth::{SimulatedCredential, StaticCredential, TokenCredential};
pub use arm::client::{ClientOptions, ResourceManagementClient};
pub use error::{Error, ErrorKind, Result};
