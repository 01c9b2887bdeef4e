//! Control plane client module
//!
//! Client construction, credentials and identifier building for the
//! simulated resource management API.
//!
//! # Module Structure
//!
//! - [`auth`] - Credential interface and simulated credentials
//! - [`client`] - Client owning the store, fault injector and services
//! - [`ids`] - Canonical resource group and resource identifiers
//!
//! # Example
//!
//! ```ignore
//! use armsim::arm::{auth::SimulatedCredential, client::{ClientOptions, ResourceManagementClient}};
//! use armsim::models::ResourceGroupParams;
//!
//! async fn example() -> armsim::Result<()> {
//!     let credential = SimulatedCredential::new(Some(42));
//!     let client = ResourceManagementClient::new(&credential, "my-sub", ClientOptions::default()).await?;
//!     client.resource_groups.create_or_update("rg-1", ResourceGroupParams::new("uksouth")).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod ids;
