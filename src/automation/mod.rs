//! Multi-step workflows built on the operation services
//!
//! - [`progress`] - aggregate outcome tracking
//! - [`bulk`] - batched resource creation
//! - [`ownership`] - owner lookup and transfer
//! - [`compliance`] - policy report over all resources

pub mod bulk;
pub mod compliance;
pub mod ownership;
pub mod progress;

pub use bulk::{bulk_create_resources, bulk_create_resources_with, BulkOptions, BulkResourceSpec};
pub use compliance::{
    generate_compliance_report, generate_compliance_report_with, CompliancePolicy, ComplianceReport,
    NonCompliantResource,
};
pub use ownership::{
    find_resources_by_owner, transfer_ownership, transfer_ownership_with_cancel, TransferSummary,
};
pub use progress::{ProgressObserver, ProgressTracker};
