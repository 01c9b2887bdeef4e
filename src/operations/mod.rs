//! Operation services
//!
//! Validation, referential checks and fault injection in front of the
//! resource store.
//!
//! - [`resource_groups`] - create, get, delete (cascading), list, existence checks
//! - [`resources`] - create, get, delete and filtered listings
//! - [`tags`] - merge, read and clear tags at a resource scope
//! - [`filter`] - the filter expression grammar used by resource listings

pub mod filter;
pub mod resource_groups;
pub mod resources;
pub mod tags;

pub use filter::ResourceFilter;
pub use resource_groups::ResourceGroupsOperations;
pub use resources::ResourcesOperations;
pub use tags::TagsOperations;
