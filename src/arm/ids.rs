//! Identifier builder
//!
//! Canonical identifiers for resource groups and resources. No case or
//! whitespace normalization is applied: callers own consistent casing.

/// Build a resource group identifier
pub fn resource_group_id(subscription_id: &str, name: &str) -> String {
    format!("/subscriptions/{}/resourceGroups/{}", subscription_id, name)
}

/// Build a resource identifier
pub fn resource_id(
    subscription_id: &str,
    resource_group: &str,
    provider_namespace: &str,
    resource_type: &str,
    name: &str,
) -> String {
    format!(
        "{}/providers/{}/{}/{}",
        resource_group_id(subscription_id, resource_group),
        provider_namespace,
        resource_type,
        name
    )
}

/// Split a `Namespace/type` string. A bare type falls back to `Microsoft.Resources`.
pub fn split_resource_type(full_type: &str) -> (&str, &str) {
    match full_type.split_once('/') {
        Some((namespace, resource_type)) => (namespace, resource_type),
        None => ("Microsoft.Resources", full_type),
    }
}

/// Parsed view of a resource identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId<'a> {
    pub subscription_id: &'a str,
    pub resource_group: &'a str,
    pub provider_namespace: &'a str,
    pub resource_type: &'a str,
    pub name: &'a str,
}

impl<'a> ResourceId<'a> {
    /// Parse `/subscriptions/{s}/resourceGroups/{g}/providers/{ns}/{type}/{name}`
    pub fn parse(id: &'a str) -> Option<Self> {
        let parts: Vec<&str> = id.strip_prefix('/')?.split('/').collect();
        match parts.as_slice() {
            ["subscriptions", sub, "resourceGroups", group, "providers", ns, ty, name] => {
                Some(Self {
                    subscription_id: *sub,
                    resource_group: *group,
                    provider_namespace: *ns,
                    resource_type: *ty,
                    name: *name,
                })
            }
            _ => None,
        }
    }
}
