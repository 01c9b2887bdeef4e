//! Compliance reporting over every resource in a subscription

use super::ownership::OWNER_TAG;
use crate::arm::client::ResourceManagementClient;
use crate::error::Result;
use crate::models::{GenericResource, Tags};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

pub const ENVIRONMENT_TAG: &str = "environment";

/// Bucket for resources without an `owner` tag
pub const UNASSIGNED: &str = "unassigned";

/// Bucket for resources without an `environment` tag
pub const UNTAGGED: &str = "untagged";

/// Rules a resource is checked against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompliancePolicy {
    pub valid_locations: Vec<String>,
    pub valid_owners: Vec<String>,
    pub valid_environments: Vec<String>,
}

impl Default for CompliancePolicy {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            valid_locations: owned(&["uksouth"]),
            valid_owners: owned(&["Homer", "Marge", "Lisa"]),
            valid_environments: owned(&["dev", "prod", "test"]),
        }
    }
}

impl CompliancePolicy {
    /// Violations for one resource, in a fixed order
    pub fn check(&self, resource: &GenericResource) -> Vec<String> {
        let empty = Tags::new();
        let tags = resource.tags.as_ref().unwrap_or(&empty);
        let mut issues = Vec::new();

        if tags.is_empty() {
            issues.push("No tags".to_string());
        }
        if !self.valid_locations.contains(&resource.location) {
            issues.push(format!("Invalid location: {}", resource.location));
        }
        // the bucket names are never flagged, whether defaulted or set explicitly
        let owner = tags.get(OWNER_TAG).map_or(UNASSIGNED, String::as_str);
        if owner != UNASSIGNED && !self.valid_owners.iter().any(|o| o == owner) {
            issues.push(format!("Unauthorized owner: {}", owner));
        }
        let environment = tags.get(ENVIRONMENT_TAG).map_or(UNTAGGED, String::as_str);
        if environment != UNTAGGED && !self.valid_environments.iter().any(|e| e == environment) {
            issues.push(format!("Invalid environment: {}", environment));
        }
        issues
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NonCompliantResource {
    pub resource_id: String,
    pub resource_name: String,
    pub resource_type: String,
    pub issues: Vec<String>,
}

/// Tallies and violations from one pass over all resources
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub timestamp: DateTime<Utc>,
    pub total_resources: usize,
    pub resources_by_owner: IndexMap<String, usize>,
    pub resources_by_environment: IndexMap<String, usize>,
    pub resources_by_location: IndexMap<String, usize>,
    pub resources_by_type: IndexMap<String, usize>,
    /// Names of resources carrying no tags at all
    pub untagged_resources: Vec<String>,
    pub non_compliant_resources: Vec<NonCompliantResource>,
}

impl ComplianceReport {
    fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            total_resources: 0,
            resources_by_owner: IndexMap::new(),
            resources_by_environment: IndexMap::new(),
            resources_by_location: IndexMap::new(),
            resources_by_type: IndexMap::new(),
            untagged_resources: Vec::new(),
            non_compliant_resources: Vec::new(),
        }
    }

    fn record(&mut self, resource: &GenericResource, policy: &CompliancePolicy) {
        self.total_resources += 1;

        let owner = resource.tag(OWNER_TAG).unwrap_or(UNASSIGNED);
        let environment = resource.tag(ENVIRONMENT_TAG).unwrap_or(UNTAGGED);
        *self.resources_by_owner.entry(owner.to_string()).or_default() += 1;
        *self
            .resources_by_environment
            .entry(environment.to_string())
            .or_default() += 1;
        *self
            .resources_by_location
            .entry(resource.location.clone())
            .or_default() += 1;
        *self
            .resources_by_type
            .entry(resource.resource_type.clone())
            .or_default() += 1;

        if !resource.has_tags() {
            self.untagged_resources.push(resource.name.clone());
        }

        let issues = policy.check(resource);
        if !issues.is_empty() {
            self.non_compliant_resources.push(NonCompliantResource {
                resource_id: resource.id.clone(),
                resource_name: resource.name.clone(),
                resource_type: resource.resource_type.clone(),
                issues,
            });
        }
    }

    pub fn compliant_count(&self) -> usize {
        self.total_resources - self.non_compliant_resources.len()
    }
}

/// Report against the default policy
pub async fn generate_compliance_report(client: &ResourceManagementClient) -> Result<ComplianceReport> {
    generate_compliance_report_with(client, &CompliancePolicy::default()).await
}

pub async fn generate_compliance_report_with(
    client: &ResourceManagementClient,
    policy: &CompliancePolicy,
) -> Result<ComplianceReport> {
    let mut report = ComplianceReport::new(client.now());
    let mut listing = client.resources.list(None).await?;
    while let Some(resource) = listing.next().await {
        report.record(&resource, policy);
    }

    tracing::info!(
        "Compliance report: {} resources, {} non-compliant, {} untagged",
        report.total_resources,
        report.non_compliant_resources.len(),
        report.untagged_resources.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{tags, ProvisioningState};

    fn resource(name: &str, location: &str, tags: Option<Tags>) -> GenericResource {
        let now = Utc::now();
        GenericResource {
            id: format!("/subscriptions/S/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/{}", name),
            name: name.to_string(),
            resource_type: "Microsoft.Storage/storageAccounts".to_string(),
            location: location.to_string(),
            tags,
            properties: None,
            kind: None,
            managed_by: None,
            sku: None,
            plan: None,
            identity: None,
            provisioning_state: ProvisioningState::Succeeded,
            created_time: now,
            changed_time: now,
        }
    }

    #[test]
    fn test_compliant_resource_has_no_issues() {
        let policy = CompliancePolicy::default();
        let r = resource("ok", "uksouth", Some(tags([("owner", "Homer"), ("environment", "prod")])));
        assert!(policy.check(&r).is_empty());
    }

    #[test]
    fn test_issue_order_and_wording() {
        let policy = CompliancePolicy::default();
        let r = resource("bad", "eastus", Some(tags([("owner", "Bart"), ("environment", "qa")])));
        assert_eq!(
            policy.check(&r),
            vec![
                "Invalid location: eastus".to_string(),
                "Unauthorized owner: Bart".to_string(),
                "Invalid environment: qa".to_string(),
            ]
        );
    }

    #[test]
    fn test_literal_bucket_names_are_not_flagged() {
        let policy = CompliancePolicy::default();
        let r = resource(
            "placeholder",
            "uksouth",
            Some(tags([("owner", "unassigned"), ("environment", "untagged")])),
        );
        assert!(policy.check(&r).is_empty());

        let mut report = ComplianceReport::new(Utc::now());
        report.record(&r, &policy);
        assert_eq!(report.resources_by_owner[UNASSIGNED], 1);
        assert_eq!(report.resources_by_environment[UNTAGGED], 1);
        assert!(report.non_compliant_resources.is_empty());
    }

    #[test]
    fn test_missing_tags_are_bucketed_not_flagged() {
        let policy = CompliancePolicy::default();
        let mut report = ComplianceReport::new(Utc::now());
        report.record(&resource("bare", "uksouth", None), &policy);
        report.record(&resource("env-only", "uksouth", Some(tags([("environment", "dev")]))), &policy);

        assert_eq!(report.resources_by_owner[UNASSIGNED], 2);
        assert_eq!(report.resources_by_environment[UNTAGGED], 1);
        assert_eq!(report.untagged_resources, vec!["bare".to_string()]);
        assert_eq!(report.non_compliant_resources.len(), 1);
        assert_eq!(report.non_compliant_resources[0].issues, vec!["No tags".to_string()]);
        assert_eq!(report.compliant_count(), 1);
    }
}
