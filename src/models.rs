//! Resource management models
//!
//! Entity snapshots returned by the operation services and the parameter
//! bodies they accept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Flat string-to-string tag mapping
pub type Tags = HashMap<String, String>;

/// Free-form properties bag
pub type Properties = Map<String, Value>;

/// Resource provisioning states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisioningState {
    Creating,
    Updating,
    Deleting,
    Succeeded,
    Failed,
    Canceled,
}

impl ProvisioningState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creating => "Creating",
            Self::Updating => "Updating",
            Self::Deleting => "Deleting",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Canceled => "Canceled",
        }
    }
}

/// Resource SKU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub name: String,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
}

/// Marketplace plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    pub publisher: String,
    pub product: String,
    #[serde(default)]
    pub promotion_code: Option<String>,
}

/// Managed identity attached to a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Identity {
    #[serde(default)]
    pub principal_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default, rename = "type")]
    pub identity_type: Option<String>,
}

/// Resource group record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub tags: Option<Tags>,
    #[serde(default)]
    pub properties: Option<Properties>,
    #[serde(default)]
    pub managed_by: Option<String>,
}

impl ResourceGroup {
    /// Provisioning state recorded in the properties bag
    pub fn provisioning_state(&self) -> Option<&str> {
        self.properties
            .as_ref()?
            .get("provisioningState")
            .and_then(|v| v.as_str())
    }
}

/// Body of a resource group create-or-update call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroupParams {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Option<Tags>,
    #[serde(default)]
    pub properties: Option<Properties>,
    #[serde(default)]
    pub managed_by: Option<String>,
}

impl ResourceGroupParams {
    pub fn new(location: &str) -> Self {
        Self {
            location: Some(location.to_string()),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }
}

/// Generic resource record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericResource {
    pub id: String,
    pub name: String,
    /// `Namespace/type`
    #[serde(rename = "type")]
    pub resource_type: String,
    pub location: String,
    #[serde(default)]
    pub tags: Option<Tags>,
    #[serde(default)]
    pub properties: Option<Properties>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub managed_by: Option<String>,
    #[serde(default)]
    pub sku: Option<Sku>,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub identity: Option<Identity>,
    pub provisioning_state: ProvisioningState,
    pub created_time: DateTime<Utc>,
    pub changed_time: DateTime<Utc>,
}

impl GenericResource {
    /// Tag value by key
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.as_ref()?.get(key).map(|v| v.as_str())
    }

    pub fn has_tags(&self) -> bool {
        self.tags.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// Body of a resource create-or-update call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceParams {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Option<Tags>,
    #[serde(default)]
    pub properties: Option<Properties>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub managed_by: Option<String>,
    #[serde(default)]
    pub sku: Option<Sku>,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub identity: Option<Identity>,
}

impl ResourceParams {
    pub fn new(location: &str) -> Self {
        Self {
            location: Some(location.to_string()),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// Tag payload exchanged with the tags service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsResource {
    pub properties: TagsProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsProperties {
    #[serde(default)]
    pub tags: Tags,
}

impl TagsResource {
    pub fn new(tags: Tags) -> Self {
        Self {
            properties: TagsProperties { tags },
        }
    }

    pub fn tags(&self) -> &Tags {
        &self.properties.tags
    }
}

/// Build a tag mapping from key/value pairs
pub fn tags<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Tags {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
