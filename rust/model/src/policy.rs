//! Ranger policy model as exchanged with the policy manager.
//!
//! Field names follow the Ranger REST representation. Attributes this service definition
//! never looks at are kept in `extra` so a policy handed back to the host carries
//! everything the host gave us.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    /// Resource name (e.g. `bot`) to the selected values for it
    #[serde(default)]
    pub resources: BTreeMap<String, PolicyResource>,
    #[serde(default)]
    pub policy_items: Vec<PolicyItem>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Policy {
    pub fn has_resource(&self, resource_name: &str) -> bool {
        self.resources.contains_key(resource_name)
    }

    /// Returns true if the policy selects on every one of the given resource names
    pub fn has_resources<'a>(&self, resource_names: impl IntoIterator<Item = &'a str>) -> bool {
        resource_names
            .into_iter()
            .all(|resource_name| self.has_resource(resource_name))
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResource {
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub is_excludes: bool,
    #[serde(default)]
    pub is_recursive: bool,
}

impl PolicyResource {
    pub fn new(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        PolicyResource {
            values: values.into_iter().map(Into::into).collect(),
            ..PolicyResource::default()
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyItem {
    #[serde(default)]
    pub accesses: Vec<PolicyItemAccess>,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<PolicyItemCondition>,
    #[serde(default)]
    pub delegate_admin: bool,
}

impl PolicyItem {
    /// Creates an item granting each of `access_types` to a single role.
    ///
    /// Accesses are emitted in the set's order, so equal sets always produce equal items.
    pub fn for_role(role: impl Into<String>, access_types: &BTreeSet<String>) -> Self {
        PolicyItem {
            accesses: access_types
                .iter()
                .map(|access_type| PolicyItemAccess::allowed(access_type.clone()))
                .collect(),
            roles: vec![role.into()],
            ..PolicyItem::default()
        }
    }

    /// The access types this item names, regardless of order or duplicates
    pub fn access_types(&self) -> BTreeSet<String> {
        self.accesses
            .iter()
            .map(|access| access.access_type.clone())
            .collect()
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyItemAccess {
    #[serde(rename = "type")]
    pub access_type: String,
    #[serde(default = "default_true")]
    pub is_allowed: bool,
}

impl PolicyItemAccess {
    pub fn allowed(access_type: impl Into<String>) -> Self {
        PolicyItemAccess {
            access_type: access_type.into(),
            is_allowed: true,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyItemCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    #[serde(default)]
    pub values: Vec<String>,
}

fn default_true() -> bool {
    true
}
