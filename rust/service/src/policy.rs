//! Default policies for a freshly registered OpenMetadata service.
//!
//! The policy manager bootstraps one policy per resource hierarchy, granting every access
//! type of that hierarchy in its first item. Those items are replaced with four role
//! scoped items: data consumers and data stewards get a fixed subset, bots get everything
//! except creating or deleting bots and webhooks, admins get everything.

use ranger_openmetadata_model::{
    policy::{Policy, PolicyItem},
    role::RoleKind,
    ACCESS_CREATE, ACCESS_DELETE, ACCESS_EDIT_DESCRIPTION, ACCESS_EDIT_DISPLAY_NAME,
    ACCESS_EDIT_LINEAGE, ACCESS_EDIT_OWNER, ACCESS_EDIT_TAGS, ACCESS_VIEW_ALL, ADMIN_USER,
    RESOURCE_BOT, RESOURCE_WEBHOOK,
};
use snafu::{OptionExt, Snafu};
use std::collections::BTreeSet;
use tracing::debug;

const DATA_CONSUMER_ACCESS_TYPES: &[&str] =
    &[ACCESS_VIEW_ALL, ACCESS_EDIT_DESCRIPTION, ACCESS_EDIT_TAGS];
const DATA_STEWARD_ACCESS_TYPES: &[&str] = &[
    ACCESS_VIEW_ALL,
    ACCESS_EDIT_DESCRIPTION,
    ACCESS_EDIT_DISPLAY_NAME,
    ACCESS_EDIT_LINEAGE,
    ACCESS_EDIT_OWNER,
    ACCESS_EDIT_TAGS,
];
const BOT_MANAGEMENT_RESOURCES: &[&str] = &[RESOURCE_BOT, RESOURCE_WEBHOOK];
const BOT_MANAGEMENT_DENIED_ACCESS_TYPES: &[&str] = &[ACCESS_CREATE, ACCESS_DELETE];

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display(
        "bootstrap policy [{policy}] has no policy item to take the access types from"
    ))]
    NoBootstrapItem { policy: String },
}

type Result<T, E = Error> = std::result::Result<T, E>;

pub struct DefaultPolicySynthesizer<'a> {
    service_name: &'a str,
    lookup_user: Option<&'a str>,
}

impl<'a> DefaultPolicySynthesizer<'a> {
    pub fn new(service_name: &'a str, lookup_user: Option<&'a str>) -> Self {
        DefaultPolicySynthesizer {
            service_name,
            lookup_user,
        }
    }

    /// Replaces the items of every bootstrap policy with the role based default items.
    ///
    /// Fails without touching anything if one of the policies has no item, as the access
    /// types can not be derived for it.
    pub fn synthesize(&self, mut policies: Vec<Policy>) -> Result<Vec<Policy>> {
        let policy_items = policies
            .iter()
            .map(|policy| self.policy_items(policy))
            .collect::<Result<Vec<_>>>()?;

        for (policy, items) in policies.iter_mut().zip(policy_items) {
            policy.policy_items = items;
        }

        Ok(policies)
    }

    fn policy_items(&self, policy: &Policy) -> Result<Vec<PolicyItem>> {
        // only the first item matters, it holds all access types of the resource
        let access_types = policy
            .policy_items
            .first()
            .context(NoBootstrapItemSnafu {
                policy: policy.name.as_str(),
            })?
            .access_types();

        let data_consumer = self.role_item(
            RoleKind::DataConsumer,
            retain(&access_types, DATA_CONSUMER_ACCESS_TYPES),
        );
        let data_steward = self.role_item(
            RoleKind::DataSteward,
            retain(&access_types, DATA_STEWARD_ACCESS_TYPES),
        );

        let manages_bots = policy.has_resources(BOT_MANAGEMENT_RESOURCES.iter().copied());
        let bot_access_types = if manages_bots {
            remove(&access_types, BOT_MANAGEMENT_DENIED_ACCESS_TYPES)
        } else {
            access_types.clone()
        };
        let mut bot = self.role_item(RoleKind::Bot, bot_access_types);
        if let Some(lookup_user) = self.lookup_user.filter(|user| !user.is_empty()) {
            bot.users = vec![lookup_user.to_string()];
        }

        let mut admin = self.role_item(RoleKind::Admin, access_types);
        admin.users = vec![ADMIN_USER.to_string()];

        let items = vec![data_consumer, data_steward, bot, admin];
        debug!(policy = %policy.name, ?items, "Created default policy items");
        Ok(items)
    }

    fn role_item(&self, role: RoleKind, access_types: BTreeSet<String>) -> PolicyItem {
        PolicyItem::for_role(role.role_name(self.service_name), &access_types)
    }
}

/// Access types of `all` that are also in `requested`, unknown requested ones are ignored
fn retain(all: &BTreeSet<String>, requested: &[&str]) -> BTreeSet<String> {
    all.iter()
        .filter(|access_type| requested.contains(&access_type.as_str()))
        .cloned()
        .collect()
}

/// Access types of `all` without `denied`, unknown denied ones are ignored
fn remove(all: &BTreeSet<String>, denied: &[&str]) -> BTreeSet<String> {
    all.iter()
        .filter(|access_type| !denied.contains(&access_type.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use ranger_openmetadata_model::policy::{PolicyItemAccess, PolicyResource};
    use rstest::rstest;
    use std::collections::BTreeMap;

    const SERVICE: &str = "om1";

    fn bootstrap_policy(resources: &[&str], access_types: &[&str]) -> Policy {
        Policy {
            service: SERVICE.to_string(),
            name: format!("all - {}", resources.join(", ")),
            resources: resources
                .iter()
                .map(|resource| (resource.to_string(), PolicyResource::new(["*"])))
                .collect::<BTreeMap<_, _>>(),
            policy_items: vec![PolicyItem {
                accesses: access_types
                    .iter()
                    .map(|access_type| PolicyItemAccess::allowed(*access_type))
                    .collect(),
                users: vec!["rangerlookup".to_string()],
                delegate_admin: true,
                ..PolicyItem::default()
            }],
            ..Policy::default()
        }
    }

    fn set(access_types: &[&str]) -> BTreeSet<String> {
        access_types.iter().map(|a| a.to_string()).collect()
    }

    fn synthesize_one(lookup_user: Option<&str>, policy: Policy) -> Vec<PolicyItem> {
        let mut policies = DefaultPolicySynthesizer::new(SERVICE, lookup_user)
            .synthesize(vec![policy])
            .unwrap();
        policies.remove(0).policy_items
    }

    const FULL: &[&str] = &["ViewAll", "EditDescription", "EditTags", "create", "delete"];

    #[test]
    fn test_bot_management_policy() {
        let items = synthesize_one(
            Some("svc-bot-user"),
            bootstrap_policy(&["bot", "webhook"], FULL),
        );

        assert_eq!(items.len(), 4);
        let bot = &items[2];
        assert_eq!(bot.roles, vec!["om1-bot".to_string()]);
        assert_eq!(
            bot.access_types(),
            set(&["ViewAll", "EditDescription", "EditTags"])
        );
        assert_eq!(bot.users, vec!["svc-bot-user".to_string()]);
    }

    #[rstest]
    #[case(&["bot"])]
    #[case(&["webhook"])]
    #[case(&["table"])]
    #[case(&["database", "databaseSchema", "table"])]
    fn test_bot_gets_all_access_types_elsewhere(#[case] resources: &[&str]) {
        let items = synthesize_one(None, bootstrap_policy(resources, FULL));

        assert_eq!(items[2].access_types(), set(FULL));
        assert!(items[2].users.is_empty());
    }

    #[test]
    fn test_role_items() {
        let all = [
            "ViewAll",
            "EditAll",
            "EditDescription",
            "EditDisplayName",
            "EditLineage",
            "EditOwner",
            "EditTags",
            "create",
            "delete",
        ];
        let items = synthesize_one(None, bootstrap_policy(&["table"], &all));

        let roles: Vec<_> = items.iter().map(|item| item.roles.clone()).collect();
        assert_eq!(
            roles,
            vec![
                vec!["om1-data-consumer".to_string()],
                vec!["om1-data-steward".to_string()],
                vec!["om1-bot".to_string()],
                vec!["om1-admin".to_string()],
            ]
        );

        assert_eq!(
            items[0].access_types(),
            set(&["ViewAll", "EditDescription", "EditTags"])
        );
        assert_eq!(
            items[1].access_types(),
            set(&[
                "ViewAll",
                "EditDescription",
                "EditDisplayName",
                "EditLineage",
                "EditOwner",
                "EditTags"
            ])
        );
        assert_eq!(items[3].access_types(), set(&all));
        assert_eq!(items[3].users, vec!["admin".to_string()]);

        for item in &items {
            assert!(item.groups.is_empty());
            assert!(item.conditions.is_empty());
            assert!(!item.delegate_admin);
            assert!(item.access_types().is_subset(&set(&all)));
            assert!(item.accesses.iter().all(|access| access.is_allowed));
        }
        for item in &items[..3] {
            assert!(item.users.is_empty());
        }
    }

    #[test]
    fn test_requested_access_types_missing_from_resource_are_dropped() {
        let items = synthesize_one(
            None,
            bootstrap_policy(&["glossary"], &["ViewAll", "EditOwner"]),
        );

        assert_eq!(items[0].access_types(), set(&["ViewAll"]));
        assert_eq!(items[1].access_types(), set(&["ViewAll", "EditOwner"]));
    }

    #[test]
    fn test_no_access_types() {
        let items = synthesize_one(
            Some("svc-bot-user"),
            bootstrap_policy(&["bot", "webhook"], &[]),
        );

        assert_eq!(items.len(), 4);
        assert!(items.iter().all(|item| item.accesses.is_empty()));
        assert_eq!(items[2].users, vec!["svc-bot-user".to_string()]);
        assert_eq!(items[3].users, vec!["admin".to_string()]);
    }

    #[test]
    fn test_only_first_item_is_read() {
        let mut policy = bootstrap_policy(&["table"], &["ViewAll"]);
        policy.policy_items.push(PolicyItem {
            accesses: vec![PolicyItemAccess::allowed("delete")],
            groups: vec!["public".to_string()],
            ..PolicyItem::default()
        });

        let items = synthesize_one(None, policy);
        assert_eq!(items.len(), 4);
        assert!(items
            .iter()
            .all(|item| !item.access_types().contains("delete") && item.groups.is_empty()));
    }

    #[test]
    fn test_empty_lookup_user_is_ignored() {
        let items = synthesize_one(Some(""), bootstrap_policy(&["table"], FULL));
        assert!(items[2].users.is_empty());
    }

    #[test]
    fn test_policy_without_items_fails() {
        let mut broken = bootstrap_policy(&["table"], FULL);
        broken.name = "all - table".to_string();
        broken.policy_items.clear();

        let err = DefaultPolicySynthesizer::new(SERVICE, None)
            .synthesize(vec![bootstrap_policy(&["bot", "webhook"], FULL), broken])
            .unwrap_err();
        assert!(matches!(err, Error::NoBootstrapItem { policy } if policy == "all - table"));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let input = vec![
            bootstrap_policy(&["bot", "webhook"], FULL),
            bootstrap_policy(&["table"], &["delete", "ViewAll", "EditTags", "ViewAll"]),
        ];
        let synthesizer = DefaultPolicySynthesizer::new(SERVICE, Some("svc-bot-user"));

        let first = synthesizer.synthesize(input.clone()).unwrap();
        let second = synthesizer.synthesize(input).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first[1].policy_items[3].accesses,
            vec![
                PolicyItemAccess::allowed("EditTags"),
                PolicyItemAccess::allowed("ViewAll"),
                PolicyItemAccess::allowed("delete"),
            ]
        );
    }

    #[test]
    fn test_policy_attributes_are_kept() {
        let policy: Policy = serde_json::from_str(indoc! {r#"
            {
              "id": 7,
              "service": "om1",
              "name": "all - bot, webhook",
              "isAuditEnabled": true,
              "resources": { "bot": { "values": ["*"] }, "webhook": { "values": ["*"] } },
              "policyItems": [ { "accesses": [ { "type": "ViewAll", "isAllowed": true } ] } ]
            }
        "#})
        .unwrap();

        let synthesized = DefaultPolicySynthesizer::new(SERVICE, None)
            .synthesize(vec![policy.clone()])
            .unwrap()
            .remove(0);
        assert_eq!(synthesized.id, Some(7));
        assert_eq!(synthesized.resources, policy.resources);
        assert_eq!(synthesized.extra, policy.extra);
    }
}
