use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString};

/// What the policy editor knows while the user types a resource value
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLookupContext {
    /// Partial value typed so far, may end with `*`
    #[serde(default)]
    pub user_input: String,
    /// Resource that is being completed, e.g. `table`
    pub resource_name: String,
    /// Values already selected, per resource name
    #[serde(default)]
    pub resources: BTreeMap<String, Vec<String>>,
}

impl ResourceLookupContext {
    /// The typed prefix without a trailing wildcard
    pub fn prefix(&self) -> &str {
        self.user_input.trim().trim_end_matches('*')
    }

    pub fn selected_values(&self) -> &[String] {
        self.resources
            .get(&self.resource_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Catalog entity types a policy resource can be completed from
#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq)]
#[strum(serialize_all = "camelCase")]
pub enum CatalogResource {
    DatabaseService,
    Database,
    DatabaseSchema,
    Table,
    Topic,
    Dashboard,
    Chart,
    Pipeline,
    Mlmodel,
    Container,
    Glossary,
    GlossaryTerm,
    Classification,
    Tag,
    Team,
    User,
    Role,
    Policy,
    Bot,
    #[strum(to_string = "webhook", serialize = "eventsubscription")]
    Webhook,
}

impl CatalogResource {
    /// Path of the listing endpoint below `/v1`
    pub fn collection(&self) -> &'static str {
        match self {
            CatalogResource::DatabaseService => "services/databaseServices",
            CatalogResource::Database => "databases",
            CatalogResource::DatabaseSchema => "databaseSchemas",
            CatalogResource::Table => "tables",
            CatalogResource::Topic => "topics",
            CatalogResource::Dashboard => "dashboards",
            CatalogResource::Chart => "charts",
            CatalogResource::Pipeline => "pipelines",
            CatalogResource::Mlmodel => "mlmodels",
            CatalogResource::Container => "containers",
            CatalogResource::Glossary => "glossaries",
            CatalogResource::GlossaryTerm => "glossaryTerms",
            CatalogResource::Classification => "classifications",
            CatalogResource::Tag => "tags",
            CatalogResource::Team => "teams",
            CatalogResource::User => "users",
            CatalogResource::Role => "roles",
            CatalogResource::Policy => "policies",
            CatalogResource::Bot => "bots",
            CatalogResource::Webhook => "events/subscriptions",
        }
    }
}
