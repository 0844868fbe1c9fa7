//! Autocompletion of resource values in the policy editor.

use crate::client::{self, CatalogApi, ConnectionSettings, OpenMetadataClient};

use ranger_openmetadata_model::{
    config::ServiceConfig,
    lookup::{CatalogResource, ResourceLookupContext},
};
use snafu::{OptionExt, ResultExt, Snafu};
use std::{collections::BTreeSet, str::FromStr};
use tracing::debug;

/// Upper bound of pages fetched for a single lookup
const MAX_LOOKUP_PAGES: usize = 10;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("resource [{resource}] can not be looked up in OpenMetadata"))]
    UnsupportedResource { resource: String },
    #[snafu(display("unable to open an OpenMetadata session for the lookup"))]
    OpenSession { source: client::ConfigError },
    #[snafu(display("failed to list OpenMetadata {resource} entities"))]
    ListEntities {
        source: client::Error,
        resource: CatalogResource,
    },
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// Opens a new session with the given configuration and looks up candidates on it
pub async fn lookup_with_config(
    config: &ServiceConfig,
    context: &ResourceLookupContext,
) -> Result<Vec<String>> {
    let client = ConnectionSettings::from_service_config(config)
        .and_then(|settings| OpenMetadataClient::connect(&settings))
        .context(OpenSessionSnafu)?;
    lookup_resource(&client, context, config.lookup_page_size).await
}

/// Returns up to `limit` resource values starting with the typed prefix, ignoring case.
///
/// Values already selected for the resource are left out. The result is sorted.
pub async fn lookup_resource<C>(
    client: &C,
    context: &ResourceLookupContext,
    limit: u32,
) -> Result<Vec<String>>
where
    C: CatalogApi + ?Sized,
{
    let resource = CatalogResource::from_str(&context.resource_name)
        .ok()
        .context(UnsupportedResourceSnafu {
            resource: context.resource_name.as_str(),
        })?;
    let prefix = context.prefix().to_lowercase();
    let selected: BTreeSet<&str> = context
        .selected_values()
        .iter()
        .map(String::as_str)
        .collect();
    let limit = limit.max(1);

    let mut candidates = BTreeSet::new();
    let mut after: Option<String> = None;
    for _ in 0..MAX_LOOKUP_PAGES {
        let page = client
            .list_entities(resource, limit, after.as_deref())
            .await
            .context(ListEntitiesSnafu { resource })?;

        candidates.extend(
            page.data
                .iter()
                .map(|entity| entity.resource_value())
                .filter(|value| value.to_lowercase().starts_with(&prefix))
                .filter(|value| !selected.contains(value))
                .map(str::to_string),
        );

        after = page.after().map(str::to_string);
        if after.is_none() || candidates.len() >= limit as usize {
            break;
        }
    }

    let candidates: Vec<String> = candidates.into_iter().take(limit as usize).collect();
    debug!(
        %resource,
        %prefix,
        found = candidates.len(),
        "Looked up OpenMetadata resource values"
    );
    Ok(candidates)
}
