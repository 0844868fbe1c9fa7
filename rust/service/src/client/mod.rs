//! Access to the OpenMetadata REST API.
//!
//! [`CatalogApi`] is the seam the validation and lookup code is written against,
//! [`OpenMetadataClient`] implements it over HTTP.

mod http;
pub mod version;

pub use http::OpenMetadataClient;

use async_trait::async_trait;
use ranger_openmetadata_model::{
    config::{ServiceConfig, Token},
    lookup::CatalogResource,
    CONFIG_ENDPOINT, CONFIG_TOKEN,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, ResultExt, Snafu};
use std::{fmt, str::FromStr, time::Duration};

type UrlParseError = <Url as FromStr>::Err;

/// The connection settings are unusable, detected before anything is sent
#[derive(Snafu, Debug)]
#[snafu(module)]
pub enum ConfigError {
    #[snafu(display("no OpenMetadata endpoint configured"))]
    MissingEndpoint,
    #[snafu(display("invalid OpenMetadata endpoint [{endpoint}]"))]
    InvalidEndpoint {
        source: UrlParseError,
        endpoint: String,
    },
    #[snafu(display(
        "unsupported scheme [{scheme}] in OpenMetadata endpoint [{endpoint}], expected http \
         or https"
    ))]
    UnsupportedScheme { endpoint: String, scheme: String },
    #[snafu(display("no OpenMetadata JWT token configured"))]
    MissingToken,
    #[snafu(display("the OpenMetadata JWT token contains characters not allowed in a header"))]
    InvalidToken,
    #[snafu(display("failed to build the HTTP client for [{endpoint}]"))]
    BuildClient {
        source: reqwest::Error,
        endpoint: String,
    },
}

impl ConfigError {
    /// The config key the administrator has to fix, if there is a single one
    pub fn field_name(&self) -> Option<&'static str> {
        match self {
            ConfigError::MissingEndpoint
            | ConfigError::InvalidEndpoint { .. }
            | ConfigError::UnsupportedScheme { .. } => Some(CONFIG_ENDPOINT),
            ConfigError::MissingToken | ConfigError::InvalidToken => Some(CONFIG_TOKEN),
            ConfigError::BuildClient { .. } => None,
        }
    }
}

/// A request to the catalog failed
#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("invalid request path [{path}]"))]
    InvalidPath {
        source: UrlParseError,
        path: String,
    },
    #[snafu(display("request to [{url}] failed"))]
    Request { source: reqwest::Error, url: String },
    #[snafu(display("[{url}] responded with status {status}: {body}"))]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[snafu(display("failed to decode the response of [{url}]"))]
    Decode { source: reqwest::Error, url: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything needed to open a session against the catalog
#[derive(Clone, Debug)]
pub struct ConnectionSettings {
    /// API base, always ending with `/`, e.g. `http://localhost:8585/api/`
    pub endpoint: Url,
    pub token: Token,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ConnectionSettings {
    pub fn from_service_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .context(config_error::MissingEndpointSnafu)?;
        let mut url =
            Url::parse(endpoint).context(config_error::InvalidEndpointSnafu { endpoint })?;
        ensure!(
            matches!(url.scheme(), "http" | "https"),
            config_error::UnsupportedSchemeSnafu {
                endpoint,
                scheme: url.scheme()
            }
        );
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let token = config.token.clone().context(config_error::MissingTokenSnafu)?;

        Ok(ConnectionSettings {
            endpoint: url,
            token,
            connect_timeout: config.connect_timeout,
            request_timeout: config.request_timeout,
        })
    }
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn server_version(&self) -> Result<ServerVersion>;

    async fn entities_count(&self) -> Result<EntitiesCount>;

    /// Lists one page of entities, continuing after the given cursor
    async fn list_entities(
        &self,
        resource: CatalogResource,
        limit: u32,
        after: Option<&str>,
    ) -> Result<EntityList>;
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerVersion {
    pub version: String,
    #[serde(default)]
    pub revision: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(revision) => write!(f, "{} (revision {revision})", self.version),
            None => f.write_str(&self.version),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntitiesCount {
    pub table_count: u64,
    pub topic_count: u64,
    pub dashboard_count: u64,
    pub pipeline_count: u64,
    pub mlmodel_count: u64,
    pub storage_container_count: u64,
    pub glossary_count: u64,
    pub glossary_term_count: u64,
    pub services_count: u64,
    pub user_count: u64,
    pub team_count: u64,
    pub test_suite_count: u64,
}

impl fmt::Display for EntitiesCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tables: {}, topics: {}, dashboards: {}, pipelines: {}, ml models: {}, containers: {}, \
             glossaries: {}, glossary terms: {}, services: {}, users: {}, teams: {}, \
             test suites: {}",
            self.table_count,
            self.topic_count,
            self.dashboard_count,
            self.pipeline_count,
            self.mlmodel_count,
            self.storage_container_count,
            self.glossary_count,
            self.glossary_term_count,
            self.services_count,
            self.user_count,
            self.team_count,
            self.test_suite_count,
        )
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityList {
    #[serde(default)]
    pub data: Vec<EntityReference>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

impl EntityList {
    /// Cursor of the next page, if there is one
    pub fn after(&self) -> Option<&str> {
        self.paging.as_ref().and_then(|paging| paging.after.as_deref())
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReference {
    pub name: String,
    #[serde(default)]
    pub fully_qualified_name: Option<String>,
}

impl EntityReference {
    /// Name used as a policy resource value
    pub fn resource_value(&self) -> &str {
        self.fully_qualified_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}
