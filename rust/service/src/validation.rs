//! Connection test run by the policy manager when a service configuration is saved.

use crate::client::{
    self, version::CatalogVersion, CatalogApi, ConfigError, ConnectionSettings,
    OpenMetadataClient,
};

use ranger_openmetadata_model::config::{self, ServiceConfig};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use std::{collections::BTreeMap, str::FromStr};
use tracing::{debug, warn};

/// Appended to every failure shown to the administrator
pub const REMEDIATION_HINT: &str = "You can still save the repository and start creating \
    policies, but you would not be able to use autocomplete for resource names. Check \
    ranger_admin.log for more info.";

const ENDPOINT_NOT_CONFIGURED: &str = "<not configured>";

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("invalid configuration for OpenMetadata service [{service_name}]"))]
    InvalidConfig {
        source: config::Error,
        service_name: String,
    },
    #[snafu(display(
        "unable to create OpenMetadata client for service [{service_name}] and endpoint \
         [{endpoint}]"
    ))]
    Configuration {
        source: ConfigError,
        service_name: String,
        endpoint: String,
    },
    #[snafu(display(
        "cannot fetch OpenMetadata version for service [{service_name}] from [{endpoint}]"
    ))]
    FetchVersion {
        source: client::Error,
        service_name: String,
        endpoint: String,
    },
    #[snafu(display(
        "cannot fetch OpenMetadata entity counts for service [{service_name}] from [{endpoint}]"
    ))]
    FetchEntitiesCount {
        source: client::Error,
        service_name: String,
        endpoint: String,
    },
}

/// Result of a connection test in the shape the policy manager displays it
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub connectivity_status: bool,
    pub message: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
}

impl ValidationResponse {
    pub fn success(&self) -> bool {
        self.connectivity_status
    }

    fn succeeded(message: String) -> Self {
        ValidationResponse {
            connectivity_status: true,
            description: message.clone(),
            message,
            object_id: None,
            field_name: None,
        }
    }

    fn failed(error: &Error) -> Self {
        let field_name = match error {
            Error::InvalidConfig { source, .. } => Some(source.field_name().to_string()),
            Error::Configuration { source, .. } => source.field_name().map(str::to_string),
            Error::FetchVersion { .. } | Error::FetchEntitiesCount { .. } => None,
        };
        ValidationResponse {
            connectivity_status: false,
            message: format!("{error}. {REMEDIATION_HINT}"),
            description: format!("{}. {REMEDIATION_HINT}", error_chain(error)),
            object_id: None,
            field_name,
        }
    }
}

impl From<Result<String, Error>> for ValidationResponse {
    fn from(result: Result<String, Error>) -> Self {
        match result {
            Ok(message) => ValidationResponse::succeeded(message),
            Err(error) => ValidationResponse::failed(&error),
        }
    }
}

/// Parses the config options as the policy manager stores them and tests the connection.
///
/// Options that can not be parsed are reported in the response like any other failure.
pub async fn validate_config_map(
    service_name: &str,
    configs: &BTreeMap<String, String>,
) -> ValidationResponse {
    match ServiceConfig::from_config_map(configs).context(InvalidConfigSnafu { service_name }) {
        Ok(config) => validate_config(service_name, &config).await,
        Err(error) => into_response(service_name, Err(error)),
    }
}

/// Opens a new session with the given configuration and tests it.
///
/// Never fails: configuration and connectivity problems end up in the response.
pub async fn validate_config(service_name: &str, config: &ServiceConfig) -> ValidationResponse {
    debug!(service_name, "Validating OpenMetadata connection");

    let endpoint = config.endpoint.as_deref().unwrap_or(ENDPOINT_NOT_CONFIGURED);
    let response = match connect(service_name, config) {
        Ok(client) => validate_connection(&client, service_name, endpoint).await,
        Err(error) => Err(error),
    };
    into_response(service_name, response)
}

fn into_response(service_name: &str, result: Result<String, Error>) -> ValidationResponse {
    if let Err(error) = &result {
        warn!(
            service_name,
            error = %error_chain(error),
            "OpenMetadata connection test failed"
        );
    }

    let response = ValidationResponse::from(result);
    debug!(service_name, ?response, "Validated OpenMetadata connection");
    response
}

fn connect(service_name: &str, config: &ServiceConfig) -> Result<OpenMetadataClient, Error> {
    ConnectionSettings::from_service_config(config)
        .and_then(|settings| OpenMetadataClient::connect(&settings))
        .context(ConfigurationSnafu {
            service_name,
            endpoint: config.endpoint.as_deref().unwrap_or(ENDPOINT_NOT_CONFIGURED),
        })
}

/// Fetches the server version, then the entity counts. The second request is only sent
/// if the first one succeeded.
///
/// `endpoint` is the endpoint as configured by the administrator, used in error messages.
pub async fn validate_connection<C>(
    client: &C,
    service_name: &str,
    endpoint: &str,
) -> Result<String, Error>
where
    C: CatalogApi + ?Sized,
{
    let version = client
        .server_version()
        .await
        .context(FetchVersionSnafu {
            service_name,
            endpoint,
        })?;
    match CatalogVersion::from_str(&version.version) {
        Ok(parsed) if !parsed.is_supported() => warn!(
            service_name,
            version = %version,
            "OpenMetadata server is older than {}, default policies may not match its access types",
            client::version::MIN_SUPPORTED_VERSION
        ),
        Ok(_) => {}
        Err(error) => warn!(service_name, %error, "Could not interpret OpenMetadata version"),
    }

    let entities_count = client
        .entities_count()
        .await
        .context(FetchEntitiesCountSnafu {
            service_name,
            endpoint,
        })?;

    Ok(format!(
        "Connection test successful. Server version: {version}. Entity counts: {entities_count}."
    ))
}

/// Renders an error with all its causes, e.g. `a: b: c`
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut chain = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}
