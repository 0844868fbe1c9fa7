use async_trait::async_trait;
use const_format::concatcp;
use ranger_openmetadata_model::lookup::CatalogResource;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Url,
};
use serde::de::DeserializeOwned;
use snafu::{OptionExt, ResultExt};
use tracing::debug;

use super::{
    config_error, CatalogApi, ConfigError, ConnectionSettings, EntitiesCount, EntityList,
    DecodeSnafu, InvalidPathSnafu, RequestSnafu, Result, ServerVersion, StatusSnafu,
};

const API_VERSION: &str = "v1";
const SYSTEM_VERSION_PATH: &str = concatcp!(API_VERSION, "/system/version");
const ENTITIES_COUNT_PATH: &str = concatcp!(API_VERSION, "/system/entities/count");
// error bodies are echoed to the administrator, keep them short
const MAX_ERROR_BODY_CHARS: usize = 512;

/// A session against one OpenMetadata server, authenticated with a JWT bearer token.
///
/// Every session owns its own connection pool, nothing is shared between sessions.
#[derive(Clone, Debug)]
pub struct OpenMetadataClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl OpenMetadataClient {
    pub fn connect(settings: &ConnectionSettings) -> Result<Self, ConfigError> {
        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {}", settings.token.expose()))
                .ok()
                .context(config_error::InvalidTokenSnafu)?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .context(config_error::BuildClientSnafu {
                endpoint: settings.endpoint.as_str(),
            })?;

        debug!(endpoint = %settings.endpoint, "Created OpenMetadata session");
        Ok(OpenMetadataClient {
            endpoint: settings.endpoint.clone(),
            http,
        })
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint.join(path).context(InvalidPathSnafu { path })?;
        debug!(%url, "Requesting");

        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .context(RequestSnafu { url: url.as_str() })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return StatusSnafu {
                url: url.as_str(),
                status: status.as_u16(),
                body: truncate(body.trim(), MAX_ERROR_BODY_CHARS),
            }
            .fail();
        }

        response
            .json::<T>()
            .await
            .context(DecodeSnafu { url: url.as_str() })
    }
}

#[async_trait]
impl CatalogApi for OpenMetadataClient {
    async fn server_version(&self) -> Result<ServerVersion> {
        self.get_json(SYSTEM_VERSION_PATH, &[]).await
    }

    async fn entities_count(&self) -> Result<EntitiesCount> {
        self.get_json(ENTITIES_COUNT_PATH, &[]).await
    }

    async fn list_entities(
        &self,
        resource: CatalogResource,
        limit: u32,
        after: Option<&str>,
    ) -> Result<EntityList> {
        let path = format!("{API_VERSION}/{}", resource.collection());
        let mut query = vec![("limit", limit.to_string())];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }
        self.get_json(&path, &query).await
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &body[..index]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranger_openmetadata_model::config::Token;
    use rstest::rstest;
    use std::time::Duration;

    fn settings(endpoint: &str, token: &str) -> ConnectionSettings {
        ConnectionSettings {
            endpoint: Url::parse(endpoint).unwrap(),
            token: Token::new(token),
            connect_timeout: Duration::from_millis(500),
            request_timeout: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_api_paths() {
        assert_eq!(SYSTEM_VERSION_PATH, "v1/system/version");
        assert_eq!(ENTITIES_COUNT_PATH, "v1/system/entities/count");

        let endpoint = Url::parse("http://localhost:8585/api/").unwrap();
        assert_eq!(
            endpoint.join(SYSTEM_VERSION_PATH).unwrap().as_str(),
            "http://localhost:8585/api/v1/system/version"
        );
    }

    #[test]
    fn test_token_must_be_a_valid_header() {
        let err =
            OpenMetadataClient::connect(&settings("http://localhost:8585/api/", "line\nbreak"))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidToken));
    }

    #[rstest]
    #[case("short", 10, "short")]
    #[case("0123456789abc", 10, "0123456789...")]
    #[case("ääääää", 3, "äää...")]
    fn test_truncate(#[case] body: &str, #[case] max_chars: usize, #[case] expected: &str) {
        assert_eq!(truncate(body, max_chars), expected);
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // nothing listens on port 1
        let client =
            OpenMetadataClient::connect(&settings("http://127.0.0.1:1/api/", "jwt")).unwrap();
        let err = client.server_version().await.unwrap_err();
        assert!(matches!(err, crate::client::Error::Request { .. }));
        assert!(err.to_string().contains("http://127.0.0.1:1/api/v1/system/version"));
    }
}
