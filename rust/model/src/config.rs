use crate::{
    CONFIG_CONNECT_TIMEOUT_MS, CONFIG_ENDPOINT, CONFIG_LOOKUP_PAGE_SIZE, CONFIG_LOOKUP_PRINCIPAL,
    CONFIG_LOOKUP_USER, CONFIG_REQUEST_TIMEOUT_MS, CONFIG_TOKEN, DEFAULT_CONNECT_TIMEOUT_MS,
    DEFAULT_LOOKUP_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_MS, MAX_LOOKUP_PAGE_SIZE,
};

use snafu::{ensure, ResultExt, Snafu};
use std::{collections::BTreeMap, fmt, num::ParseIntError, time::Duration};
use tracing::debug;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("config option [{key}] must be a number, got [{value}]"))]
    InvalidNumber {
        source: ParseIntError,
        key: String,
        value: String,
    },
    #[snafu(display("config option [{key}] must be between {min} and {max}, got [{value}]"))]
    OutOfRange {
        key: String,
        value: u64,
        min: u64,
        max: u64,
    },
}

impl Error {
    /// The config key that caused this error
    pub fn field_name(&self) -> &str {
        match self {
            Error::InvalidNumber { key, .. } | Error::OutOfRange { key, .. } => key,
        }
    }
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// Bearer credential for the OpenMetadata API. Never printed.
#[derive(Clone, Eq, PartialEq)]
pub struct Token(String);

impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Token(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Settings of a single OpenMetadata service instance, as persisted by the policy manager.
///
/// Endpoint and token are kept as given: whether they are usable is decided when a
/// session to the catalog is opened, so that default policies can still be created for a
/// service whose connection is not configured yet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceConfig {
    pub endpoint: Option<String>,
    pub token: Option<Token>,
    /// User that is additionally granted the bot policy items
    pub lookup_user: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Number of entities requested per page and maximum number of lookup results
    pub lookup_page_size: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            endpoint: None,
            token: None,
            lookup_user: None,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            lookup_page_size: DEFAULT_LOOKUP_PAGE_SIZE,
        }
    }
}

impl ServiceConfig {
    pub fn from_config_map(configs: &BTreeMap<String, String>) -> Result<Self> {
        let endpoint = non_blank(configs, CONFIG_ENDPOINT).map(|endpoint| {
            endpoint.trim_end_matches('/').to_string()
        });
        let token = non_blank(configs, CONFIG_TOKEN).map(Token::new);
        let lookup_user = non_blank(configs, CONFIG_LOOKUP_USER)
            .map(str::to_string)
            .or_else(|| non_blank(configs, CONFIG_LOOKUP_PRINCIPAL).and_then(principal_short_name));

        let connect_timeout = parse_number(configs, CONFIG_CONNECT_TIMEOUT_MS, 1, u64::MAX)?
            .map_or(ServiceConfig::default().connect_timeout, Duration::from_millis);
        let request_timeout = parse_number(configs, CONFIG_REQUEST_TIMEOUT_MS, 1, u64::MAX)?
            .map_or(ServiceConfig::default().request_timeout, Duration::from_millis);
        let lookup_page_size = parse_number(
            configs,
            CONFIG_LOOKUP_PAGE_SIZE,
            1,
            u64::from(MAX_LOOKUP_PAGE_SIZE),
        )?
        .map_or(DEFAULT_LOOKUP_PAGE_SIZE, |size| size as u32);

        let config = ServiceConfig {
            endpoint,
            token,
            lookup_user,
            connect_timeout,
            request_timeout,
            lookup_page_size,
        };
        debug!(?config, "Parsed service config");
        Ok(config)
    }
}

fn non_blank<'a>(configs: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    configs
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn parse_number(
    configs: &BTreeMap<String, String>,
    key: &str,
    min: u64,
    max: u64,
) -> Result<Option<u64>> {
    let Some(value) = non_blank(configs, key) else {
        return Ok(None);
    };
    let number = value
        .parse::<u64>()
        .context(InvalidNumberSnafu { key, value })?;
    ensure!(
        (min..=max).contains(&number),
        OutOfRangeSnafu {
            key,
            value: number,
            min,
            max
        }
    );
    Ok(Some(number))
}

/// Reduces a Kerberos principal such as `rangerlookup/host@REALM` to `rangerlookup`
fn principal_short_name(principal: &str) -> Option<String> {
    principal
        .split(['/', '@'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
