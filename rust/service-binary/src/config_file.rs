//! Service configuration as the policy manager persists it: a flat map of string options.

use ranger_openmetadata_model::{
    config::{self, ServiceConfig},
    CONFIG_ENDPOINT, CONFIG_LOOKUP_USER, CONFIG_TOKEN,
};
use serde_yaml::Value;
use snafu::{ResultExt, Snafu};
use std::{
    collections::BTreeMap,
    fs::File,
    path::{Path, PathBuf},
};

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("failed to open config file [{}]", path.display()))]
    OpenConfigFile {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("failed to parse config file [{}]", path.display()))]
    ParseConfigFile {
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[snafu(display("config option [{key}] in [{}] must be a scalar value", path.display()))]
    NonScalarOption { key: String, path: PathBuf },
    #[snafu(display("invalid service configuration"))]
    InvalidServiceConfig { source: config::Error },
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// Reads a YAML (or JSON) mapping of config options.
///
/// Numbers and booleans are accepted and turned into their string form, like the policy
/// manager stores them.
pub fn read_config_map(path: &Path) -> Result<BTreeMap<String, String>> {
    let file = File::open(path).context(OpenConfigFileSnafu { path })?;
    let raw: BTreeMap<String, Value> =
        serde_yaml::from_reader(file).context(ParseConfigFileSnafu { path })?;
    to_config_map(raw, path)
}

fn to_config_map(raw: BTreeMap<String, Value>, path: &Path) -> Result<BTreeMap<String, String>> {
    raw.into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(value) => value,
                Value::Bool(value) => value.to_string(),
                Value::Number(value) => value.to_string(),
                _ => return Some(NonScalarOptionSnafu { key, path }.fail()),
            };
            Some(Ok((key, value)))
        })
        .collect()
}

/// Options given on the command line, taking precedence over the config file
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub lookup_user: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(self, configs: &mut BTreeMap<String, String>) {
        for (key, value) in [
            (CONFIG_ENDPOINT, self.endpoint),
            (CONFIG_TOKEN, self.token),
            (CONFIG_LOOKUP_USER, self.lookup_user),
        ] {
            if let Some(value) = value {
                configs.insert(key.to_string(), value);
            }
        }
    }
}

/// Config options from the optional file with the overrides applied, as unparsed strings
pub fn load_config_map(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<BTreeMap<String, String>> {
    let mut configs = match path {
        Some(path) => read_config_map(path)?,
        None => BTreeMap::new(),
    };
    overrides.apply(&mut configs);
    Ok(configs)
}

pub fn load_service_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<ServiceConfig> {
    let configs = load_config_map(path, overrides)?;
    ServiceConfig::from_config_map(&configs).context(InvalidServiceConfigSnafu)
}
