mod config_file;
mod logging;

use crate::config_file::ConfigOverrides;

use anyhow::Context as _;
use clap::{crate_description, crate_version, Args, Parser, Subcommand};
use ranger_openmetadata_model::{lookup::ResourceLookupContext, policy::Policy, APP_NAME};
use ranger_openmetadata_service::{validation, OpenMetadataService, RangerService};
use serde::Serialize;
use std::{collections::BTreeMap, fs::File, io, path::PathBuf};
use tracing::debug;

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Parser)]
#[clap(about, author, version)]
struct Opts {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Test the connection to OpenMetadata and print the result
    Validate {
        #[clap(flatten)]
        service: ServiceArgs,
    },
    /// Create the default policies from the bootstrap policies in a JSON file
    DefaultPolicies {
        #[clap(flatten)]
        service: ServiceArgs,
        /// JSON file with the list of bootstrap policies
        #[clap(long)]
        input: PathBuf,
    },
    /// Print candidate values for a resource
    Lookup {
        #[clap(flatten)]
        service: ServiceArgs,
        /// Resource to complete, e.g. `table`
        #[clap(long)]
        resource: String,
        /// What has been typed so far
        #[clap(long, default_value = "")]
        user_input: String,
        /// Values already selected for the resource
        #[clap(long)]
        selected: Vec<String>,
    },
}

#[derive(Args)]
struct ServiceArgs {
    /// Name of the service instance in the policy manager
    #[clap(long, env = "RANGER_OPENMETADATA_SERVICE_NAME", default_value = APP_NAME)]
    service_name: String,
    /// YAML or JSON file with the service config options
    #[clap(long, env = "RANGER_OPENMETADATA_CONFIG")]
    config: Option<PathBuf>,
    /// OpenMetadata API endpoint, e.g. http://localhost:8585/api
    #[clap(long, env = "OPENMETADATA_ENDPOINT")]
    endpoint: Option<String>,
    /// OpenMetadata JWT token
    #[clap(long, env = "OPENMETADATA_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// User added to the bot policy items
    #[clap(long)]
    lookup_user: Option<String>,
}

impl ServiceArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            endpoint: self.endpoint.clone(),
            token: self.token.clone(),
            lookup_user: self.lookup_user.clone(),
        }
    }

    fn config_map(&self) -> anyhow::Result<BTreeMap<String, String>> {
        Ok(config_file::load_config_map(self.config.as_deref(), self.overrides())?)
    }

    fn into_service(self) -> anyhow::Result<OpenMetadataService> {
        let config = config_file::load_service_config(self.config.as_deref(), self.overrides())?;
        Ok(OpenMetadataService::new(self.service_name, config))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    logging::initialize_logging(logging::LOG_ENV_VAR);
    logging::print_startup_string(
        crate_description!(),
        crate_version!(),
        built_info::GIT_VERSION,
        built_info::TARGET,
        built_info::BUILT_TIME_UTC,
        built_info::RUSTC_VERSION,
    );

    match opts.cmd {
        Command::Validate { service } => {
            // invalid options are part of the response, not a failure of the command
            let configs = service.config_map()?;
            let response = validation::validate_config_map(&service.service_name, &configs).await;
            print_json(&response)?;
        }
        Command::DefaultPolicies { service, input } => {
            let service = service.into_service()?;
            let file = File::open(&input).with_context(|| {
                format!("failed to open bootstrap policies [{}]", input.display())
            })?;
            let bootstrap: Vec<Policy> = serde_json::from_reader(file).with_context(|| {
                format!("failed to parse bootstrap policies [{}]", input.display())
            })?;
            debug!(count = bootstrap.len(), "Read bootstrap policies");

            let policies = service.default_policies(bootstrap)?;
            print_json(&policies)?;
        }
        Command::Lookup {
            service,
            resource,
            user_input,
            selected,
        } => {
            let service = service.into_service()?;
            let context = ResourceLookupContext {
                user_input,
                resources: BTreeMap::from([(resource.clone(), selected)]),
                resource_name: resource,
            };
            let values = service.lookup_resource(&context).await?;
            print_json(&values)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let stdout = io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), value).context("failed to write result")?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli() {
        Opts::command().debug_assert();
    }

    #[rstest]
    #[case(&["ranger-openmetadata", "validate", "--endpoint", "http://localhost:8585/api"])]
    #[case(&[
        "ranger-openmetadata",
        "default-policies",
        "--service-name",
        "om1",
        "--input",
        "bootstrap.json",
    ])]
    #[case(&[
        "ranger-openmetadata",
        "lookup",
        "--resource",
        "table",
        "--user-input",
        "sample",
        "--selected",
        "a",
        "--selected",
        "b",
    ])]
    fn test_parse_commands(#[case] args: &[&str]) {
        assert!(Opts::try_parse_from(args).is_ok());
    }

    #[tokio::test]
    async fn test_validate_reports_invalid_options() {
        let Command::Validate { service } = Opts::try_parse_from([
            "ranger-openmetadata",
            "validate",
            "--service-name",
            "om1",
            "--endpoint",
            "http://localhost:8585/api",
            "--token",
            "jwt",
        ])
        .unwrap()
        .cmd
        else {
            panic!("expected the validate command");
        };
        let mut configs = service.config_map().unwrap();
        configs.insert("request.timeout.ms".to_string(), "soon".to_string());

        let response = validation::validate_config_map(&service.service_name, &configs).await;
        assert!(!response.success());
        assert_eq!(response.field_name.as_deref(), Some("request.timeout.ms"));
        assert!(response.message.contains(validation::REMEDIATION_HINT));
    }

    #[test]
    fn test_default_policies_requires_input() {
        assert!(Opts::try_parse_from(["ranger-openmetadata", "default-policies"]).is_err());
    }
}
