use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV_VAR: &str = "RANGER_OPENMETADATA_LOG";
const DEFAULT_LOG_DIRECTIVES: &str = "info";

/// Sets up tracing with the filter directives from `env`, falling back to `info`.
///
/// Logs go to stderr, stdout is reserved for command results.
pub fn initialize_logging(env: &str) {
    let filter = EnvFilter::try_from_env(env)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_startup_string(
    pkg_description: &str,
    pkg_version: &str,
    git_version: Option<&str>,
    target: &str,
    built_time: &str,
    rustc_version: &str,
) {
    let git_information = match git_version {
        None => "".to_string(),
        Some(git) => format!(" (Git information: {git})"),
    };
    info!("Starting {pkg_description}");
    info!(
        "This is version {pkg_version}{git_information}, built for {target} by {rustc_version} \
         at {built_time}"
    )
}
