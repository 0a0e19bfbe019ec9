use tracing_subscriber::EnvFilter;

use crate::error::{ConfigError, ConfigResult};

/// Install the global `tracing` subscriber.
///
/// `filter` uses the `EnvFilter` directive syntax (`info`,
/// `workforce=debug,tower_http=warn`, ...). Logs go to stderr so command
/// output on stdout stays clean.
pub fn init(filter: &str) -> ConfigResult<()> {
    let env_filter = build_filter(filter)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| ConfigError::Subscriber(e.to_string()))
}

fn build_filter(filter: &str) -> ConfigResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| ConfigError::LogFilter {
        value: filter.to_string(),
        message: e.to_string(),
    })
}
