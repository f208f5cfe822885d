//! Tracing subscriber setup for the plugin binaries.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::error::{ReconError, ReconResult};

/// Builds the level filter: `RUST_LOG` when set, `level` otherwise.
pub fn env_filter(level: &str) -> ReconResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| ReconError::config(format!("invalid log level '{}': {}", level, e))),
    }
}

/// Installs the global tracing subscriber.
///
/// Logs go to stderr so stdout stays free for the JSON outcome.
pub fn init_logging(level: &str) -> ReconResult<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter(level)?)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ReconError::config(format!("Failed to set logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_accepts_directives() {
        assert!(env_filter("info").is_ok());
        assert!(env_filter("recon_common=debug,warn").is_ok());
    }
}
