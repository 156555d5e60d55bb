use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::lexview_message_error;

static LOGGING_INIT: Once = Once::new();

/// Log filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Initializes global logging for lexview processes.
///
/// Output goes to stderr so that stdout stays reserved for rendered tokens.
/// Repeated calls are no-ops once initialization has run.
pub fn init_logging() -> Result<()> {
    let mut init_result = Ok(());

    LOGGING_INIT.call_once(|| {
        init_result = tracing_subscriber::fmt()
            .with_env_filter(default_env_filter())
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|error| {
                lexview_message_error!("failed to initialize logging")
                    .with_boxed_source(error)
            });
    });

    init_result
}

fn default_env_filter() -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(DEFAULT_LOG_FILTER),
    }
}
