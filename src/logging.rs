use tracing_subscriber::{fmt, EnvFilter};

use crate::errors::{Result, ThemeError};

/// Install the stderr subscriber. `RUST_LOG` wins; otherwise `verbose`
/// selects debug over warn.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "tailwind_theme=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| ThemeError::Config {
            message: format!("Failed to initialise logging: {}", e),
        })
}
