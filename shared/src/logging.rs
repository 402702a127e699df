use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber. `RUST_LOG` wins when set; otherwise
/// the calling crate logs at `debug` and everything else at `info`.
pub fn init(crate_name: &str) -> Result<()> {
    let default_directive = format!("info,{}=debug", crate_name.replace('-', "_"));
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&default_directive))
        .map_err(|e| anyhow!("invalid log filter: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

/// Initialise tracing for the calling crate.
#[macro_export]
macro_rules! init_tracing {
    () => {
        $crate::logging::init(env!("CARGO_PKG_NAME"))
    };
}
