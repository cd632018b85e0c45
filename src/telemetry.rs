use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a fmt subscriber filtered by `RUST_LOG`, falling back to `default_filter`
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("Tracing initialized");
    }
}
