use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` is only honored when debug
/// logging is on; otherwise the level is pinned to `info`.
pub fn init(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    // A host that already installed a subscriber keeps it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
