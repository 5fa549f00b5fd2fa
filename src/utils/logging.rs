use tracing_subscriber::EnvFilter;

const CRATE_TARGET: &str = "weather_extremes";

/// Filter level for a `-v` count: none -> warn, -v -> info, -vv -> debug,
/// anything more -> trace
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize tracing on stderr; stdout carries command output.
///
/// `RUST_LOG` overrides the verbosity flag when set.
pub fn init(verbosity: u8) {
    let default_filter = format!("{CRATE_TARGET}={}", level_for(verbosity));
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
