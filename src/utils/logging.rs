/// Installs a `tracing_subscriber::fmt` subscriber capped at `level`.
///
/// Accepts the names `tracing` itself parses (`error`, `warn`, `info`,
/// `debug`, `trace`, case-insensitive); anything else means `info`.
/// Safe to call more than once: only the first call installs a subscriber.
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(max_level(level))
        .with_target(false)
        .try_init();
}

fn max_level(level: &str) -> tracing::Level {
    level.trim().parse().unwrap_or(tracing::Level::INFO)
}
