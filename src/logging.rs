// ABOUTME: Tracing subscriber setup for the command-line binary
// ABOUTME: Verbosity comes from --debug/--trace unless RUST_LOG is set

use tracing_subscriber::EnvFilter;

pub fn default_level(debug: bool, trace: bool) -> &'static str {
    if trace {
        "trace"
    } else if debug {
        "debug"
    } else {
        "info"
    }
}

/// Installs the process subscriber. Call once, before any component runs.
pub fn init(debug: bool, trace: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(debug, trace)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
