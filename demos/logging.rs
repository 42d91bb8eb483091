use tracing_subscriber::{fmt, EnvFilter};

/// Log to stderr, filtered by `RUST_LOG` (warnings and errors by default),
/// so stdout only carries program output.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
