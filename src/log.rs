use tracing_subscriber::EnvFilter;

/// Installs the global subscriber at `level` for this crate and the storage
/// backends. `RUST_LOG` wins when set.
pub fn set(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .init();
}

fn directives(level: &str) -> String {
    ["rtpsniff", "storage"]
        .map(|target| format!("{target}={level}"))
        .join(",")
}
