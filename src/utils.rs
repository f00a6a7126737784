use std::path::PathBuf;

use anyhow::Context;
use tracing::debug;

use crate::signal;

pub async fn shutdown_signal() {
    let str = signal::wait_for_stop_signal().await;
    debug!("Received signal: {}", str);
}

/// Config files tried in order: `path`, `./{name}.toml`, `/etc/{name}/{name}.toml`.
pub fn candidates(name: &str, path: Option<String>) -> Vec<PathBuf> {
    path.map(PathBuf::from)
        .into_iter()
        .chain([
            PathBuf::from(format!("{name}.toml")),
            PathBuf::from(format!("/etc/{name}/{name}.toml")),
        ])
        .collect()
}

/// Loads the first readable file of [`candidates`]. Without any file the
/// defaults are returned. A file that does not parse is an error, so the
/// caller can report it once logging is up.
pub fn load<T>(name: &str, path: Option<String>) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned + std::default::Default,
{
    load_first(&candidates(name, path))
}

pub fn load_first<T>(paths: &[PathBuf]) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned + std::default::Default,
{
    for path in paths {
        let Ok(content) = std::fs::read_to_string(path) else {
            continue;
        };
        return toml::from_str(&content)
            .with_context(|| format!("config load error in {}", path.display()));
    }
    Ok(Default::default())
}
