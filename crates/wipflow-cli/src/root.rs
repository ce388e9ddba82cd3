use std::path::{Path, PathBuf};
use wipflow_core::config::CONFIG_FILE;

/// Resolve the station config file.
///
/// Priority:
/// 1. `--config` flag / `WIPFLOW_CONFIG` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `wipflow.yaml`
/// 3. Fall back to `./wipflow.yaml`
pub fn resolve_config(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    discover(&cwd)
}

fn discover(start: &Path) -> PathBuf {
    find_upward(start).unwrap_or_else(|| start.join(CONFIG_FILE))
}

fn find_upward(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}
