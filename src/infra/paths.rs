// src/infra/paths.rs — Config path resolution
//
// BOOKLOOP_HOME overrides everything. Otherwise config lives in ~/.bookloop/.

use std::path::PathBuf;

/// Returns the BOOKLOOP_HOME override, if set.
fn bookloop_home() -> Option<PathBuf> {
    std::env::var_os("BOOKLOOP_HOME").map(PathBuf::from)
}

/// Configuration directory: $BOOKLOOP_HOME/ or ~/.bookloop/
///
/// `None` when no home directory can be determined.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(home) = bookloop_home() {
        return Some(home);
    }
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".bookloop"))
}

/// Config file path
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
