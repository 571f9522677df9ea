// src/infra/paths.rs — Config file lookup
//
// DAYBOOK_HOME overrides the config directory. When unset, config
// lives under ~/.daybook/.

use std::path::{Path, PathBuf};

/// Name of the settings file in every searched location.
pub const CONFIG_FILE: &str = "config.toml";

/// Returns the DAYBOOK_HOME override, if set.
fn daybook_home() -> Option<PathBuf> {
    std::env::var_os("DAYBOOK_HOME").map(PathBuf::from)
}

/// Home directory, if the platform has one.
pub fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Configuration directory: $DAYBOOK_HOME/ or ~/.daybook/
pub fn config_dir() -> Option<PathBuf> {
    if let Some(home) = daybook_home() {
        return Some(home);
    }
    dirs_home().map(|h| h.join(".daybook"))
}

/// Config file candidates in lookup order: working directory first,
/// then the config directory.
pub fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = config_dir() {
        candidates.push(dir.join(CONFIG_FILE));
    }
    candidates
}

/// First candidate that exists on disk.
pub fn find_config_file() -> Option<PathBuf> {
    config_candidates()
        .into_iter()
        .find(|p| Path::new(p).is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_working_dir_checked_first() {
        let candidates = config_candidates();
        assert_eq!(candidates[0], PathBuf::from("config.toml"));
        assert!(candidates.iter().all(|p| p.ends_with(CONFIG_FILE)));
    }
}
