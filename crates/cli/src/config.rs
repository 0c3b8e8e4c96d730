//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use strata_core_layout::Config;

/// Load configuration.
///
/// An explicit path must exist. Otherwise the following locations are tried
/// in order:
/// 1. the platform config dir (`strata/config.toml`)
/// 2. `~/.config/strata/config.toml`
/// 3. `./config.toml`
///
/// Returns the default config, and no path, if no file is found.
pub fn load(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = load_from_path(path)?;
        return Ok((config, Some(path.to_path_buf())));
    }

    for path in config_paths() {
        if path.exists() {
            tracing::info!("Loading config from: {}", path.display());
            let config = load_from_path(&path)?;
            return Ok((config, Some(path)));
        }
    }

    tracing::info!("No config file found, using defaults");
    Ok((Config::default(), None))
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    Config::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Get all possible config file paths in priority order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(proj_dirs) = ProjectDirs::from("org", "strata", "strata") {
        paths.push(proj_dirs.config_dir().join("config.toml"));
    }

    if let Some(home) = dirs_home() {
        let unix_style = home.join(".config").join("strata").join("config.toml");
        if !paths.contains(&unix_style) {
            paths.push(unix_style);
        }
    }

    paths.push(PathBuf::from("config.toml"));

    paths
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths_end_with_working_directory() {
        let paths = config_paths();
        assert_eq!(paths.last(), Some(&PathBuf::from("config.toml")));
        assert!(paths.iter().all(|p| p.ends_with("config.toml")));
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/strata/config.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
