//! Platform-specific cache locations for the persisted allowlist

use crate::error::ProjectLocalError;
use directories::BaseDirs;
use std::path::PathBuf;
use std::sync::OnceLock;

const ALLOWLIST_FILE: &str = "allowlist.json";

static BOOTSTRAPPED: OnceLock<()> = OnceLock::new();

/// Process-wide init: prepare the cache state exactly once per session
///
/// Re-entrant calls are no-ops; host integrations may invoke this from every
/// event callback without re-touching the filesystem.
pub fn bootstrap(paths: &PluginPaths) -> Result<(), ProjectLocalError> {
    if BOOTSTRAPPED.get().is_some() {
        return Ok(());
    }
    paths.ensure()?;
    let _ = BOOTSTRAPPED.set(());
    Ok(())
}

/// Path management for projectlocal state
#[derive(Debug, Clone)]
pub struct PluginPaths {
    /// Cache directory holding the allowlist (`<cache root>/vim/projectlocal/`)
    pub cache_dir: PathBuf,
}

impl PluginPaths {
    /// Resolve the platform cache directory
    pub fn new() -> Self {
        let cache_root = BaseDirs::new()
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(Self::fallback_cache_root);

        PluginPaths {
            cache_dir: cache_root.join("vim").join("projectlocal"),
        }
    }

    /// Use an explicit cache directory (tests, `--cache-dir` override)
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        PluginPaths {
            cache_dir: cache_dir.into(),
        }
    }

    // Platform-conventional locations matching the original plugin, used only
    // when the home directory cannot be resolved through `directories`.
    fn fallback_cache_root() -> PathBuf {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        if cfg!(target_os = "macos") {
            home.join("Library").join("Caches")
        } else if cfg!(windows) {
            home.join("AppData").join("Temp")
        } else {
            home.join(".cache")
        }
    }

    /// Path of the persisted allowlist file
    pub fn allowlist_file(&self) -> PathBuf {
        self.cache_dir.join(ALLOWLIST_FILE)
    }

    /// Create the cache directory and an empty (`[]`) allowlist on first touch
    pub fn ensure(&self) -> Result<(), ProjectLocalError> {
        let cache_dir_err = |e: std::io::Error| ProjectLocalError::CacheDir {
            path: self.cache_dir.clone(),
            source: e,
        };

        std::fs::create_dir_all(&self.cache_dir).map_err(cache_dir_err)?;

        let allowlist = self.allowlist_file();
        if !allowlist.exists() {
            std::fs::write(&allowlist, "[]").map_err(cache_dir_err)?;
        }
        Ok(())
    }
}

impl Default for PluginPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_cache_dir_shape() {
        let paths = PluginPaths::new();
        assert!(paths.cache_dir.ends_with("vim/projectlocal"));
        assert!(paths.allowlist_file().ends_with("allowlist.json"));
    }

    #[test]
    fn test_ensure_creates_empty_allowlist() {
        let temp = TempDir::new().unwrap();
        let paths = PluginPaths::with_cache_dir(temp.path().join("nested").join("cache"));

        paths.ensure().unwrap();
        let content = std::fs::read_to_string(paths.allowlist_file()).unwrap();
        assert_eq!(content, "[]");

        // Second ensure does not clobber existing state
        std::fs::write(paths.allowlist_file(), "[{}]").unwrap();
        paths.ensure().unwrap();
        assert_eq!(
            std::fs::read_to_string(paths.allowlist_file()).unwrap(),
            "[{}]"
        );
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let paths = PluginPaths::with_cache_dir(temp.path().join("cache"));

        bootstrap(&paths).unwrap();
        assert!(paths.allowlist_file().exists());

        // Once the loaded flag is set, bootstrap no longer touches the disk
        std::fs::remove_file(paths.allowlist_file()).unwrap();
        bootstrap(&paths).unwrap();
        assert!(!paths.allowlist_file().exists());
    }
}
