//! Plugin-wide user configuration and project config file discovery

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Candidate probe order: script, embedded-script, structured
const FORMAT_PRIORITY: [&str; 3] = ["vim", "lua", "json"];

/// Plugin-wide settings supplied by the host integration
///
/// Forwarded verbatim (as JSON) to embedded-script section handlers, so it
/// serializes with the field names the original Lua side expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserConfig {
    /// Emit an info message after a successful automatic load
    pub enable_messages: bool,

    /// Key into `root_files` used when creating a new config file
    pub default_root_file: String,

    /// Candidate config filenames, keyed by format
    pub root_files: BTreeMap<String, String>,

    /// If set, this filename is checked first and wins unconditionally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit_root_file: Option<String>,

    pub debug_mode: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        let mut root_files = BTreeMap::new();
        root_files.insert("json".to_string(), ".vimrc.json".to_string());
        root_files.insert("lua".to_string(), ".vimrc.lua".to_string());
        root_files.insert("vim".to_string(), ".vimrc".to_string());

        UserConfig {
            enable_messages: true,
            default_root_file: "json".to_string(),
            root_files,
            explicit_root_file: None,
            debug_mode: false,
        }
    }
}

/// Config file format, derived purely from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Vimscript,
    Lua,
    Json,
}

impl ConfigFormat {
    /// Classify a filename by extension; `.vimrc` counts as Vimscript
    pub fn from_path(path: &Path) -> Option<ConfigFormat> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".json") {
            Some(ConfigFormat::Json)
        } else if name.ends_with(".lua") {
            Some(ConfigFormat::Lua)
        } else if name.ends_with(".vim") || name.ends_with(".vimrc") {
            Some(ConfigFormat::Vimscript)
        } else {
            None
        }
    }
}

/// A discovered project config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFileReference {
    pub path: PathBuf,
    pub format: ConfigFormat,
}

impl ConfigFileReference {
    fn new(path: PathBuf) -> Option<Self> {
        let format = ConfigFormat::from_path(&path)?;
        Some(ConfigFileReference { path, format })
    }
}

/// Find the project config file under a project root
///
/// The explicit override filename, if configured and present, wins
/// unconditionally. Otherwise candidates are probed in priority order and the
/// first existing file wins. `None` means "no project config" - a normal,
/// expected state, not an error.
pub fn find_project_config(
    project_root: &Path,
    config: &UserConfig,
) -> Option<ConfigFileReference> {
    if let Some(name) = &config.explicit_root_file {
        let path = project_root.join(name);
        if path.exists() {
            return ConfigFileReference::new(path);
        }
    }

    for key in FORMAT_PRIORITY {
        if let Some(name) = config.root_files.get(key) {
            let path = project_root.join(name);
            if path.exists() {
                return ConfigFileReference::new(path);
            }
        }
    }

    None
}

/// Resolve the path a new config file of the given format would have
///
/// Used by the open command when no config file exists yet. Returns `None` for
/// a format key not present in `root_files`.
pub fn config_path_for_format(
    project_root: &Path,
    config: &UserConfig,
    format_key: Option<&str>,
) -> Option<PathBuf> {
    let key = format_key.unwrap_or(&config.default_root_file);
    config
        .root_files
        .get(key)
        .map(|name| project_root.join(name))
}
