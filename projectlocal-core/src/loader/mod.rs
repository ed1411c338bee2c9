//! Format dispatcher
//!
//! Routes a trusted, up-to-date config file to the right interpreter: script
//! formats go wholesale to the host's native execution, the structured format
//! is parsed and applied section by section.

pub mod json;
pub mod skeleton;

use crate::config::{ConfigFileReference, ConfigFormat, UserConfig};
use crate::error::ProjectLocalError;
use crate::host::{Capability, Host};
use tracing::debug;

/// Apply a config file through the host
///
/// Errors here never abort the session; callers catch them at the dispatch
/// boundary and turn them into a single user-visible message.
pub fn source_file(
    host: &dyn Host,
    config: &UserConfig,
    file: &ConfigFileReference,
) -> Result<(), ProjectLocalError> {
    debug!("Sourcing {} ({:?})", file.path.display(), file.format);

    match file.format {
        ConfigFormat::Vimscript => {
            if !host.supports(Capability::Vimscript) {
                return Err(ProjectLocalError::UnsupportedHost {
                    capability: Capability::Vimscript,
                });
            }
            execute_native(host, file)
        }
        ConfigFormat::Lua => {
            // Version gate, checked up front rather than attempted and caught
            if !host.supports(Capability::EmbeddedLua) {
                return Err(ProjectLocalError::UnsupportedHost {
                    capability: Capability::EmbeddedLua,
                });
            }
            execute_native(host, file)
        }
        ConfigFormat::Json => json::source_json(host, config, &file.path),
    }
}

fn execute_native(
    host: &dyn Host,
    file: &ConfigFileReference,
) -> Result<(), ProjectLocalError> {
    if !file.path.exists() {
        return Err(ProjectLocalError::MissingFile {
            path: file.path.clone(),
        });
    }

    host.execute_script(&file.path)
        .map_err(|e| ProjectLocalError::Source {
            path: file.path.clone(),
            message: e.to_string(),
        })
}
