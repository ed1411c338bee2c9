//! Trust decision engine
//!
//! Computes the per-project trust state fresh on every invocation - only
//! history is persisted, never a "current state" - and drives the allowlist
//! mutations and dispatches that each state transition calls for.

use crate::config::{
    config_path_for_format, find_project_config, ConfigFileReference, ConfigFormat, UserConfig,
};
use crate::error::ProjectLocalError;
use crate::host::{ChangeChoice, FirstTimeChoice, Host};
use crate::loader::{self, skeleton};
use crate::trust::allowlist::{Allowlist, AllowlistRecord};
use crate::trust::hasher::hash_string;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Trust state of a project root, computed fresh each invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    /// No config file in the project root; terminal for this session
    NotFound,
    /// A config file exists but the allowlist has no record for this root
    New,
    /// A record exists but its fingerprint differs from the current content
    Changed,
    /// Record exists, fingerprints match, not ignored
    TrustedUnchanged,
    /// Record exists, fingerprints match, user declined silently
    Ignored,
}

/// Classify a project against its allowlist record
///
/// Any fingerprint mismatch is `Changed`, never `New`: a record is only ever
/// created by an explicit user decision, so its presence always means the
/// project has been seen before.
pub fn project_status(record: Option<&AllowlistRecord>, current_digest: &str) -> ProjectStatus {
    match record {
        None => ProjectStatus::New,
        Some(r) if r.fingerprint != current_digest => ProjectStatus::Changed,
        Some(r) if r.ignored => ProjectStatus::Ignored,
        Some(_) => ProjectStatus::TrustedUnchanged,
    }
}

/// Discovery flow and host commands for one project root
pub struct ProjectLocal<'a> {
    host: &'a dyn Host,
    config: UserConfig,
    project_root: PathBuf,
    allowlist_path: PathBuf,
}

impl<'a> ProjectLocal<'a> {
    pub fn new(
        host: &'a dyn Host,
        config: UserConfig,
        project_root: impl Into<PathBuf>,
        allowlist_path: impl Into<PathBuf>,
    ) -> Self {
        ProjectLocal {
            host,
            config,
            project_root: project_root.into(),
            allowlist_path: allowlist_path.into(),
        }
    }

    /// Session-start flow: locate, classify, prompt or auto-source
    ///
    /// `NotFound` is the only silent outcome. Dispatch failures are reported
    /// through the host and never propagate; only trust-state errors do.
    pub fn discover(&self) -> Result<ProjectStatus, ProjectLocalError> {
        let Some(file) = self.locate() else {
            debug!("No project config in {}", self.project_root.display());
            return Ok(ProjectStatus::NotFound);
        };

        let digest = match self.current_digest(&file) {
            Ok(digest) => digest,
            Err(e @ ProjectLocalError::MissingFile { .. }) => {
                // Vanished between discovery and read; report and stand down
                self.host.show_error(&e.to_string());
                return Ok(ProjectStatus::NotFound);
            }
            Err(e) => return Err(e),
        };

        let mut allowlist = Allowlist::load(&self.allowlist_path)?;
        let status = project_status(allowlist.find_by_root(&self.project_root), &digest);
        debug!(
            "Project {} is {:?}",
            self.project_root.display(),
            status
        );

        match status {
            ProjectStatus::New => self.on_new(&mut allowlist, &file, digest)?,
            ProjectStatus::Changed => self.on_changed(&mut allowlist, &file, digest)?,
            ProjectStatus::TrustedUnchanged => {
                let autoload = allowlist
                    .find_by_root(&self.project_root)
                    .map(|r| r.autoload)
                    .unwrap_or(false);
                if autoload {
                    if self.source_checked(&file) && self.config.enable_messages {
                        self.host.show_info("Loaded project config file");
                    }
                } else {
                    debug!("Autoload disabled; waiting for an explicit load");
                }
            }
            ProjectStatus::Ignored => {
                debug!("Project is ignored; no prompt, no dispatch");
            }
            ProjectStatus::NotFound => unreachable!("status computed from an existing file"),
        }

        Ok(status)
    }

    /// Explicit manual load, available when autoload is off or the project is
    /// ignored; never mutates the allowlist
    pub fn load(&self) -> Result<(), ProjectLocalError> {
        let Some(file) = self.locate() else {
            self.host.show_info("No project config file found");
            return Ok(());
        };

        let allowlist = Allowlist::load(&self.allowlist_path)?;
        let autoload = allowlist
            .find_by_root(&self.project_root)
            .map(|r| r.autoload && !r.ignored)
            .unwrap_or(false);

        if autoload {
            debug!("Autoload already enabled; file is loaded on session start");
            return Ok(());
        }

        if self.source_checked(&file) {
            self.host.show_info("Manually loaded config file");
        }
        Ok(())
    }

    /// Turn on automatic sourcing for this project
    ///
    /// Flips only the `autoload` field; fingerprint and ignored are untouched
    /// and nothing is dispatched.
    pub fn autoload_enable(&self) -> Result<(), ProjectLocalError> {
        self.set_autoload(true)
    }

    /// Turn off automatic sourcing for this project
    pub fn autoload_disable(&self) -> Result<(), ProjectLocalError> {
        self.set_autoload(false)
    }

    fn set_autoload(&self, enabled: bool) -> Result<(), ProjectLocalError> {
        if self.locate().is_none() {
            self.host.show_info("No project config file found");
            return Ok(());
        }

        let mut allowlist = Allowlist::load(&self.allowlist_path)?;
        let Some(record) = allowlist.find_by_root(&self.project_root).cloned() else {
            self.host
                .show_warning("Project is not in the allowlist yet; open the editor to be prompted first");
            return Ok(());
        };

        if record.autoload == enabled {
            let state = if enabled { "enabled" } else { "disabled" };
            self.host
                .show_info(&format!("Autoload is already {state}"));
            return Ok(());
        }

        allowlist.upsert(AllowlistRecord {
            autoload: enabled,
            ..record
        });
        allowlist.save(&self.allowlist_path)?;

        if enabled {
            self.host
                .show_info("Enabled autoloading of the project config file");
        } else {
            self.host
                .show_info("Disabled autoloading of the project config file");
        }
        Ok(())
    }

    /// Open the project config file, creating it from a skeleton if absent
    pub fn open_config(&self, format_key: Option<&str>) -> Result<(), ProjectLocalError> {
        if let Some(file) = self.locate() {
            self.edit_checked(&file.path);
            return Ok(());
        }

        let Some(path) = config_path_for_format(&self.project_root, &self.config, format_key)
        else {
            self.host.show_error(&format!(
                "Unknown config format '{}'",
                format_key.unwrap_or(&self.config.default_root_file)
            ));
            return Ok(());
        };

        if let Some(format) = ConfigFormat::from_path(&path) {
            if let Err(e) = std::fs::write(&path, skeleton::skeleton_for(format)) {
                self.host
                    .show_error(&format!("Failed to create {}: {e}", path.display()));
                return Ok(());
            }
            info!("Created skeleton config at {}", path.display());
        }

        self.edit_checked(&path);
        Ok(())
    }

    // --- transitions ---------------------------------------------------

    fn on_new(
        &self,
        allowlist: &mut Allowlist,
        file: &ConfigFileReference,
        digest: String,
    ) -> Result<(), ProjectLocalError> {
        match self.host.prompt_first_time() {
            FirstTimeChoice::Approve => {
                allowlist.upsert(AllowlistRecord::approved(
                    self.project_root.clone(),
                    digest,
                ));
                allowlist.save(&self.allowlist_path)?;
                if self.source_checked(file) && self.config.enable_messages {
                    self.host.show_info("Loaded project config file");
                }
            }
            FirstTimeChoice::DeclineSilently => {
                allowlist.upsert(AllowlistRecord::ignored(self.project_root.clone(), digest));
                allowlist.save(&self.allowlist_path)?;
                self.host.show_info(
                    "You will not be prompted again, but you can still load the file manually",
                );
            }
            FirstTimeChoice::OpenConfig => {
                // Inspection only; the user decides next session
                self.edit_checked(&file.path);
            }
            FirstTimeChoice::Cancel => {
                self.host
                    .show_info("Ignoring for now; you will be prompted again next session");
            }
        }
        Ok(())
    }

    fn on_changed(
        &self,
        allowlist: &mut Allowlist,
        file: &ConfigFileReference,
        digest: String,
    ) -> Result<(), ProjectLocalError> {
        match self.host.prompt_on_change() {
            ChangeChoice::Approve => {
                // Re-approval replaces the whole record: the project is
                // trusted again regardless of how it was flagged before
                allowlist.upsert(AllowlistRecord::approved(
                    self.project_root.clone(),
                    digest,
                ));
                allowlist.save(&self.allowlist_path)?;
                if self.source_checked(file) && self.config.enable_messages {
                    self.host.show_info("Loaded project config file");
                }
            }
            ChangeChoice::Decline => {
                self.host
                    .show_info("Ignoring changes for now; you will be prompted again next session");
            }
        }
        Ok(())
    }

    // --- helpers -------------------------------------------------------

    fn locate(&self) -> Option<ConfigFileReference> {
        find_project_config(&self.project_root, &self.config)
    }

    fn current_digest(&self, file: &ConfigFileReference) -> Result<String, ProjectLocalError> {
        let content = std::fs::read_to_string(&file.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProjectLocalError::MissingFile {
                    path: file.path.clone(),
                }
            } else {
                ProjectLocalError::Source {
                    path: file.path.clone(),
                    message: e.to_string(),
                }
            }
        })?;
        Ok(hash_string(&content))
    }

    /// Dispatch with the boundary catch: every failure becomes one host
    /// message, and the session continues either way
    fn source_checked(&self, file: &ConfigFileReference) -> bool {
        match loader::source_file(self.host, &self.config, file) {
            Ok(()) => true,
            Err(e @ ProjectLocalError::UnsupportedHost { .. }) => {
                self.host.show_warning(&e.to_string());
                false
            }
            Err(e) => {
                self.host.show_error(&e.to_string());
                false
            }
        }
    }

    fn edit_checked(&self, path: &Path) {
        if let Err(e) = self.host.edit_file(path) {
            self.host
                .show_error(&format!("Failed to open {}: {e}", path.display()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fingerprint: &str, autoload: bool, ignored: bool) -> AllowlistRecord {
        AllowlistRecord {
            project_root: PathBuf::from("/p"),
            fingerprint: fingerprint.to_string(),
            autoload,
            ignored,
        }
    }

    #[test]
    fn test_status_new_without_record() {
        assert_eq!(project_status(None, "sha256:x"), ProjectStatus::New);
    }

    #[test]
    fn test_status_trusted_on_match() {
        let r = record("sha256:x", true, false);
        assert_eq!(
            project_status(Some(&r), "sha256:x"),
            ProjectStatus::TrustedUnchanged
        );
    }

    #[test]
    fn test_status_changed_on_any_mismatch() {
        let r = record("sha256:x", true, false);
        assert_eq!(project_status(Some(&r), "sha256:y"), ProjectStatus::Changed);

        // Empty-vs-nonempty is still Changed, never New
        let empty = record("", true, false);
        assert_eq!(
            project_status(Some(&empty), "sha256:y"),
            ProjectStatus::Changed
        );
    }

    #[test]
    fn test_status_ignored_requires_match() {
        let r = record("sha256:x", false, true);
        assert_eq!(project_status(Some(&r), "sha256:x"), ProjectStatus::Ignored);
        assert_eq!(project_status(Some(&r), "sha256:y"), ProjectStatus::Changed);
    }

    #[test]
    fn test_status_never_changed_when_fingerprint_matches() {
        for (autoload, ignored) in [(true, false), (false, false), (false, true)] {
            let r = record("sha256:same", autoload, ignored);
            assert_ne!(project_status(Some(&r), "sha256:same"), ProjectStatus::Changed);
        }
    }
}
