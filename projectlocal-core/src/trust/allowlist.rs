//! Persisted allowlist of approved project config files
//!
//! The allowlist is a JSON array of records keyed by project root. It is the
//! source of truth for which projects may be sourced and whether sourcing is
//! automatic. A malformed file is surfaced as [`ProjectLocalError::CorruptState`]
//! rather than silently discarded - discarding trust state would change the
//! security behavior of every recorded project.

use crate::error::ProjectLocalError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Trust record for a single project root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowlistRecord {
    /// Absolute path of the project directory, unique key within the store
    pub project_root: PathBuf,

    /// Content fingerprint of the config file at last approval
    pub fingerprint: String,

    /// Source without prompting on future sessions
    pub autoload: bool,

    /// User explicitly declined; suppresses prompting and autoload
    pub ignored: bool,
}

impl AllowlistRecord {
    /// Record for a freshly approved config file
    pub fn approved(project_root: PathBuf, fingerprint: String) -> Self {
        AllowlistRecord {
            project_root,
            fingerprint,
            autoload: true,
            ignored: false,
        }
    }

    /// Record for a config file the user declined silently
    pub fn ignored(project_root: PathBuf, fingerprint: String) -> Self {
        AllowlistRecord {
            project_root,
            fingerprint,
            autoload: false,
            ignored: true,
        }
    }
}

/// Ordered collection of allowlist records with file persistence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    records: Vec<AllowlistRecord>,
}

impl Allowlist {
    /// Load the allowlist from disk
    ///
    /// A missing or empty backing file is a normal first-run state and yields
    /// an empty list. Anything unparseable is a corrupt-state error.
    pub fn load(path: &Path) -> Result<Self, ProjectLocalError> {
        if !path.exists() {
            debug!("No allowlist file at {}, starting empty", path.display());
            return Ok(Allowlist::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ProjectLocalError::StoreRead {
                path: path.to_path_buf(),
                source: e,
            })?;

        if content.trim().is_empty() {
            return Ok(Allowlist::default());
        }

        let records: Vec<AllowlistRecord> = serde_json::from_str(&content).map_err(|e| {
            ProjectLocalError::CorruptState {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        Ok(Allowlist { records })
    }

    /// Save the allowlist to disk, replacing the previous content atomically
    ///
    /// Writes to a temporary file in the same directory and renames it over the
    /// target so a reader never observes a half-written state.
    pub fn save(&self, path: &Path) -> Result<(), ProjectLocalError> {
        let store_write = |e: std::io::Error| ProjectLocalError::StoreWrite {
            path: path.to_path_buf(),
            source: e,
        };

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(store_write)?;

        let json = serde_json::to_string_pretty(&self.records).map_err(|e| {
            ProjectLocalError::StoreWrite {
                path: path.to_path_buf(),
                source: std::io::Error::other(e),
            }
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(store_write)?;
        tmp.write_all(json.as_bytes()).map_err(store_write)?;
        tmp.persist(path)
            .map_err(|e| store_write(e.error))?;

        debug!(
            "Saved allowlist with {} record(s) to {}",
            self.records.len(),
            path.display()
        );
        Ok(())
    }

    /// Exact-match lookup by project root
    ///
    /// The store invariant guarantees at most one match, but if a repaired or
    /// hand-edited file contains duplicates the first one wins.
    pub fn find_by_root(&self, project_root: &Path) -> Option<&AllowlistRecord> {
        self.records
            .iter()
            .find(|r| r.project_root == project_root)
    }

    /// Replace the record with a matching project root, or append if absent
    ///
    /// All other records are preserved unchanged and in place.
    pub fn upsert(&mut self, record: AllowlistRecord) {
        match self
            .records
            .iter_mut()
            .find(|r| r.project_root == record.project_root)
        {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Remove the record for a project root; returns true if one was removed
    pub fn remove(&mut self, project_root: &Path) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.project_root != project_root);
        self.records.len() != before
    }

    pub fn records(&self) -> &[AllowlistRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
