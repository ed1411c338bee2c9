//! Error types for the projectlocal core with clear, actionable messages

use crate::host::Capability;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the allowlist store, decision engine and dispatcher
#[derive(Error, Debug)]
pub enum ProjectLocalError {
    /// Failed to read the persisted allowlist
    #[error("Failed to read allowlist from {path}")]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted allowlist exists but is not valid JSON / schema
    #[error("Allowlist file is corrupted: {path}\n\nThe trust state could not be parsed and has NOT been discarded.\nInspect the file and repair or remove it, then run discovery again.")]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write the persisted allowlist
    #[error("Failed to write allowlist to {path}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The structured config file is malformed
    #[error("Failed to parse project config file: {path}\n\nCheck the file for JSON syntax errors and try again.")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The host failed while executing or applying a config file
    #[error("Failed to source {path}: {message}\n\nCheck the file for syntax errors.")]
    Source { path: PathBuf, message: String },

    /// The host lacks a capability required by the config file
    #[error("The current host does not support {capability}; skipped")]
    UnsupportedHost { capability: Capability },

    /// The config file vanished between discovery and dispatch
    #[error("Project config file no longer exists: {path}")]
    MissingFile { path: PathBuf },

    /// Failed to prepare the cache directory backing the store
    #[error("Failed to prepare cache directory {path}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
