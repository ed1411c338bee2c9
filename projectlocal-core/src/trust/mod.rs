//! projectlocal trust system - content-addressed approval of project config files
//!
//! A config file is only sourced after the user approves it, and re-approval is
//! required whenever its content fingerprint changes. Approvals are persisted in
//! an allowlist keyed by project root.

pub mod allowlist;
pub mod engine;
pub mod hasher;

pub use allowlist::{Allowlist, AllowlistRecord};
pub use engine::{project_status, ProjectLocal, ProjectStatus};
