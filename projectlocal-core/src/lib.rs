//! projectlocal-core library exports

pub mod config;
pub mod error;
pub mod host;
pub mod loader;
pub mod paths;
pub mod trust;

pub use config::{ConfigFileReference, ConfigFormat, UserConfig};
pub use error::ProjectLocalError;
pub use host::{Capability, ChangeChoice, FirstTimeChoice, Host};
pub use trust::allowlist::{Allowlist, AllowlistRecord};
pub use trust::engine::{ProjectLocal, ProjectStatus};
