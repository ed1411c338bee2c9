//! Host editor abstraction
//!
//! The core never talks to an editor directly. Everything the host supplies -
//! script execution, global variables, modal prompts, messages - goes through
//! this trait, and anything version-gated is queried up front via
//! [`Host::supports`] instead of being inferred from a failing call.

use anyhow::Result;
use std::fmt;
use std::path::Path;

/// A host feature the dispatcher may depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Executing a Vimscript file
    Vimscript,
    /// Executing embedded Lua (requires nvim 0.6+ on the original host)
    EmbeddedLua,
    /// Setting editor global variables
    GlobalVars,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Vimscript => write!(f, "Vimscript execution"),
            Capability::EmbeddedLua => write!(f, "embedded Lua (nvim 0.6+)"),
            Capability::GlobalVars => write!(f, "global variables"),
        }
    }
}

/// User answer to the first-time approval prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstTimeChoice {
    /// Approve and autoload from now on
    Approve,
    /// Decline and never prompt for this project again
    DeclineSilently,
    /// Open the config file for inspection, decide later
    OpenConfig,
    /// Decide next session
    Cancel,
}

/// User answer to the re-approval prompt after a content change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeChoice {
    Approve,
    Decline,
}

/// Capabilities supplied by the host editor integration
///
/// Prompts block until answered; the host confirm primitive is blocking by
/// contract, so no callback modeling is needed here.
pub trait Host {
    /// Check whether the host offers a capability
    fn supports(&self, capability: Capability) -> bool;

    /// Execute a script file natively (`:source` on the original host)
    fn execute_script(&self, path: &Path) -> Result<()>;

    /// Execute a snippet of embedded Lua
    fn execute_lua(&self, code: &str) -> Result<()>;

    /// Set an editor global variable (`g:` scope on the original host)
    fn set_global_var(&self, name: &str, value: &serde_json::Value) -> Result<()>;

    /// Register a buffer-local variable to be set for a filetype
    fn set_filetype_var(&self, filetype: &str, name: &str, value: &serde_json::Value)
        -> Result<()>;

    /// Ask for permission to include a newly discovered config file
    fn prompt_first_time(&self) -> FirstTimeChoice;

    /// Ask for permission to re-include a changed config file
    fn prompt_on_change(&self) -> ChangeChoice;

    /// Open a file in the editor
    fn edit_file(&self, path: &Path) -> Result<()>;

    fn show_info(&self, message: &str);
    fn show_warning(&self, message: &str);
    fn show_error(&self, message: &str);
}
