//! Terminal host adapter
//!
//! Implements the core's `Host` trait against stdin/stdout. Script execution
//! is a dry run: the console is not attached to an editor, so sourcing prints
//! what would be applied instead of applying it. Embedded Lua is reported as
//! unsupported so those sections exercise the normal warn-and-skip path.

use anyhow::Result;
use projectlocal_core::{Capability, ChangeChoice, FirstTimeChoice, Host};
use serde_json::Value;
use std::io::Write;
use std::path::Path;

const PREFIX: &str = "[projectlocal]";

#[derive(Debug, Default)]
pub struct ConsoleHost;

impl ConsoleHost {
    pub fn new() -> Self {
        ConsoleHost
    }

    fn ask(&self, prompt: &str) -> String {
        print!("{PREFIX} {prompt} ");
        let _ = std::io::stdout().flush();

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err() {
            return String::new();
        }
        input.trim().to_lowercase()
    }
}

impl Host for ConsoleHost {
    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Vimscript => true,
            Capability::EmbeddedLua => false,
            Capability::GlobalVars => true,
        }
    }

    fn execute_script(&self, path: &Path) -> Result<()> {
        println!("{PREFIX} (dry run) would source {}", path.display());
        Ok(())
    }

    fn execute_lua(&self, code: &str) -> Result<()> {
        println!("{PREFIX} (dry run) would run lua: {code}");
        Ok(())
    }

    fn set_global_var(&self, name: &str, value: &Value) -> Result<()> {
        println!("{PREFIX} (dry run) would set g:{name} = {value}");
        Ok(())
    }

    fn set_filetype_var(&self, filetype: &str, name: &str, value: &Value) -> Result<()> {
        println!("{PREFIX} (dry run) would set b:{name} = {value} for filetype {filetype}");
        Ok(())
    }

    fn prompt_first_time(&self) -> FirstTimeChoice {
        println!("{PREFIX} New project config file found, include it?");
        let answer =
            self.ask("y = Yes (always), n = No (do not prompt again), o = Open config, c = Cancel [c]:");
        match answer.as_str() {
            "y" | "yes" => FirstTimeChoice::Approve,
            "n" | "no" => FirstTimeChoice::DeclineSilently,
            "o" | "open" => FirstTimeChoice::OpenConfig,
            _ => FirstTimeChoice::Cancel,
        }
    }

    fn prompt_on_change(&self) -> ChangeChoice {
        println!("{PREFIX} Project config file changed, re-include changes?");
        let answer = self.ask("y = Yes, n = No [n]:");
        match answer.as_str() {
            "y" | "yes" => ChangeChoice::Approve,
            _ => ChangeChoice::Decline,
        }
    }

    fn edit_file(&self, path: &Path) -> Result<()> {
        if let Some(editor) = std::env::var_os("EDITOR") {
            let status = std::process::Command::new(&editor).arg(path).status()?;
            if !status.success() {
                anyhow::bail!("{} exited with {status}", editor.to_string_lossy());
            }
        } else {
            println!("{PREFIX} Open {} in your editor", path.display());
        }
        Ok(())
    }

    fn show_info(&self, message: &str) {
        println!("{PREFIX} {message}");
    }

    fn show_warning(&self, message: &str) {
        eprintln!("{PREFIX} Warning: {message}");
    }

    fn show_error(&self, message: &str) {
        eprintln!("{PREFIX} Error: {message}");
    }
}
