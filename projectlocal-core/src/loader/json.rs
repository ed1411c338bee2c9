//! Structured (JSON) config format
//!
//! The file carries a single `projectlocal` namespace holding independently
//! optional sections. Sections are validated and applied one at a time: a
//! malformed or unsupported section is warned about and skipped without
//! blocking the others. Unknown section keys are ignored for forward
//! compatibility.

use crate::config::UserConfig;
use crate::error::ProjectLocalError;
use crate::host::{Capability, Host};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

pub const NAMESPACE: &str = "projectlocal";

/// Recognized sections in application order, with the capability each needs
const SECTIONS: [(&str, Option<Capability>); 6] = [
    ("nvim-lsp", Some(Capability::EmbeddedLua)),
    ("globalVars", Some(Capability::GlobalVars)),
    ("ale", None),
    ("efmls", Some(Capability::EmbeddedLua)),
    ("diagnosticls", Some(Capability::EmbeddedLua)),
    ("null-ls", Some(Capability::EmbeddedLua)),
];

/// Language server registration: a bare server name or a full spec
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LspServer {
    Name(String),
    Spec(LspServerSpec),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LspServerSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<LspServerOptions>,
}

/// Server options forwarded to the embedded-lua LSP bridge as-is
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LspServerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_options: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filetypes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_file_support: Option<bool>,
}

/// ALE linter/fixer lists keyed by filetype
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AleSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linters: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixers: Option<BTreeMap<String, Vec<String>>>,
}

/// One tool or a list of tools
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolList {
    One(String),
    Many(Vec<String>),
}

/// Per-language linter/formatter selection (efmls, diagnosticls)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolChain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linter: Option<ToolList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<ToolList>,
}

/// Parse and apply a structured config file
///
/// Top-level parse failures are hard errors; anything below the namespace is
/// handled per section.
pub fn source_json(
    host: &dyn Host,
    config: &UserConfig,
    path: &Path,
) -> Result<(), ProjectLocalError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProjectLocalError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            ProjectLocalError::Source {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        }
    })?;

    let value: Value =
        serde_json::from_str(&content).map_err(|e| ProjectLocalError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;

    let Some(sections) = value.get(NAMESPACE) else {
        debug!(
            "No '{}' namespace in {}, nothing to apply",
            NAMESPACE,
            path.display()
        );
        return Ok(());
    };

    for (key, required) in SECTIONS {
        let Some(raw) = sections.get(key) else {
            continue;
        };

        if let Some(capability) = required {
            if !host.supports(capability) {
                host.show_warning(&format!(
                    "Section '{key}' requires {capability}; skipped"
                ));
                continue;
            }
        }

        if let Err(e) = apply_section(host, config, key, raw) {
            warn!("Section '{}' failed: {:#}", key, e);
            host.show_warning(&format!("Skipping section '{key}': {e}"));
        }
    }

    Ok(())
}

/// Validate a namespace payload without applying it
///
/// Returns one human-readable problem per section that would be skipped at
/// apply time. Unknown keys are not problems, matching the apply path.
pub fn validate_sections(sections: &Value) -> Vec<String> {
    let mut problems = Vec::new();

    for (key, _) in SECTIONS {
        let Some(raw) = sections.get(key) else {
            continue;
        };
        let result = match key {
            "nvim-lsp" => serde_json::from_value::<Vec<LspServer>>(raw.clone()).map(|_| ()),
            "globalVars" => {
                serde_json::from_value::<BTreeMap<String, Value>>(raw.clone()).map(|_| ())
            }
            "ale" => serde_json::from_value::<AleSection>(raw.clone()).map(|_| ()),
            "efmls" | "diagnosticls" => {
                serde_json::from_value::<BTreeMap<String, ToolChain>>(raw.clone()).map(|_| ())
            }
            "null-ls" => serde_json::from_value::<Vec<String>>(raw.clone()).map(|_| ()),
            _ => Ok(()),
        };
        if let Err(e) = result {
            problems.push(format!("section '{key}': {e}"));
        }
    }

    problems
}

fn apply_section(host: &dyn Host, config: &UserConfig, key: &str, raw: &Value) -> Result<()> {
    match key {
        "nvim-lsp" => {
            let servers: Vec<LspServer> = serde_json::from_value(raw.clone())?;
            apply_nvim_lsp(host, config, &servers)
        }
        "globalVars" => {
            let vars: BTreeMap<String, Value> = serde_json::from_value(raw.clone())?;
            apply_global_vars(host, &vars)
        }
        "ale" => {
            let ale: AleSection = serde_json::from_value(raw.clone())?;
            apply_ale(host, &ale)
        }
        "efmls" => {
            let tools: BTreeMap<String, ToolChain> = serde_json::from_value(raw.clone())?;
            apply_lua_bridge(host, config, "projectlocal.efmls", &tools)
        }
        "diagnosticls" => {
            let tools: BTreeMap<String, ToolChain> = serde_json::from_value(raw.clone())?;
            apply_lua_bridge(host, config, "projectlocal.diagnosticls", &tools)
        }
        "null-ls" => {
            let sources: Vec<String> = serde_json::from_value(raw.clone())?;
            apply_lua_bridge(host, config, "projectlocal.null-ls", &sources)
        }
        _ => Ok(()),
    }
}

/// Register language servers through the embedded-lua LSP bridge
fn apply_nvim_lsp(host: &dyn Host, config: &UserConfig, servers: &[LspServer]) -> Result<()> {
    if servers.is_empty() {
        return Ok(());
    }
    let context = serde_json::to_string(servers)?;
    let settings = serde_json::to_string(config)?;
    host.execute_lua(&format!(
        r#"require("projectlocal.lsp").register([=[{context}]=], [=[{settings}]=])"#
    ))
}

fn apply_global_vars(host: &dyn Host, vars: &BTreeMap<String, Value>) -> Result<()> {
    for (name, value) in vars {
        host.set_global_var(name, value)?;
    }
    Ok(())
}

/// ALE wires linters/fixers as buffer-local variables per filetype
fn apply_ale(host: &dyn Host, ale: &AleSection) -> Result<()> {
    if let Some(linters) = &ale.linters {
        for (filetype, tools) in linters {
            host.set_filetype_var(filetype, "ale_linters", &serde_json::json!(tools))?;
        }
    }
    if let Some(fixers) = &ale.fixers {
        for (filetype, tools) in fixers {
            host.set_filetype_var(filetype, "ale_fixers", &serde_json::json!(tools))?;
        }
    }
    Ok(())
}

/// Forward a section payload plus the plugin settings to an embedded-lua module
fn apply_lua_bridge<T: Serialize>(
    host: &dyn Host,
    config: &UserConfig,
    module: &str,
    payload: &T,
) -> Result<()> {
    let context = serde_json::to_string(payload)?;
    if context == "{}" || context == "[]" {
        return Ok(());
    }
    let settings = serde_json::to_string(config)?;
    host.execute_lua(&format!(
        r#"require("{module}").register([=[{context}]=], [=[{settings}]=])"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ChangeChoice, FirstTimeChoice};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Host that records every applied action, optionally failing global vars
    #[derive(Default)]
    struct RecordingHost {
        lua: RefCell<Vec<String>>,
        globals: RefCell<Vec<(String, Value)>>,
        filetype_vars: RefCell<Vec<(String, String, Value)>>,
        warnings: RefCell<Vec<String>>,
        without_lua: bool,
        fail_globals: bool,
    }

    impl Host for RecordingHost {
        fn supports(&self, capability: Capability) -> bool {
            match capability {
                Capability::EmbeddedLua => !self.without_lua,
                _ => true,
            }
        }

        fn execute_script(&self, _path: &Path) -> Result<()> {
            Ok(())
        }

        fn execute_lua(&self, code: &str) -> Result<()> {
            self.lua.borrow_mut().push(code.to_string());
            Ok(())
        }

        fn set_global_var(&self, name: &str, value: &Value) -> Result<()> {
            if self.fail_globals {
                anyhow::bail!("host refused variable '{name}'");
            }
            self.globals
                .borrow_mut()
                .push((name.to_string(), value.clone()));
            Ok(())
        }

        fn set_filetype_var(&self, filetype: &str, name: &str, value: &Value) -> Result<()> {
            self.filetype_vars.borrow_mut().push((
                filetype.to_string(),
                name.to_string(),
                value.clone(),
            ));
            Ok(())
        }

        fn prompt_first_time(&self) -> FirstTimeChoice {
            FirstTimeChoice::Cancel
        }

        fn prompt_on_change(&self) -> ChangeChoice {
            ChangeChoice::Decline
        }

        fn edit_file(&self, _path: &Path) -> Result<()> {
            Ok(())
        }

        fn show_info(&self, _message: &str) {}

        fn show_warning(&self, message: &str) {
            self.warnings.borrow_mut().push(message.to_string());
        }

        fn show_error(&self, _message: &str) {}
    }

    fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".vimrc.json");
        std::fs::write(&path, content).unwrap();
        (temp, path)
    }

    #[test]
    fn test_all_sections_applied() {
        let (_temp, path) = write_config(
            r#"{
              "projectlocal": {
                "globalVars": { "ale_fix_on_save": 1 },
                "nvim-lsp": ["pyright", { "name": "gopls", "config": { "filetypes": ["go"] } }],
                "ale": { "linters": { "python": ["flake8"] }, "fixers": { "python": ["black"] } },
                "efmls": { "python": { "linter": "flake8", "formatter": ["black"] } },
                "null-ls": ["prettier"]
              }
            }"#,
        );

        let host = RecordingHost::default();
        source_json(&host, &UserConfig::default(), &path).unwrap();

        assert_eq!(
            host.globals.borrow().as_slice(),
            &[("ale_fix_on_save".to_string(), serde_json::json!(1))]
        );
        assert_eq!(
            host.filetype_vars.borrow().as_slice(),
            &[
                (
                    "python".to_string(),
                    "ale_linters".to_string(),
                    serde_json::json!(["flake8"])
                ),
                (
                    "python".to_string(),
                    "ale_fixers".to_string(),
                    serde_json::json!(["black"])
                ),
            ]
        );

        let lua = host.lua.borrow();
        assert_eq!(lua.len(), 3); // nvim-lsp, efmls, null-ls
        assert!(lua[0].contains("projectlocal.lsp"));
        assert!(lua[0].contains("pyright"));
        assert!(lua[1].contains("projectlocal.efmls"));
        assert!(lua[2].contains("projectlocal.null-ls"));
        assert!(host.warnings.borrow().is_empty());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let (_temp, path) = write_config(
            r#"{
              "projectlocal": { "globalVars": { "x": true }, "futureSection": [1, 2] },
              "someOtherTool": { "ignored": true }
            }"#,
        );

        let host = RecordingHost::default();
        source_json(&host, &UserConfig::default(), &path).unwrap();
        assert_eq!(host.globals.borrow().len(), 1);
        assert!(host.warnings.borrow().is_empty());
    }

    #[test]
    fn test_missing_namespace_is_a_no_op() {
        let (_temp, path) = write_config(r#"{ "unrelated": {} }"#);

        let host = RecordingHost::default();
        source_json(&host, &UserConfig::default(), &path).unwrap();
        assert!(host.lua.borrow().is_empty());
        assert!(host.globals.borrow().is_empty());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let (_temp, path) = write_config("{ nope");

        let host = RecordingHost::default();
        let result = source_json(&host, &UserConfig::default(), &path);
        assert!(matches!(
            result,
            Err(ProjectLocalError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_missing_file_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".vimrc.json");

        let host = RecordingHost::default();
        let result = source_json(&host, &UserConfig::default(), &path);
        assert!(matches!(
            result,
            Err(ProjectLocalError::MissingFile { .. })
        ));
    }

    #[test]
    fn test_bad_section_does_not_block_others() {
        let (_temp, path) = write_config(
            r#"{
              "projectlocal": {
                "nvim-lsp": { "not": "an array" },
                "globalVars": { "works": "yes" }
              }
            }"#,
        );

        let host = RecordingHost::default();
        source_json(&host, &UserConfig::default(), &path).unwrap();

        assert_eq!(host.globals.borrow().len(), 1);
        let warnings = host.warnings.borrow();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("nvim-lsp"));
    }

    #[test]
    fn test_failing_section_isolated() {
        let (_temp, path) = write_config(
            r#"{
              "projectlocal": {
                "globalVars": { "refused": 1 },
                "ale": { "linters": { "rust": ["clippy"] } }
              }
            }"#,
        );

        let host = RecordingHost {
            fail_globals: true,
            ..RecordingHost::default()
        };
        source_json(&host, &UserConfig::default(), &path).unwrap();

        // globalVars failed and warned, ale still ran
        assert_eq!(host.warnings.borrow().len(), 1);
        assert_eq!(host.filetype_vars.borrow().len(), 1);
    }

    #[test]
    fn test_lua_sections_gated_on_capability() {
        let (_temp, path) = write_config(
            r#"{
              "projectlocal": {
                "nvim-lsp": ["pyright"],
                "globalVars": { "still_applied": true }
              }
            }"#,
        );

        let host = RecordingHost {
            without_lua: true,
            ..RecordingHost::default()
        };
        source_json(&host, &UserConfig::default(), &path).unwrap();

        assert!(host.lua.borrow().is_empty());
        assert_eq!(host.globals.borrow().len(), 1);
        let warnings = host.warnings.borrow();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("nvim-lsp"));
        assert!(warnings[0].contains("Lua"));
    }

    #[test]
    fn test_validate_sections_reports_shape_problems() {
        let sections = serde_json::json!({
            "nvim-lsp": { "not": "an array" },
            "globalVars": { "fine": 1 },
            "null-ls": "not a list",
            "futureSection": 42
        });

        let problems = validate_sections(&sections);
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().any(|p| p.contains("nvim-lsp")));
        assert!(problems.iter().any(|p| p.contains("null-ls")));
    }

    #[test]
    fn test_empty_bridge_sections_skipped() {
        let (_temp, path) = write_config(
            r#"{ "projectlocal": { "efmls": {}, "null-ls": [] } }"#,
        );

        let host = RecordingHost::default();
        source_json(&host, &UserConfig::default(), &path).unwrap();
        assert!(host.lua.borrow().is_empty());
    }
}
