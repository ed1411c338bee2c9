//! Allowlist maintenance commands: list, remove, reset

use anyhow::Result;
use clap::Parser;
use projectlocal_core::Allowlist;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

#[derive(Parser, Debug)]
pub enum AllowlistCommand {
    /// List all recorded projects and their trust state
    List {
        /// Show full fingerprints
        #[clap(long)]
        hashes: bool,
    },

    /// Remove the record for the current project
    Remove,

    /// Delete every record in the allowlist
    Reset {
        /// Skip confirmation prompt
        #[clap(long)]
        force: bool,
    },
}

#[derive(Tabled)]
struct AllowlistRow {
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Fingerprint")]
    fingerprint: String,
    #[tabled(rename = "Autoload")]
    autoload: bool,
    #[tabled(rename = "Ignored")]
    ignored: bool,
}

impl AllowlistCommand {
    pub fn execute(&self, allowlist_path: &Path, project_root: &Path) -> Result<()> {
        match self {
            AllowlistCommand::List { hashes } => list(allowlist_path, *hashes),
            AllowlistCommand::Remove => remove(allowlist_path, project_root),
            AllowlistCommand::Reset { force } => reset(allowlist_path, *force),
        }
    }
}

fn list(allowlist_path: &Path, hashes: bool) -> Result<()> {
    let allowlist = Allowlist::load(allowlist_path)?;

    if allowlist.is_empty() {
        println!("Allowlist is empty");
        return Ok(());
    }

    let rows: Vec<AllowlistRow> = allowlist
        .records()
        .iter()
        .map(|r| AllowlistRow {
            project: r.project_root.display().to_string(),
            fingerprint: if hashes {
                r.fingerprint.clone()
            } else {
                shorten(&r.fingerprint)
            },
            autoload: r.autoload,
            ignored: r.ignored,
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}

fn remove(allowlist_path: &Path, project_root: &Path) -> Result<()> {
    let mut allowlist = Allowlist::load(allowlist_path)?;

    if allowlist.remove(project_root) {
        allowlist.save(allowlist_path)?;
        println!(
            "Removed {} from the allowlist; you will be prompted again next session",
            project_root.display()
        );
    } else {
        println!("{} is not in the allowlist", project_root.display());
    }
    Ok(())
}

fn reset(allowlist_path: &Path, force: bool) -> Result<()> {
    let allowlist = Allowlist::load(allowlist_path)?;
    if allowlist.is_empty() {
        println!("Allowlist is already empty");
        return Ok(());
    }

    if !force {
        print!(
            "Remove all {} record(s) from the allowlist? [y/N] ",
            allowlist.records().len()
        );
        use std::io::Write;
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled");
            return Ok(());
        }
    }

    Allowlist::default().save(allowlist_path)?;
    println!("Allowlist reset");
    Ok(())
}

/// Keep the digest prefix plus a short excerpt for display
fn shorten(fingerprint: &str) -> String {
    match fingerprint.split_once(':') {
        Some((scheme, hex)) if hex.len() > 12 => format!("{scheme}:{}…", &hex[..12]),
        _ => fingerprint.to_string(),
    }
}
