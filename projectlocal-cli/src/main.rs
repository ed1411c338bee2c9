//! projectlocal - manage and load trusted per-project editor configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use projectlocal_core::config::find_project_config;
use projectlocal_core::loader::json;
use projectlocal_core::paths::PluginPaths;
use projectlocal_core::{ConfigFormat, ProjectLocal, UserConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod allowlist_cli;
mod console;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "projectlocal",
    about = "Safely source per-project editor configuration files",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Project directory (default: current directory)
    #[clap(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Override the cache directory holding the allowlist
    #[clap(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Log level (defaults to warn; RUST_LOG overrides)
    #[clap(long, global = true, value_enum)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the session-start discovery flow for this project
    Discover,

    /// Manually load the project config file (works when autoload is off)
    Load,

    /// Enable autoloading of the project config file
    Enable,

    /// Disable autoloading of the project config file
    Disable,

    /// Open the project config file, creating it from a skeleton if absent
    Open {
        /// Config format to create when none exists (vim, lua, json)
        #[clap(long)]
        format: Option<String>,
    },

    /// Validate the project config file without applying it
    Check,

    /// Inspect or maintain the allowlist
    Allowlist {
        #[clap(subcommand)]
        command: allowlist_cli::AllowlistCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let project_root = cli
        .project_dir
        .canonicalize()
        .with_context(|| format!("Invalid project directory: {}", cli.project_dir.display()))?;

    let paths = match &cli.cache_dir {
        Some(dir) => PluginPaths::with_cache_dir(dir.clone()),
        None => PluginPaths::new(),
    };
    projectlocal_core::paths::bootstrap(&paths)?;
    let allowlist_path = paths.allowlist_file();

    let host = console::ConsoleHost::new();
    let engine = ProjectLocal::new(
        &host,
        UserConfig::default(),
        project_root.clone(),
        allowlist_path.clone(),
    );

    match &cli.command {
        Command::Discover => {
            engine.discover()?;
        }
        Command::Load => engine.load()?,
        Command::Enable => engine.autoload_enable()?,
        Command::Disable => engine.autoload_disable()?,
        Command::Open { format } => engine.open_config(format.as_deref())?,
        Command::Check => check(&project_root)?,
        Command::Allowlist { command } => command.execute(&allowlist_path, &project_root)?,
    }

    Ok(())
}

fn init_logging(cli: &Cli) {
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level.to_filter_directive()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse the structured config and report schema problems section by section
fn check(project_root: &Path) -> Result<()> {
    let Some(file) = find_project_config(project_root, &UserConfig::default()) else {
        println!("No project config file found in {}", project_root.display());
        return Ok(());
    };

    match file.format {
        ConfigFormat::Vimscript | ConfigFormat::Lua => {
            println!(
                "{} is a script-format config; nothing to validate here",
                file.path.display()
            );
            return Ok(());
        }
        ConfigFormat::Json => {}
    }

    let content = std::fs::read_to_string(&file.path)
        .with_context(|| format!("Failed to read {}", file.path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", file.path.display()))?;

    let Some(sections) = value.get(json::NAMESPACE) else {
        println!(
            "{} has no '{}' namespace; nothing would be applied",
            file.path.display(),
            json::NAMESPACE
        );
        return Ok(());
    };

    let problems = json::validate_sections(sections);
    if problems.is_empty() {
        println!("{} is valid", file.path.display());
    } else {
        println!("{} has problems:", file.path.display());
        for problem in &problems {
            println!("  - {problem}");
        }
    }
    Ok(())
}
