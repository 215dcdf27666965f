//! CLI module containing the main entry point logic.
//!
//! The first token picks the command; anything that is not a known command is
//! treated as the name of a script to run.

use crate::config::{self, Config, ConfigLocation};
use crate::error::AppError;
use crate::process::{ProcessRunner, SystemProcessRunner};
use crate::registry::{self, ReadyStatus, ScriptEntry};
use crate::{executor, toolchain};
use clap::{ArgGroup, Parser as ClapParser, Subcommand};
use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

const AFTER_HELP: &str = "\
Run a script:
  scripts <script_name> [args...]    Run <scriptDir>/<script_name>.sh

Examples:
  scripts gitprune --dry-run         Run gitprune.sh with arguments
  scripts ready -a                   Make every script executable
  scripts compile main.go -n myapp   Compile Go program to a binary named myapp
  scripts rm --bin myapp             Remove the myapp binary

Supported compile targets: Go, Python (PyInstaller), V, Rust, C, C++
Use 'scripts ready' if a script reports 'permission denied'.";

/// CLI arguments for the scripts tool.
#[derive(ClapParser, Debug)]
#[command(name = "scripts")]
#[command(version = PKG_VERSION)]
#[command(about = "Manage and run shell scripts and compile sources into binaries", long_about = None)]
#[command(arg_required_else_help = true)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Config file to use instead of the discovered .config.json
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print debug logging to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available scripts and binaries
    List,

    /// Make scripts in the scripts directory executable
    #[command(group(ArgGroup::new("target").required(true).args(["name", "all"])))]
    Ready {
        /// Script to make executable (with or without .sh)
        name: Option<String>,

        /// Make every .sh file in the scripts directory executable
        #[arg(short, long)]
        all: bool,
    },

    /// Copy a .sh file into the scripts directory and make it executable
    Add {
        /// Path to the script to copy
        path: PathBuf,
    },

    /// Compile a source file to a binary in the binaries directory
    Compile {
        /// Source file (.go, .py, .v, .rs, .c, .cpp, .cc, .cxx)
        source: PathBuf,

        /// Binary name (default: source file name without extension)
        #[arg(short, long, value_name = "BINARY")]
        name: Option<String>,
    },

    /// Remove a script, or a compiled binary with --bin
    Rm {
        /// Script or binary name
        name: String,

        /// Remove a binary from the binaries directory
        #[arg(short, long)]
        bin: bool,
    },

    /// Run a script from the scripts directory
    #[command(external_subcommand)]
    Run(Vec<OsString>),
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Main CLI logic.
///
/// Prints errors as `Error: ...` and exits with status 1 on any failure.
pub fn run_cli() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and succeed; usage errors exit 1.
            let code = i32::from(e.use_stderr());
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        crate::fatal_error(&format!("Error: {e}"));
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let location = match cli.config {
        Some(path) => ConfigLocation::at(path, config::get_home_dir()),
        None => ConfigLocation::discover()?,
    };
    let config = location.load()?;
    execute(cli.command, &config, &SystemProcessRunner)
}

fn execute(command: Command, config: &Config, runner: &dyn ProcessRunner) -> Result<(), AppError> {
    match command {
        Command::List => {
            let scripts = registry::list_scripts(&config.script_dir)?;
            let binaries = registry::list_binaries(&config.bin_dir)?;
            print!("{}", render_listing(config, &scripts, &binaries));
        }
        Command::Ready { all: true, .. } => ready_all(&config.script_dir)?,
        Command::Ready { name: Some(name), .. } => {
            let name = registry::script_name(&name);
            match registry::ready_single(&config.script_dir, name)? {
                ReadyStatus::MadeExecutable => println!("Made {name} executable"),
                ReadyStatus::AlreadyExecutable => println!("{name} is already executable"),
            }
        }
        Command::Ready { name: None, all: false } => {
            return Err(AppError::Usage(
                "Usage: scripts ready <script_name> | -a".to_string(),
            ));
        }
        Command::Add { path } => {
            let dest = registry::add(&path, &config.script_dir)?;
            println!("Added {} to {}", file_name(&dest), config.script_dir.display());
        }
        Command::Compile { source, name } => {
            let output = toolchain::compile(runner, &source, name.as_deref(), &config.bin_dir)?;
            println!("Compiled {} to {}", source.display(), output.display());
        }
        Command::Rm { name, bin: true } => {
            registry::remove_binary(&config.bin_dir, &name)?;
            println!("Removed binary {name}");
        }
        Command::Rm { name, bin: false } => {
            registry::remove_script(&config.script_dir, &name)?;
            println!("Removed script {name}");
        }
        Command::Run(tokens) => {
            let Some((name, args)) = tokens.split_first() else {
                return Err(AppError::Usage("missing script name".to_string()));
            };
            executor::run_script(runner, &config.script_dir, &name.to_string_lossy(), args)?;
        }
    }
    Ok(())
}

fn ready_all(script_dir: &Path) -> Result<(), AppError> {
    let reports = registry::ready_all(script_dir)?;
    if reports.is_empty() {
        println!("No scripts found in {}", script_dir.display());
    }
    for report in reports {
        match report.status {
            ReadyStatus::AlreadyExecutable => {
                println!("{} is already executable", report.file_name);
            }
            ReadyStatus::MadeExecutable => println!("Making {} executable", report.file_name),
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Format the `list` output.
fn render_listing(config: &Config, scripts: &[ScriptEntry], binaries: &[String]) -> String {
    let mut out = String::new();

    if !scripts.is_empty() {
        out.push_str("Available scripts:\n");
        for script in scripts {
            let status = if script.executable {
                "executable"
            } else {
                "not executable"
            };
            let _ = writeln!(out, "  {} ({status})", script.name);
        }
    }

    if !binaries.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "Available binaries ({}):", config.bin_dir.display());
        for binary in binaries {
            let _ = writeln!(out, "  {binary}");
        }
    }

    if out.is_empty() {
        out.push_str("No scripts or binaries found.\n");
        let _ = writeln!(out, "Scripts directory: {}", config.script_dir.display());
        let _ = writeln!(out, "Binaries directory: {}", config.bin_dir.display());
    }

    out
}
