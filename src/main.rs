//! # scripts
//!
//! Manage and run shell scripts, and compile sources into binaries.
//!
//! ## Usage
//!
//! - Run a script: `scripts gitprune --dry-run`
//! - List scripts and binaries: `scripts list`
//! - Make scripts executable: `scripts ready myscript`, `scripts ready -a`
//! - Add a script: `scripts add ./path/to/script.sh`
//! - Compile a source file: `scripts compile main.go --name myapp`
//! - Remove: `scripts rm myscript`, `scripts rm --bin myapp`

/// Entry point for the CLI tool.
fn main() {
    scripts::cli::run_cli();
}
