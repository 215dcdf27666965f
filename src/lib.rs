//! # scripts
//!
//! Manage a directory of shell scripts and compile source files into
//! standalone binaries with the matching language toolchain.

pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod permissions;
pub mod process;
pub mod registry;
pub mod toolchain;

#[cfg(test)]
pub(crate) mod testing;

pub use error::AppError;

/// Print an error message and exit with code 1.
pub fn fatal_error(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}
