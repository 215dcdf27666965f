//! Error type shared by every command.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// What kind of registry entry an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Script,
    Binary,
    Source,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Script => "Script",
            Self::Binary => "Binary",
            Self::Source => "Source file",
        };
        f.write_str(label)
    }
}

/// Library-wide error type for scripts operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// A named script or binary is missing from its directory.
    #[error("{kind} {name} not found in {}", dir.display())]
    NotFound {
        kind: EntryKind,
        name: String,
        dir: PathBuf,
    },

    /// A path given on the command line does not exist.
    #[error("{kind} {} not found", path.display())]
    PathNotFound { kind: EntryKind, path: PathBuf },

    /// Script exists but the owner execute bit is unset.
    #[error("Script {0} is not executable. Run 'scripts ready {0}' to make it executable.")]
    NotExecutable(String),

    /// Compile target extension has no toolchain.
    #[error("unsupported file extension: {0:?}")]
    UnsupportedExtension(String),

    /// Only `.sh` files can be added to the scripts directory.
    #[error("script must have .sh extension: {}", .0.display())]
    NotShellScript(PathBuf),

    /// Filesystem failure with a short description of what was attempted.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Config file exists but is not valid JSON for [`crate::config::Config`].
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// External toolchain could not be spawned or exited unsuccessfully.
    #[error("{toolchain} compilation failed: {details}")]
    Compilation { toolchain: String, details: String },

    /// A script ran but did not succeed.
    #[error("script {name} failed: {details}")]
    ScriptFailed { name: String, details: String },

    /// Malformed command line.
    #[error("{0}")]
    Usage(String),

    /// Environment does not allow locating the config file.
    #[error("{0}")]
    Configuration(String),
}

impl AppError {
    pub fn io<S: Into<String>>(context: S, source: io::Error) -> Self {
        AppError::Io { context: context.into(), source }
    }

    /// True for both the named-entry and the path flavour of "not found".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. } | AppError::PathNotFound { .. })
    }
}
