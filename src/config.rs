//! Configuration file discovery, loading and saving.
//!
//! The config is a flat JSON object holding the scripts directory and the
//! binaries directory. It lives in `.config.json` inside a config directory
//! resolved from the executable location, the working directory, or the home
//! directory, in that order.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = ".config.json";

/// Subdirectory whose presence marks an installation directory.
pub const SCRIPTS_SUBDIR: &str = "scripts_bin";

const DEFAULT_SCRIPT_DIR: &str = "~/code/personal/scripts/scripts_bin";
const DEFAULT_BIN_DIR: &str = "~/opt/programs";

/// Where scripts and compiled binaries are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub script_dir: PathBuf,
    pub bin_dir: PathBuf,
}

impl Config {
    /// Default directories, tilde-expanded against `home`.
    #[must_use]
    pub fn defaults(home: Option<&Path>) -> Self {
        Self {
            script_dir: expand_tilde(Path::new(DEFAULT_SCRIPT_DIR), home),
            bin_dir: expand_tilde(Path::new(DEFAULT_BIN_DIR), home),
        }
    }

    fn expanded(self, home: Option<&Path>) -> Self {
        Self {
            script_dir: expand_tilde(&self.script_dir, home),
            bin_dir: expand_tilde(&self.bin_dir, home),
        }
    }
}

/// Get the user's home directory in a cross-platform way.
#[must_use]
pub fn get_home_dir() -> Option<PathBuf> {
    // Try HOME first (Unix-like systems)
    if let Some(home) = std::env::var_os("HOME") {
        return Some(PathBuf::from(home));
    }

    // Try USERPROFILE (Windows)
    if let Some(userprofile) = std::env::var_os("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }

    None
}

/// Replace a leading `~` component with `home`.
///
/// Paths without a leading tilde, or any path when `home` is unknown, are
/// returned unchanged.
#[must_use]
pub fn expand_tilde(path: &Path, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return path.to_path_buf();
    };
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home.to_path_buf(),
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Pick the directory that holds `.config.json`.
///
/// 1. the executable's directory, if it has a `scripts_bin` subdirectory
/// 2. the working directory, under the same condition
/// 3. `<home>/.config/scripts`
///
/// # Errors
///
/// Returns `AppError::Configuration` when none of the candidates apply.
pub fn resolve_config_dir(
    exe: Option<&Path>,
    cwd: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, AppError> {
    let exe_dir = exe.and_then(Path::parent);
    for candidate in [exe_dir, cwd].into_iter().flatten() {
        if candidate.join(SCRIPTS_SUBDIR).is_dir() {
            return Ok(candidate.to_path_buf());
        }
    }

    home.map(|home| home.join(".config").join("scripts"))
        .ok_or_else(|| AppError::Configuration("could not determine config directory".to_string()))
}

/// A resolved config file path plus the home directory used for tilde expansion.
#[derive(Debug, Clone)]
pub struct ConfigLocation {
    path: PathBuf,
    home: Option<PathBuf>,
}

impl ConfigLocation {
    /// Use an explicit config file path.
    #[must_use]
    pub fn at(path: PathBuf, home: Option<PathBuf>) -> Self {
        Self { path, home }
    }

    /// Resolve the config file from the running process.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` if no config directory can be found.
    pub fn discover() -> Result<Self, AppError> {
        let exe = std::env::current_exe().ok();
        let cwd = std::env::current_dir().ok();
        let home = get_home_dir();
        let dir = resolve_config_dir(exe.as_deref(), cwd.as_deref(), home.as_deref())?;
        Ok(Self::at(dir.join(CONFIG_FILE_NAME), home))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the config, creating it with default values when absent.
    ///
    /// A first run writes the file, so a read can mutate the filesystem.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` on read/write failure and `AppError::Parse` on
    /// malformed JSON.
    pub fn load(&self) -> Result<Config, AppError> {
        log::debug!("Using config file {}", self.path.display());

        if !self.path.exists() {
            let config = Config::defaults(self.home.as_deref());
            log::debug!("Config file missing, writing defaults");
            self.save(&config)?;
            return Ok(config);
        }

        let data = fs::read_to_string(&self.path).map_err(|e| {
            AppError::io(format!("failed to read config file {}", self.path.display()), e)
        })?;
        let config: Config = serde_json::from_str(&data).map_err(|source| AppError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(config.expanded(self.home.as_deref()))
    }

    /// Write the config as indented JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the directory or file cannot be written.
    pub fn save(&self, config: &Config) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::io(format!("failed to create config directory {}", parent.display()), e)
            })?;
        }

        let data = serde_json::to_string_pretty(config)
            .map_err(|e| AppError::Configuration(format!("failed to serialize config: {e}")))?;
        fs::write(&self.path, data).map_err(|e| {
            AppError::io(format!("failed to write config file {}", self.path.display()), e)
        })
    }
}
