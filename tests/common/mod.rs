//! Common test helpers shared across integration tests

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)] // Not all helpers are used by every test file

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Helper to get the compiled binary path
pub fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_scripts"))
}

/// A throwaway installation: `scripts_bin/`, `bin/` and a `.config.json`
/// pointing at them, all inside one temp directory.
pub struct Workspace {
    pub root: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("scripts_bin")).unwrap();
        fs::create_dir_all(root.path().join("bin")).unwrap();
        let config = serde_json::json!({
            "scriptDir": root.path().join("scripts_bin"),
            "binDir": root.path().join("bin"),
        });
        fs::write(
            root.path().join(".config.json"),
            serde_json::to_string_pretty(&config).unwrap(),
        )
        .unwrap();
        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn scripts_bin(&self) -> PathBuf {
        self.path().join("scripts_bin")
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.path().join("bin")
    }

    /// Create `<name>.sh` in the scripts directory with the given mode
    pub fn create_script(&self, name: &str, body: &str, mode: u32) -> PathBuf {
        let path = self.scripts_bin().join(format!("{name}.sh"));
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    /// Create a file in the binaries directory with the given mode
    pub fn create_binary(&self, name: &str, mode: u32) -> PathBuf {
        let path = self.bin_dir().join(name);
        fs::write(&path, "#!/bin/sh\necho binary\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    /// Command running the tool from inside the workspace, isolated from the
    /// user's home directory
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(get_binary_path());
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("Failed to execute command")
    }
}

/// Helper to check if a file has the owner execute bit
pub fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o100 != 0)
        .unwrap_or(false)
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Helper to check if Go is available on the system
pub fn is_go_available() -> bool {
    which::which("go").is_ok()
}
