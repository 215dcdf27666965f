//! Operations over the scripts directory and the binaries directory.

use crate::error::{AppError, EntryKind};
use crate::permissions::{is_executable, set_executable};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extension every managed script carries.
pub const SCRIPT_EXTENSION: &str = "sh";

/// File name of this tool, hidden from binary listings.
const SELF_BINARY_NAME: &str = "scripts";

/// A `.sh` file in the scripts directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    /// File name without the `.sh` extension.
    pub name: String,
    pub executable: bool,
}

/// Outcome of making a single script executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyStatus {
    AlreadyExecutable,
    MadeExecutable,
}

/// Per-file line of a `ready --all` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyReport {
    pub file_name: String,
    pub status: ReadyStatus,
}

/// Strip a trailing `.sh` so `ready deploy` and `ready deploy.sh` name the
/// same script.
#[must_use]
pub fn script_name(name: &str) -> &str {
    name.strip_suffix(".sh").unwrap_or(name)
}

/// Path of the script called `name` inside `dir`: always `<dir>/<name>.sh`.
#[must_use]
pub fn script_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{SCRIPT_EXTENSION}"))
}

/// A bare `.sh` has no stem, so it is not a script.
fn has_script_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION)
}

/// Read a directory, treating a missing directory as empty.
fn read_dir_entries(dir: &Path) -> Result<Vec<fs::DirEntry>, AppError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(AppError::io(format!("failed to read {}", dir.display()), e)),
    };
    let mut entries = entries
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::io(format!("failed to read {}", dir.display()), e))?;
    entries.sort_by_key(fs::DirEntry::file_name);
    Ok(entries)
}

/// All `*.sh` files directly inside `dir`, sorted by name.
fn shell_scripts(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    Ok(read_dir_entries(dir)?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| has_script_extension(path) && path.is_file())
        .collect())
}

/// List every script with its executable status.
///
/// # Errors
///
/// Returns `AppError::Io` if the directory exists but cannot be read.
pub fn list_scripts(dir: &Path) -> Result<Vec<ScriptEntry>, AppError> {
    Ok(shell_scripts(dir)?
        .into_iter()
        .filter_map(|path| {
            let name = path.file_stem()?.to_string_lossy().into_owned();
            Some(ScriptEntry {
                executable: is_executable(&path),
                name,
            })
        })
        .collect())
}

/// List executable regular files in the binaries directory.
///
/// # Errors
///
/// Returns `AppError::Io` if the directory exists but cannot be read.
pub fn list_binaries(dir: &Path) -> Result<Vec<String>, AppError> {
    Ok(read_dir_entries(dir)?
        .into_iter()
        .filter(|entry| entry.file_name() != SELF_BINARY_NAME)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_executable(path))
        .filter_map(|path| Some(path.file_name()?.to_string_lossy().into_owned()))
        .collect())
}

/// Make every script in `dir` executable.
///
/// Stops at the first chmod failure; scripts handled before it stay changed.
///
/// # Errors
///
/// Returns `AppError::Io` if the directory cannot be read or a chmod fails.
pub fn ready_all(dir: &Path) -> Result<Vec<ReadyReport>, AppError> {
    let mut reports = Vec::new();
    for path in shell_scripts(dir)? {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let status = if is_executable(&path) {
            ReadyStatus::AlreadyExecutable
        } else {
            set_executable(&path)?;
            ReadyStatus::MadeExecutable
        };
        reports.push(ReadyReport { file_name, status });
    }
    Ok(reports)
}

/// Make the script called `name` executable. `name` may carry the `.sh`.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the script does not exist and
/// `AppError::Io` if the chmod fails.
pub fn ready_single(dir: &Path, name: &str) -> Result<ReadyStatus, AppError> {
    let name = script_name(name);
    let path = script_path(dir, name);
    if !path.exists() {
        return Err(AppError::NotFound {
            kind: EntryKind::Script,
            name: name.to_string(),
            dir: dir.to_path_buf(),
        });
    }
    if is_executable(&path) {
        return Ok(ReadyStatus::AlreadyExecutable);
    }
    set_executable(&path)?;
    Ok(ReadyStatus::MadeExecutable)
}

/// Copy a `.sh` file into `dest_dir` and make the copy executable.
///
/// The source file is left untouched. Returns the path of the copy.
///
/// # Errors
///
/// Returns `AppError::PathNotFound` if `source` is missing,
/// `AppError::NotShellScript` if it lacks the `.sh` extension, and
/// `AppError::Io` if copying or chmod fails.
pub fn add(source: &Path, dest_dir: &Path) -> Result<PathBuf, AppError> {
    if !source.exists() {
        return Err(AppError::PathNotFound {
            kind: EntryKind::Script,
            path: source.to_path_buf(),
        });
    }
    if !has_script_extension(source) {
        return Err(AppError::NotShellScript(source.to_path_buf()));
    }
    let Some(file_name) = source.file_name() else {
        return Err(AppError::NotShellScript(source.to_path_buf()));
    };

    fs::create_dir_all(dest_dir).map_err(|e| {
        AppError::io(format!("failed to create scripts directory {}", dest_dir.display()), e)
    })?;

    let dest = dest_dir.join(file_name);
    fs::copy(source, &dest).map_err(|e| {
        AppError::io(
            format!("failed to copy {} to {}", source.display(), dest.display()),
            e,
        )
    })?;
    set_executable(&dest)?;
    Ok(dest)
}

fn remove_entry(kind: EntryKind, dir: &Path, name: &str, path: &Path) -> Result<(), AppError> {
    if !path.exists() {
        return Err(AppError::NotFound {
            kind,
            name: name.to_string(),
            dir: dir.to_path_buf(),
        });
    }
    fs::remove_file(path)
        .map_err(|e| AppError::io(format!("failed to remove {}", path.display()), e))
}

/// Delete the script called `name` from `dir`.
///
/// # Errors
///
/// Returns `AppError::NotFound` if absent and `AppError::Io` if removal fails.
pub fn remove_script(dir: &Path, name: &str) -> Result<(), AppError> {
    remove_entry(EntryKind::Script, dir, name, &script_path(dir, name))
}

/// Delete the binary called `name` from `dir`.
///
/// # Errors
///
/// Returns `AppError::NotFound` if absent and `AppError::Io` if removal fails.
pub fn remove_binary(dir: &Path, name: &str) -> Result<(), AppError> {
    remove_entry(EntryKind::Binary, dir, name, &dir.join(name))
}

/// Resolve a script that is ready to run.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the script is missing and
/// `AppError::NotExecutable` if its owner execute bit is unset.
pub fn runnable_script(dir: &Path, name: &str) -> Result<PathBuf, AppError> {
    let path = script_path(dir, name);
    if !path.exists() {
        return Err(AppError::NotFound {
            kind: EntryKind::Script,
            name: name.to_string(),
            dir: dir.to_path_buf(),
        });
    }
    if !is_executable(&path) {
        return Err(AppError::NotExecutable(name.to_string()));
    }
    Ok(path)
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    fn write_script(dir: &Path, file_name: &str, mode: u32) -> PathBuf {
        let path = dir.join(file_name);
        fs::write(&path, format!("#!/bin/sh\necho {file_name}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    fn dir_listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_script_name_strips_extension_once() {
        assert_eq!(script_name("deploy"), "deploy");
        assert_eq!(script_name("deploy.sh"), "deploy");
        assert_eq!(script_name("a.sh.sh"), "a.sh");
    }

    #[test]
    fn test_list_scripts_reports_executable_status() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_script(temp_dir.path(), "b.sh", 0o644);
        write_script(temp_dir.path(), "a.sh", 0o755);
        write_script(temp_dir.path(), "notes.txt", 0o644);

        let scripts = list_scripts(temp_dir.path()).unwrap();

        assert_eq!(
            scripts,
            vec![
                ScriptEntry { name: "a".to_string(), executable: true },
                ScriptEntry { name: "b".to_string(), executable: false },
            ]
        );
    }

    #[test]
    fn test_list_scripts_missing_dir_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(list_scripts(&temp_dir.path().join("absent")).unwrap().is_empty());
    }

    #[test]
    fn test_list_binaries_skips_dirs_non_executables_and_self() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_script(temp_dir.path(), "greet", 0o755);
        write_script(temp_dir.path(), "data.bin", 0o644);
        write_script(temp_dir.path(), "scripts", 0o755);
        fs::create_dir(temp_dir.path().join("subdir")).unwrap();

        assert_eq!(list_binaries(temp_dir.path()).unwrap(), vec!["greet"]);
    }

    #[test]
    fn test_ready_all_reports_each_script() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_script(temp_dir.path(), "one.sh", 0o644);
        write_script(temp_dir.path(), "two.sh", 0o600);
        write_script(temp_dir.path(), "three.sh", 0o755);

        let reports = ready_all(temp_dir.path()).unwrap();

        let made = reports
            .iter()
            .filter(|r| r.status == ReadyStatus::MadeExecutable)
            .count();
        let already = reports
            .iter()
            .filter(|r| r.status == ReadyStatus::AlreadyExecutable)
            .count();
        assert_eq!((made, already), (2, 1));
        for name in ["one.sh", "two.sh", "three.sh"] {
            assert!(is_executable(&temp_dir.path().join(name)));
        }
    }

    #[test]
    fn test_ready_single_accepts_name_with_or_without_extension() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_script(temp_dir.path(), "deploy.sh", 0o644);

        assert_eq!(
            ready_single(temp_dir.path(), "deploy.sh").unwrap(),
            ReadyStatus::MadeExecutable
        );
        assert!(is_executable(&path));
        assert_eq!(
            ready_single(temp_dir.path(), "deploy").unwrap(),
            ReadyStatus::AlreadyExecutable
        );
    }

    #[test]
    fn test_ready_all_stops_at_chmod_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        // A symlink to a file owned by someone else cannot be chmodded.
        let foreign = Path::new("/etc/passwd");
        let Ok(foreign_meta) = fs::metadata(foreign) else {
            return;
        };
        let own = write_script(temp_dir.path(), "a.sh", 0o644);
        let own_uid = fs::metadata(&own).unwrap().uid();
        if foreign_meta.uid() == own_uid || foreign_meta.mode() & 0o100 != 0 {
            eprintln!("Skipping test: /etc/passwd is owned by this user");
            return;
        }
        std::os::unix::fs::symlink(foreign, temp_dir.path().join("b.sh")).unwrap();
        let later = write_script(temp_dir.path(), "c.sh", 0o644);

        let err = ready_all(temp_dir.path()).unwrap_err();

        assert!(matches!(err, AppError::Io { .. }));
        assert!(is_executable(&own));
        assert!(!is_executable(&later));
    }

    #[test]
    fn test_ready_single_missing_script_is_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = ready_single(temp_dir.path(), "ghost").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_add_copies_bytes_and_sets_executable() {
        let src_dir = tempfile::tempdir().unwrap();
        let dest_root = tempfile::tempdir().unwrap();
        let dest_dir = dest_root.path().join("scripts_bin");
        let source = write_script(src_dir.path(), "tool.sh", 0o644);

        let copied = add(&source, &dest_dir).unwrap();

        assert_eq!(copied, dest_dir.join("tool.sh"));
        assert!(is_executable(&copied));
        assert_eq!(fs::read(&copied).unwrap(), fs::read(&source).unwrap());
        assert!(source.exists());
        assert!(!is_executable(&source));
    }

    #[test]
    fn test_add_rejects_non_shell_file_without_mutation() {
        let src_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let source = write_script(src_dir.path(), "tool.py", 0o644);

        let err = add(&source, dest_dir.path()).unwrap_err();

        assert!(matches!(err, AppError::NotShellScript(_)));
        assert!(dir_listing(dest_dir.path()).is_empty());
    }

    #[test]
    fn test_add_rejects_bare_extension_file() {
        let src_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let source = write_script(src_dir.path(), ".sh", 0o644);

        let err = add(&source, dest_dir.path()).unwrap_err();

        assert!(matches!(err, AppError::NotShellScript(_)));
        assert!(dir_listing(dest_dir.path()).is_empty());
    }

    #[test]
    fn test_add_missing_source_does_not_create_dest() {
        let src_dir = tempfile::tempdir().unwrap();
        let dest_root = tempfile::tempdir().unwrap();
        let dest_dir = dest_root.path().join("scripts_bin");

        let err = add(&src_dir.path().join("missing.sh"), &dest_dir).unwrap_err();

        assert!(err.is_not_found());
        assert!(!dest_dir.exists());
    }

    #[test]
    fn test_remove_script_and_binary() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_script(temp_dir.path(), "old.sh", 0o755);
        write_script(temp_dir.path(), "old", 0o755);

        remove_script(temp_dir.path(), "old").unwrap();
        assert_eq!(dir_listing(temp_dir.path()), vec!["old"]);

        remove_binary(temp_dir.path(), "old").unwrap();
        assert!(dir_listing(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_remove_missing_is_not_found_without_mutation() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_script(temp_dir.path(), "keep.sh", 0o755);

        let err = remove_script(temp_dir.path(), "ghost").unwrap_err();
        assert!(err.is_not_found());
        let err = remove_binary(temp_dir.path(), "ghost").unwrap_err();
        assert!(err.to_string().contains("not found"));

        assert_eq!(dir_listing(temp_dir.path()), vec!["keep.sh"]);
    }

    #[test]
    fn test_remove_and_run_do_not_strip_extension() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_script(temp_dir.path(), "deploy.sh", 0o755);

        assert!(remove_script(temp_dir.path(), "deploy.sh").unwrap_err().is_not_found());
        assert!(runnable_script(temp_dir.path(), "deploy.sh").unwrap_err().is_not_found());
        assert_eq!(dir_listing(temp_dir.path()), vec!["deploy.sh"]);
    }

    #[test]
    fn test_runnable_script_checks_existence_then_permission() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_script(temp_dir.path(), "locked.sh", 0o644);
        let ready = write_script(temp_dir.path(), "open.sh", 0o755);

        assert!(runnable_script(temp_dir.path(), "ghost").unwrap_err().is_not_found());
        assert!(matches!(
            runnable_script(temp_dir.path(), "locked").unwrap_err(),
            AppError::NotExecutable(name) if name == "locked"
        ));
        assert_eq!(runnable_script(temp_dir.path(), "open").unwrap(), ready);
    }
}
