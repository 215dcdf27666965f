//! Running scripts from the scripts directory.

use crate::error::AppError;
use crate::process::{Invocation, ProcessRunner};
use crate::registry;
use std::ffi::OsStr;
use std::path::Path;

/// Run `<script_dir>/<name>.sh`, forwarding `args` verbatim.
///
/// The script inherits the terminal; its failure is reported, never retried.
///
/// # Errors
///
/// - `AppError::NotFound` if the script does not exist
/// - `AppError::NotExecutable` if its owner execute bit is unset
/// - `AppError::ScriptFailed` if it cannot be spawned or exits unsuccessfully
pub fn run_script<S: AsRef<OsStr>>(
    runner: &dyn ProcessRunner,
    script_dir: &Path,
    name: &str,
    args: &[S],
) -> Result<(), AppError> {
    let path = registry::runnable_script(script_dir, name)?;
    let invocation = Invocation::new(&path).args(args).inherit_stderr();

    let outcome = runner.run(&invocation).map_err(|e| AppError::ScriptFailed {
        name: name.to_string(),
        details: e.to_string(),
    })?;

    if outcome.success() {
        Ok(())
    } else {
        Err(AppError::ScriptFailed {
            name: name.to_string(),
            details: outcome.status_text(),
        })
    }
}
