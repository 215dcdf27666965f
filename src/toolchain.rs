//! Source-to-binary compilation through per-language toolchains.
//!
//! The source file extension selects exactly one toolchain. Each toolchain is
//! a single external command; a Cargo project additionally copies its release
//! binary into place afterwards.

use crate::error::{AppError, EntryKind};
use crate::permissions::set_executable;
use crate::process::{Invocation, ProcessRunner};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Toolchain selected from a source file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toolchain {
    Go,
    Python,
    V,
    Rust,
    C,
    Cpp,
    /// Extension with no toolchain, as written (with leading dot, lower-cased).
    Unsupported(String),
}

impl Toolchain {
    /// Map a lower- or mixed-case extension (without the dot) to a toolchain.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "go" => Self::Go,
            "py" => Self::Python,
            "v" => Self::V,
            "rs" => Self::Rust,
            "c" => Self::C,
            "cpp" | "cc" | "cxx" => Self::Cpp,
            "" => Self::Unsupported(String::new()),
            other => Self::Unsupported(format!(".{other}")),
        }
    }

    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_extension(&ext)
    }

    #[must_use]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl fmt::Display for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Go => f.write_str("Go"),
            Self::Python => f.write_str("PyInstaller"),
            Self::V => f.write_str("V"),
            Self::Rust => f.write_str("Rust"),
            Self::C => f.write_str("C"),
            Self::Cpp => f.write_str("C++"),
            Self::Unsupported(ext) => write!(f, "unsupported ({ext})"),
        }
    }
}

/// The command to run and where its binary ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub invocation: Invocation,
    /// Binary the toolchain leaves outside the output path, copied in after a
    /// successful build.
    pub release_binary: Option<PathBuf>,
}

/// Directory holding `source`, usable as a working directory.
fn source_dir(source: &Path) -> PathBuf {
    match source.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Build the invocation for `toolchain` compiling `source` into `output`.
///
/// # Errors
///
/// Returns `AppError::UnsupportedExtension` for [`Toolchain::Unsupported`].
pub fn plan(toolchain: &Toolchain, source: &Path, output: &Path) -> Result<BuildPlan, AppError> {
    let direct = |program: &str, flags: &[&str]| BuildPlan {
        invocation: Invocation::new(program)
            .args(flags)
            .arg("-o")
            .arg(output)
            .arg(source),
        release_binary: None,
    };

    let plan = match toolchain {
        Toolchain::Go => direct("go", &["build"]),
        Toolchain::V => direct("v", &["-prod"]),
        Toolchain::C => direct("gcc", &[]),
        Toolchain::Cpp => direct("g++", &[]),
        Toolchain::Python => {
            let dist = output.parent().unwrap_or_else(|| Path::new("."));
            let name = output.file_name().unwrap_or_default();
            BuildPlan {
                invocation: Invocation::new("pyinstaller")
                    .arg("--onefile")
                    .arg("--distpath")
                    .arg(dist)
                    .arg("--name")
                    .arg(name)
                    .arg(source),
                release_binary: None,
            }
        }
        Toolchain::Rust => {
            let dir = source_dir(source);
            if dir.join("Cargo.toml").is_file() {
                let release_binary = dir.join("target").join("release").join(file_stem(source));
                BuildPlan {
                    invocation: Invocation::new("cargo")
                        .args(["build", "--release"])
                        .current_dir(&dir),
                    release_binary: Some(release_binary),
                }
            } else {
                direct("rustc", &[])
            }
        }
        Toolchain::Unsupported(ext) => return Err(AppError::UnsupportedExtension(ext.clone())),
    };
    Ok(plan)
}

/// Reject names that would place the binary outside the binaries directory.
fn check_binary_name(name: &str) -> Result<(), AppError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(()),
        _ => Err(AppError::Usage(format!(
            "binary name must be a plain file name, got {name:?}"
        ))),
    }
}

fn spawn_failure(toolchain: &Toolchain, invocation: &Invocation, err: &io::Error) -> AppError {
    let hint = if err.kind() == io::ErrorKind::NotFound {
        " (is it installed and on your PATH?)"
    } else {
        ""
    };
    AppError::Compilation {
        toolchain: toolchain.to_string(),
        details: format!("failed to start `{}`: {err}{hint}", invocation.program_name()),
    }
}

/// Compile `source` into `bin_dir`, returning the path of the new binary.
///
/// The binary is named `output_name` when given, otherwise after the source
/// file with its extension stripped. Nothing is cleaned up on failure.
///
/// # Errors
///
/// - `AppError::PathNotFound` if `source` does not exist (no toolchain runs)
/// - `AppError::Usage` if `output_name` is not a plain file name
/// - `AppError::UnsupportedExtension` if no toolchain matches (nothing is created)
/// - `AppError::Compilation` if the toolchain cannot start, exits non-zero, or
///   leaves no binary behind
/// - `AppError::Io` if the binaries directory cannot be created or the binary
///   cannot be made executable
pub fn compile(
    runner: &dyn ProcessRunner,
    source: &Path,
    output_name: Option<&str>,
    bin_dir: &Path,
) -> Result<PathBuf, AppError> {
    if !source.exists() {
        return Err(AppError::PathNotFound {
            kind: EntryKind::Source,
            path: source.to_path_buf(),
        });
    }

    if let Some(name) = output_name {
        check_binary_name(name)?;
    }
    let name = output_name.map_or_else(|| file_stem(source), str::to_string);
    let output = bin_dir.join(&name);
    let toolchain = Toolchain::from_path(source);
    let build = plan(&toolchain, source, &output)?;

    fs::create_dir_all(bin_dir).map_err(|e| {
        AppError::io(format!("failed to create bin directory {}", bin_dir.display()), e)
    })?;

    log::debug!("Compiling {} with {toolchain}", source.display());
    let outcome = runner
        .run(&build.invocation)
        .map_err(|e| spawn_failure(&toolchain, &build.invocation, &e))?;
    if !outcome.success() {
        return Err(AppError::Compilation {
            toolchain: toolchain.to_string(),
            details: format!("`{}` failed with {}", build.invocation, outcome.describe_failure()),
        });
    }

    if let Some(release_binary) = &build.release_binary {
        fs::copy(release_binary, &output).map_err(|e| AppError::Compilation {
            toolchain: toolchain.to_string(),
            details: format!(
                "could not copy release binary {} to {}: {e}",
                release_binary.display(),
                output.display()
            ),
        })?;
    }

    if !output.is_file() {
        return Err(AppError::Compilation {
            toolchain: toolchain.to_string(),
            details: format!("no binary was produced at {}", output.display()),
        });
    }

    set_executable(&output)?;
    Ok(output)
}
