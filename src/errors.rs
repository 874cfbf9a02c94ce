// src/errors.rs
// The fatal-failure taxonomy for the provisioning pipeline.
// Every variant here aborts the run at its stage boundary: the orchestrator
// prints the error, prints `remedy()` when one exists, and exits non-zero.
// Recoverable conditions (already-installed, already-on-PATH, token file
// already present) never surface as errors at all.

use thiserror::Error;

/// URL offered to the user when no automated runtime install is possible.
pub const PYTHON_DOWNLOAD_URL: &str = "https://www.python.org/downloads/";

#[derive(Debug, Error)]
pub enum SetupError {
    /// No candidate runtime binary satisfied the version predicate, even
    /// after a package-manager install attempt. Terminal and non-retried:
    /// there is nothing further the tool can do on its own.
    #[error("no usable Python 3 runtime found (probed: {probed})")]
    RuntimeMissing { probed: String },

    /// The host has a missing runtime and none of the supported package
    /// managers to install one with.
    #[error("no supported package manager detected on this host")]
    NoPackageManager,

    /// A package manager was present but its install command failed.
    #[error("'{manager}' failed to install '{package}' (exit code {code})")]
    PackageInstallFailed {
        manager: String,
        package: String,
        code: i32,
    },

    /// pip would not come up under the resolved runtime, even after an
    /// `ensurepip` bootstrap attempt.
    #[error("pip is unavailable under '{runtime}', even after ensurepip")]
    PipMissing { runtime: String },

    /// Both the user-scope and the escalated system-scope pip install failed.
    #[error("could not install '{package}' with pip in either user or system scope")]
    LibraryInstallFailed { package: String },

    /// Network failure or non-success status while fetching an artifact.
    /// Fail-fast by design: the whole pipeline is safe to re-invoke.
    #[error("download failed for {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    /// The user-scope persisted PATH value could not be read or written back.
    #[error("could not persist the user PATH variable: {reason}")]
    PathPersistFailed { reason: String },

    /// Everything this tool persists is anchored under the home directory.
    #[error("could not determine the user's home directory")]
    HomeDirMissing,

    /// Local filesystem failure, wrapped with the operation that hit it.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl SetupError {
    /// Wraps an `io::Error` with a short description of what was being done.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        SetupError::Io {
            context: context.into(),
            source,
        }
    }

    /// A one-line manual remedy printed beneath the diagnostic, when the
    /// failure has a known user-side fix.
    pub fn remedy(&self) -> Option<String> {
        match self {
            SetupError::RuntimeMissing { .. } | SetupError::NoPackageManager => Some(format!(
                "install Python 3 manually from {PYTHON_DOWNLOAD_URL} and re-run `setup-sovereign install`"
            )),
            SetupError::PackageInstallFailed { package, .. } => Some(format!(
                "install '{package}' with your package manager, then re-run `setup-sovereign install`"
            )),
            SetupError::PipMissing { runtime } => Some(format!(
                "run `{runtime} -m ensurepip --upgrade` manually, or reinstall Python with pip included"
            )),
            SetupError::LibraryInstallFailed { package } => Some(format!(
                "run `python3 -m pip install --user {package}` manually, then re-run `setup-sovereign install`"
            )),
            SetupError::DownloadFailed { .. } => Some(
                "check your network connection and re-run; completed stages are skipped or safely redone".to_string(),
            ),
            SetupError::PathPersistFailed { .. } => Some(
                "add ~/.sovereign/bin to your PATH manually in your shell startup file".to_string(),
            ),
            _ => None,
        }
    }
}
