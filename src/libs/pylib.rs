// This module provisions the HTTP client library the sovereign artifacts
// import at startup. The probe is an actual import under the resolved
// runtime, the only check that proves the library is usable from that
// interpreter, as opposed to merely present somewhere on the machine.
//
// This stage carries the pipeline's one explicit retry: a failed user-scope
// install escalates to system scope exactly once. Failure of both is fatal.

// Imports the `Colorize` trait for adding color to console output.
use colored::Colorize;
// For executing the import probe and the pip installs.
use std::process::Command;

use crate::errors::SetupError;
use crate::schema::{OsFamily, ResolvedRuntime};
use crate::{log_debug, log_info, log_warn};

/// The library the fetched artifacts depend on.
pub const HTTP_LIBRARY: &str = "requests";

/// Install scope for the pip invocation. User scope first; system scope only
/// as the escalation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallScope {
    User,
    System,
}

/// Makes `requests` importable under the resolved runtime.
/// Silent success when the import already works; otherwise a user-scope pip
/// install, then a single system-scope escalation, then a fatal error.
pub fn ensure(runtime: &ResolvedRuntime, os: OsFamily) -> Result<(), SetupError> {
    log_info!("[PyLib] Checking that '{}' is importable...", HTTP_LIBRARY.cyan());

    if import_succeeds(&runtime.binary) {
        log_info!("[PyLib] '{}' already importable; nothing to do.", HTTP_LIBRARY.green());
        return Ok(());
    }

    if pip_install(runtime, os, InstallScope::User) {
        log_info!("[PyLib] Installed '{}' in user scope.", HTTP_LIBRARY.green());
        return Ok(());
    }

    log_warn!(
        "[PyLib] User-scope install of '{}' failed; escalating to system scope.",
        HTTP_LIBRARY.yellow()
    );
    if pip_install(runtime, os, InstallScope::System) {
        log_info!("[PyLib] Installed '{}' in system scope.", HTTP_LIBRARY.green());
        return Ok(());
    }

    Err(SetupError::LibraryInstallFailed {
        package: HTTP_LIBRARY.to_string(),
    })
}

/// The import probe: `<runtime> -c "import requests"`. Side-effect-free and
/// run both before and after an install attempt.
fn import_succeeds(runtime_binary: &str) -> bool {
    Command::new(runtime_binary)
        .args(["-c", &format!("import {HTTP_LIBRARY}")])
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Runs one pip install attempt in the given scope; true on success.
fn pip_install(runtime: &ResolvedRuntime, os: OsFamily, scope: InstallScope) -> bool {
    let argv = install_argv(&runtime.binary, os, scope);
    log_info!("[PyLib] Executing: {}", argv.join(" ").cyan());

    match Command::new(&argv[0]).args(&argv[1..]).output() {
        Ok(output) if output.status.success() => true,
        Ok(output) => {
            log_debug!(
                "[PyLib] pip exited with {}: {}",
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            false
        }
        Err(e) => {
            log_debug!("[PyLib] failed to spawn '{}': {}", argv[0], e);
            false
        }
    }
}

/// Builds the pip argv for a scope. User scope uses `--user`; system scope on
/// POSIX escalates through sudo, while Windows installs machine-wide without
/// a privilege wrapper (elevation is the shell session's concern there).
pub(crate) fn install_argv(runtime_binary: &str, os: OsFamily, scope: InstallScope) -> Vec<String> {
    let mut argv: Vec<String> = Vec::new();
    if scope == InstallScope::System && os == OsFamily::Posix {
        argv.push("sudo".to_string());
    }
    argv.push(runtime_binary.to_string());
    argv.extend(["-m", "pip", "install"].map(String::from));
    if scope == InstallScope::User {
        argv.push("--user".to_string());
    }
    argv.push(HTTP_LIBRARY.to_string());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_scope_uses_the_user_flag() {
        let argv = install_argv("python3", OsFamily::Posix, InstallScope::User);
        assert_eq!(argv, ["python3", "-m", "pip", "install", "--user", "requests"]);
    }

    #[test]
    fn posix_system_scope_escalates_with_sudo() {
        let argv = install_argv("python3", OsFamily::Posix, InstallScope::System);
        assert_eq!(argv, ["sudo", "python3", "-m", "pip", "install", "requests"]);
    }

    #[test]
    fn windows_system_scope_never_uses_sudo() {
        let argv = install_argv("python", OsFamily::Windows, InstallScope::System);
        assert_eq!(argv, ["python", "-m", "pip", "install", "requests"]);
    }

    #[test]
    fn windows_user_scope_keeps_the_user_flag() {
        let argv = install_argv("python", OsFamily::Windows, InstallScope::User);
        assert!(argv.contains(&"--user".to_string()));
        assert_ne!(argv[0], "sudo");
    }
}
