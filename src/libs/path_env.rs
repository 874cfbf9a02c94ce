// This module makes the binary directory discoverable on the command search
// path, persistently and idempotently. The desired end state is declared as a
// `PathEntry` (one directory, a set of startup-file targets) and the
// provisioner computes the minimal edit that reaches it; on a second run
// that edit is empty and nothing is written.
//
// POSIX hosts get one guarded export line appended to each startup file that
// already exists; files that do not exist are left alone. Windows hosts get
// the user-scope persisted Path variable prepended. Both variants also patch
// the *current* process environment so stages that follow can invoke freshly
// installed tools without a new shell session.

// Imports the `Colorize` trait for adding color to console output.
use colored::Colorize;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::errors::SetupError;
use crate::schema::{OsFamily, PathEntry, PlatformProfile};
use crate::{log_debug, log_info};

/// Comment header written above machine-appended lines, so users can tell
/// which startup-file lines are managed.
pub const MARKER: &str = "# Added by setup-sovereign";

/// The startup files a POSIX profile may carry the export line in.
/// Only files that already exist are ever touched.
pub fn startup_files(home: &Path) -> Vec<PathBuf> {
    [".bashrc", ".zshrc", ".profile"]
        .iter()
        .map(|name| home.join(name))
        .collect()
}

/// Builds the declared PATH membership for this run.
pub fn path_entry(bin_dir: &Path) -> Result<PathEntry, SetupError> {
    let home = dirs::home_dir().ok_or(SetupError::HomeDirMissing)?;
    Ok(PathEntry {
        dir: bin_dir.to_path_buf(),
        startup_files: startup_files(&home),
    })
}

/// Ensures the binary directory is on the search path, persistently for
/// future sessions and immediately for the current process.
pub fn provision(profile: &PlatformProfile, entry: &PathEntry) -> Result<(), SetupError> {
    log_info!("[PATH] Ensuring {} is on the PATH...", entry.dir.display().to_string().cyan());

    match profile.os {
        OsFamily::Posix => {
            let mut touched = 0usize;
            for rc_path in &entry.startup_files {
                let appended = upsert_path_line(rc_path, &entry.dir)
                    .map_err(|e| SetupError::io(format!("updating {}", rc_path.display()), e))?;
                if appended {
                    log_info!("[PATH] Added export line to {}", rc_path.display().to_string().green());
                    touched += 1;
                }
            }
            if touched == 0 {
                log_info!("[PATH] All startup files already reference the binary directory.");
            }
        }
        OsFamily::Windows => persist_windows_path(&entry.dir)?,
    }

    prepend_process_path(&entry.dir);
    Ok(())
}

/// The export line appended to POSIX startup files.
pub(crate) fn export_line(dir: &Path) -> String {
    format!("export PATH=\"{}:$PATH\"", dir.display())
}

/// Appends the guarded export line to one startup file.
/// Returns `Ok(false)` without writing when the file does not exist (we never
/// create startup files) or when it already references the directory, the
/// check that makes a second run a no-op.
pub fn upsert_path_line(rc_path: &Path, dir: &Path) -> io::Result<bool> {
    if !rc_path.exists() {
        log_debug!("[PATH] {} does not exist; skipping", rc_path.display().to_string().dimmed());
        return Ok(false);
    }

    let contents = fs::read_to_string(rc_path)?;
    if mentions_dir(&contents, dir) {
        log_debug!("[PATH] {} already references the directory", rc_path.display().to_string().dimmed());
        return Ok(false);
    }

    let mut file = OpenOptions::new().append(true).open(rc_path)?;
    writeln!(file, "\n{MARKER}")?;
    writeln!(file, "{}", export_line(dir))?;
    Ok(true)
}

/// Existing-content guard: any line mentioning the directory path counts,
/// whether written by this tool or by the user's own hand.
pub(crate) fn mentions_dir(contents: &str, dir: &Path) -> bool {
    contents.contains(&dir.display().to_string())
}

/// Prepends the directory to the user-scope persisted Path variable, going
/// through PowerShell's environment API. The value is only rewritten when the
/// directory is not already a component of it.
fn persist_windows_path(dir: &Path) -> Result<(), SetupError> {
    let current = read_windows_user_path()?;
    match prepend_if_absent(&current, &dir.display().to_string()) {
        Some(updated) => {
            write_windows_user_path(&updated)?;
            log_info!("[PATH] Persisted {} into the user Path variable", dir.display().to_string().green());
        }
        None => {
            log_info!("[PATH] User Path variable already references the binary directory.");
        }
    }
    Ok(())
}

fn read_windows_user_path() -> Result<String, SetupError> {
    let output = Command::new("powershell")
        .args([
            "-NoProfile",
            "-Command",
            "[Environment]::GetEnvironmentVariable('Path','User')",
        ])
        .output()
        .map_err(|e| SetupError::PathPersistFailed { reason: e.to_string() })?;
    if !output.status.success() {
        return Err(SetupError::PathPersistFailed {
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn write_windows_user_path(value: &str) -> Result<(), SetupError> {
    let script = format!("[Environment]::SetEnvironmentVariable('Path','{value}','User')");
    let output = Command::new("powershell")
        .args(["-NoProfile", "-Command", &script])
        .output()
        .map_err(|e| SetupError::PathPersistFailed { reason: e.to_string() })?;
    if !output.status.success() {
        return Err(SetupError::PathPersistFailed {
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Computes the updated windows Path value, or `None` when the directory is
/// already a component (substring check, matching how the variable is
/// consumed there).
pub(crate) fn prepend_if_absent(current: &str, dir: &str) -> Option<String> {
    if current.contains(dir) {
        return None;
    }
    if current.is_empty() {
        Some(dir.to_string())
    } else {
        Some(format!("{dir};{current}"))
    }
}

/// Patches the current process PATH so later stages (wrapper generation,
/// probes after a fresh install) can already resolve tools in the binary
/// directory. Skipped when the directory is already a component.
fn prepend_process_path(dir: &Path) {
    let current = env::var_os("PATH").unwrap_or_default();
    if env::split_paths(&current).any(|p| p == dir) {
        return;
    }
    let mut parts = vec![dir.to_path_buf()];
    parts.extend(env::split_paths(&current));
    if let Ok(joined) = env::join_paths(parts) {
        // SAFETY: the pipeline is single-threaded; no other thread reads or
        // writes the environment while this runs.
        unsafe { env::set_var("PATH", &joined) };
        log_debug!("[PATH] Current process PATH now leads with {}", dir.display().to_string().cyan());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_appends_once_and_only_once() {
        let home = tempfile::tempdir().unwrap();
        let rc = home.path().join(".bashrc");
        fs::write(&rc, "alias ll='ls -l'\n").unwrap();
        let dir = PathBuf::from("/home/user/.sovereign/bin");

        assert!(upsert_path_line(&rc, &dir).unwrap());
        let after_first = fs::read_to_string(&rc).unwrap();
        assert!(after_first.contains(MARKER));
        assert!(after_first.contains("export PATH=\"/home/user/.sovereign/bin:$PATH\""));

        // Second run: the guard sees the existing reference and writes nothing.
        assert!(!upsert_path_line(&rc, &dir).unwrap());
        let after_second = fs::read_to_string(&rc).unwrap();
        assert_eq!(after_first, after_second);
        assert_eq!(after_second.matches(".sovereign/bin").count(), 1);
    }

    #[test]
    fn upsert_never_creates_a_missing_startup_file() {
        let home = tempfile::tempdir().unwrap();
        let rc = home.path().join(".zshrc");
        let dir = PathBuf::from("/home/user/.sovereign/bin");

        assert!(!upsert_path_line(&rc, &dir).unwrap());
        assert!(!rc.exists());
    }

    #[test]
    fn a_hand_written_reference_counts_as_present() {
        let home = tempfile::tempdir().unwrap();
        let rc = home.path().join(".profile");
        let dir = PathBuf::from("/home/user/.sovereign/bin");
        fs::write(&rc, "PATH=/home/user/.sovereign/bin:$PATH\n").unwrap();

        assert!(!upsert_path_line(&rc, &dir).unwrap());
    }

    #[test]
    fn windows_prepend_is_idempotent() {
        let dir = r"C:\Users\u\.sovereign\bin";
        let updated = prepend_if_absent(r"C:\Windows;C:\Windows\System32", dir).unwrap();
        assert!(updated.starts_with(dir));
        assert!(updated.contains(';'));
        assert_eq!(prepend_if_absent(&updated, dir), None);
    }

    #[test]
    fn windows_prepend_handles_an_empty_variable() {
        let dir = r"C:\Users\u\.sovereign\bin";
        assert_eq!(prepend_if_absent("", dir).unwrap(), dir);
    }

    #[test]
    fn startup_file_set_is_fixed() {
        let files = startup_files(Path::new("/home/user"));
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, [".bashrc", ".zshrc", ".profile"]);
    }
}
