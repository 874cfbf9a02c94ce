// This module is the platform profiler: the one place that inspects host
// signals (OS identifier, shell variables, package managers on the PATH)
// and condenses them into a `PlatformProfile`. Every later stage consumes
// the profile instead of re-branching on the platform itself.
//
// Profiling never fails and has no side effects. A host we cannot classify
// degrades to a best-effort POSIX-like profile with an empty manager list;
// that only becomes a problem later, and only if the runtime is also missing.

// The 'colored' crate helps us make our console output look pretty and readable.
use colored::Colorize;
// To run the per-manager presence probes (`<manager> --version`).
use std::process::Command;

// Our custom logging macros for debug tracing of each probe.
use crate::log_debug;
use crate::schema::{OsFamily, PackageManager, PlatformProfile, ShellKind};

/// Computes the `PlatformProfile` for this host. Called exactly once per run;
/// the result is immutable afterwards.
pub fn profile() -> PlatformProfile {
    let os_name = std::env::consts::OS.to_string();
    let os = classify_os(&os_name);
    let shell = classify_shell(os, std::env::var("SHELL").ok().as_deref());
    let package_managers = detect_package_managers(os, &os_name);

    log_debug!(
        "[Platform] os={} family={:?} shell={} managers={:?}",
        os_name.cyan(),
        os,
        shell.label().cyan(),
        package_managers
    );

    PlatformProfile {
        os,
        os_name,
        shell,
        package_managers,
    }
}

/// Maps the raw OS identifier onto the two families the pipeline branches on.
/// Everything that is not Windows is POSIX-like, including identifiers we
/// have never heard of, so an unknown host still gets a usable profile.
fn classify_os(os_name: &str) -> OsFamily {
    match os_name {
        "windows" => OsFamily::Windows,
        _ => OsFamily::Posix,
    }
}

/// Classifies the login shell from the `SHELL` environment variable.
/// On Windows the variable is usually absent and the command processor is
/// assumed; on POSIX an unrecognized or missing value falls back to plain sh.
fn classify_shell(os: OsFamily, shell_var: Option<&str>) -> ShellKind {
    if os == OsFamily::Windows {
        return ShellKind::Cmd;
    }
    let shell_name = shell_var
        .and_then(|v| v.rsplit('/').next())
        .unwrap_or("sh");
    match shell_name {
        "bash" => ShellKind::Bash,
        "zsh" => ShellKind::Zsh,
        "fish" => ShellKind::Fish,
        _ => ShellKind::Sh,
    }
}

/// Probes the priority-ordered candidate list for this OS family and keeps
/// the managers that are actually present. Order is preserved, so the first
/// element of the result is always the highest-priority manager on the host.
pub fn detect_package_managers(os: OsFamily, os_name: &str) -> Vec<PackageManager> {
    PackageManager::priority_for(os, os_name)
        .iter()
        .copied()
        .filter(|manager| {
            let present = binary_answers(manager.binary());
            log_debug!(
                "[Platform] probe {} -> {}",
                manager.binary().cyan(),
                if present { "present".green() } else { "absent".dimmed() }
            );
            present
        })
        .collect()
}

/// Side-effect-free presence probe: a binary counts as present when it can be
/// spawned with `--version` at all. The exit status is deliberately ignored;
/// some managers exit non-zero on `--version` but are perfectly usable.
fn binary_answers(binary: &str) -> bool {
    Command::new(binary).arg("--version").output().is_ok()
}
