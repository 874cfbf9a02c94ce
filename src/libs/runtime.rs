// This module is the dependency resolver for the scripting runtime.
// The fetched sovereign artifacts are Python programs, so before anything is
// downloaded the pipeline must end up with a Python 3 interpreter and a
// working pip underneath it. Probing is strictly side-effect-free and is run
// both before and after any install attempt; the only mutation this module
// performs is invoking a system package manager.

// Imports the `Colorize` trait for adding color to console output.
use colored::Colorize;
// `semver::Version` backs the minimum-version predicate (major >= 3).
use semver::Version;
// For executing external commands (runtime probes, package-manager installs).
use std::process::Command;

// Custom logging macros for the per-stage status lines.
use crate::errors::SetupError;
use crate::schema::{PackageManager, PlatformProfile, ResolvedRuntime, RuntimeSpec};
use crate::{log_debug, log_error, log_info, log_warn};

/// Resolves the Python runtime for this host.
///
/// # Workflow:
/// 1. **Probe**: try each candidate binary; first one meeting the predicate wins.
/// 2. **Fallback install**: if none answered, invoke the install command of
///    the first package manager detected on the host (the profile keeps them
///    in priority order, so "first" is also "highest priority").
/// 3. **Re-probe**: run the identical probe again; probes never mutate state,
///    so before/after results are directly comparable.
/// 4. **pip bootstrap**: make sure the package-index client responds under
///    the resolved runtime, running `ensurepip` once if it does not.
///
/// A missing runtime after step 3 is terminal and non-retried: with no manager
/// left to try, the only remedy is a manual install, and the error's remedy
/// text says exactly that.
pub fn resolve(profile: &PlatformProfile) -> Result<ResolvedRuntime, SetupError> {
    log_info!("[Runtime] Looking for a Python 3 runtime...");
    let spec = RuntimeSpec::python();

    if let Some(runtime) = probe_candidates(&spec) {
        log_info!(
            "[Runtime] Found {} {}",
            runtime.binary.cyan().bold(),
            runtime.version.to_string().green()
        );
        ensure_pip(&runtime)?;
        return Ok(runtime);
    }

    log_warn!("[Runtime] No usable runtime on the PATH; falling back to a package manager install.");
    let manager = select_manager(&profile.package_managers).ok_or(SetupError::NoPackageManager)?;
    install_runtime_via(manager)?;

    // Identical probe, second pass. A runtime that is still missing here is
    // an unrecoverable environment gap.
    let runtime = probe_candidates(&spec).ok_or_else(|| SetupError::RuntimeMissing {
        probed: spec.candidates.join(", "),
    })?;
    log_info!(
        "[Runtime] Installed {} {} via {}",
        runtime.binary.cyan().bold(),
        runtime.version.to_string().green(),
        manager.binary().cyan()
    );
    ensure_pip(&runtime)?;
    Ok(runtime)
}

/// Picks the install route: the first manager present on the host.
/// The detected list is already in priority order, which makes this a plain
/// `first()`, and makes the ordering property trivially testable.
pub fn select_manager(detected: &[PackageManager]) -> Option<PackageManager> {
    detected.first().copied()
}

/// Probes every candidate binary and returns the first that satisfies the
/// version predicate. Pure inspection; safe to call any number of times.
fn probe_candidates(spec: &RuntimeSpec) -> Option<ResolvedRuntime> {
    for candidate in spec.candidates {
        match probe_version(candidate) {
            Some(version) if version.major >= spec.minimum_major => {
                return Some(ResolvedRuntime {
                    binary: candidate.to_string(),
                    version,
                });
            }
            Some(version) => {
                log_debug!(
                    "[Runtime] {} reports {}, below the required major version {}",
                    candidate.cyan(),
                    version.to_string().yellow(),
                    spec.minimum_major
                );
            }
            None => {
                log_debug!("[Runtime] {} did not answer a version probe", candidate.dimmed());
            }
        }
    }
    None
}

/// Runs `<binary> --version` and parses the reported version.
/// Python 2 prints its version to stderr, so both streams are considered.
fn probe_version(binary: &str) -> Option<Version> {
    let output = Command::new(binary).arg("--version").output().ok()?;
    let text = if output.stdout.is_empty() {
        String::from_utf8_lossy(&output.stderr).into_owned()
    } else {
        String::from_utf8_lossy(&output.stdout).into_owned()
    };
    parse_reported_version(&text)
}

/// Extracts a semver-comparable version out of interpreter output such as
/// `Python 3.12.4` or `Python 3.13.0rc1`. Missing components are padded with
/// zeros; trailing non-digit noise on a component is dropped.
pub(crate) fn parse_reported_version(text: &str) -> Option<Version> {
    let token = text
        .split_whitespace()
        .find(|t| t.starts_with(|c: char| c.is_ascii_digit()))?;

    let mut parts = [0u64; 3];
    for (i, component) in token.split('.').take(3).enumerate() {
        let digits: String = component.chars().take_while(|c| c.is_ascii_digit()).collect();
        parts[i] = digits.parse().ok()?;
    }
    Version::parse(&format!("{}.{}.{}", parts[0], parts[1], parts[2])).ok()
}

/// Invokes the manager's install command for the runtime and checks its exit
/// status. This is the one place the resolver mutates the system, and it may
/// run privileged (sudo on POSIX system managers).
fn install_runtime_via(manager: PackageManager) -> Result<(), SetupError> {
    let argv = manager.install_command();
    log_info!("[Runtime] Executing: {}", argv.join(" ").cyan());

    let output = Command::new(argv[0])
        .args(&argv[1..])
        .output()
        .map_err(|e| SetupError::io(format!("spawning '{}'", argv[0]), e))?;

    if output.status.success() {
        log_debug!("[Runtime] {} finished successfully", manager.binary().cyan());
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    log_error!(
        "[Runtime] {} failed: {}",
        manager.binary().red().bold(),
        stderr.trim().red()
    );
    Err(SetupError::PackageInstallFailed {
        manager: manager.binary().to_string(),
        package: "python3".to_string(),
        code: output.status.code().unwrap_or(-1),
    })
}

/// Makes sure the package-index client answers under the resolved runtime,
/// bootstrapping it with `ensurepip` when it does not. pip still missing
/// after the bootstrap is terminal: the library stage cannot run without it.
fn ensure_pip(runtime: &ResolvedRuntime) -> Result<(), SetupError> {
    if pip_available(&runtime.binary) {
        log_debug!("[Runtime] pip already available under {}", runtime.binary.cyan());
        return Ok(());
    }

    log_info!("[Runtime] pip missing; bootstrapping with {} -m ensurepip", runtime.binary.cyan());
    let bootstrap = Command::new(&runtime.binary)
        .args(["-m", "ensurepip", "--upgrade"])
        .output()
        .map_err(|e| SetupError::io(format!("spawning '{} -m ensurepip'", runtime.binary), e))?;
    if !bootstrap.status.success() {
        log_warn!(
            "[Runtime] ensurepip exited with {}: {}",
            bootstrap.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&bootstrap.stderr).trim().yellow()
        );
    }

    if pip_available(&runtime.binary) {
        Ok(())
    } else {
        Err(SetupError::PipMissing {
            runtime: runtime.binary.clone(),
        })
    }
}

/// Probe for the package-index client: `<runtime> -m pip --version`.
pub(crate) fn pip_available(runtime_binary: &str) -> bool {
    Command::new(runtime_binary)
        .args(["-m", "pip", "--version"])
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plain_release_version() {
        let v = parse_reported_version("Python 3.12.4").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (3, 12, 4));
    }

    #[test]
    fn parses_a_two_component_version() {
        let v = parse_reported_version("Python 3.9").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (3, 9, 0));
    }

    #[test]
    fn strips_prerelease_noise_from_components() {
        let v = parse_reported_version("Python 3.13.0rc1").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (3, 13, 0));
    }

    #[test]
    fn rejects_output_without_a_version() {
        assert!(parse_reported_version("no interpreter here").is_none());
        assert!(parse_reported_version("").is_none());
    }

    #[test]
    fn python2_would_fail_the_predicate() {
        let v = parse_reported_version("Python 2.7.18").unwrap();
        assert!(v.major < RuntimeSpec::python().minimum_major);
    }

    #[test]
    fn selects_the_first_detected_manager_only() {
        // A host where only the second- and third-priority linux managers are
        // present: the detected list starts at dnf, so dnf must be selected,
        // never apt-get (absent) and never yum (lower priority).
        let detected = vec![PackageManager::Dnf, PackageManager::Yum];
        assert_eq!(select_manager(&detected), Some(PackageManager::Dnf));
    }

    #[test]
    fn empty_manager_list_selects_nothing() {
        assert_eq!(select_manager(&[]), None);
    }
}
