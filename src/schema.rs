// src/schema.rs
// This file is the blueprint for everything the provisioning pipeline works with:
// the platform profile computed once per run, the package managers we can fall
// back to, the remote artifacts we fetch, and the records the later stages
// hand back. All of it is derived fresh each run from host inspection and the
// fixed remote configuration; nothing here is persisted between runs.

use semver::Version;
use std::path::PathBuf;

/// Broad OS classification the rest of the pipeline branches on, exactly once.
/// Anything that is not Windows is treated as POSIX-like; unknown platforms
/// degrade to `Posix` on a best-effort basis rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Posix,
    Windows,
}

/// The user's login shell flavor, read from environment signals.
/// Only used to pick which startup files to look at and to word the
/// post-install guidance; it never gates functionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
    /// POSIX-ish shell we could not classify further.
    Sh,
    /// Windows command processor (cmd / PowerShell).
    Cmd,
}

impl ShellKind {
    pub fn label(&self) -> &'static str {
        match self {
            ShellKind::Bash => "bash",
            ShellKind::Zsh => "zsh",
            ShellKind::Fish => "fish",
            ShellKind::Sh => "sh",
            ShellKind::Cmd => "cmd",
        }
    }
}

/// Everything later stages need to know about the host, computed once by the
/// platform profiler and immutable afterwards.
#[derive(Debug, Clone)]
pub struct PlatformProfile {
    pub os: OsFamily,
    /// The raw OS identifier (`linux`, `macos`, `windows`, ...), kept for logging.
    pub os_name: String,
    pub shell: ShellKind,
    /// Package managers actually present on this host, in install-priority
    /// order. May be empty; that only matters if the runtime is also missing.
    pub package_managers: Vec<PackageManager>,
}

/// Every system package manager the resolver knows how to drive.
/// The per-family priority order lives in `priority_for`; the concrete
/// install invocation for the Python runtime lives in `install_command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Brew,
    AptGet,
    Dnf,
    Yum,
    Pacman,
    Zypper,
    Apk,
    Winget,
    Choco,
    Scoop,
}

impl PackageManager {
    /// The executable probed for on the PATH.
    pub fn binary(&self) -> &'static str {
        match self {
            PackageManager::Brew => "brew",
            PackageManager::AptGet => "apt-get",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
            PackageManager::Apk => "apk",
            PackageManager::Winget => "winget",
            PackageManager::Choco => "choco",
            PackageManager::Scoop => "scoop",
        }
    }

    /// Candidate managers for an OS family, highest priority first:
    /// the platform-native managed installer leads, source-level managers
    /// follow, fallbacks close the list. Detection preserves this order,
    /// so "first detected" and "highest-priority present" are the same thing.
    pub fn priority_for(os: OsFamily, os_name: &str) -> &'static [PackageManager] {
        match os {
            OsFamily::Windows => &[
                PackageManager::Winget,
                PackageManager::Choco,
                PackageManager::Scoop,
            ],
            OsFamily::Posix if os_name == "macos" => &[PackageManager::Brew],
            OsFamily::Posix => &[
                PackageManager::AptGet,
                PackageManager::Dnf,
                PackageManager::Yum,
                PackageManager::Pacman,
                PackageManager::Zypper,
                PackageManager::Apk,
            ],
        }
    }

    /// The full argv that installs the Python 3 runtime through this manager.
    /// System-level managers on POSIX need sudo; brew refuses to run under it.
    pub fn install_command(&self) -> Vec<&'static str> {
        match self {
            PackageManager::Brew => vec!["brew", "install", "python3"],
            PackageManager::AptGet => vec!["sudo", "apt-get", "install", "-y", "python3"],
            PackageManager::Dnf => vec!["sudo", "dnf", "install", "-y", "python3"],
            PackageManager::Yum => vec!["sudo", "yum", "install", "-y", "python3"],
            PackageManager::Pacman => vec!["sudo", "pacman", "-S", "--noconfirm", "python"],
            PackageManager::Zypper => vec!["sudo", "zypper", "install", "-y", "python3"],
            PackageManager::Apk => vec!["sudo", "apk", "add", "python3"],
            PackageManager::Winget => vec![
                "winget",
                "install",
                "-e",
                "--id",
                "Python.Python.3.12",
                "--accept-package-agreements",
                "--accept-source-agreements",
            ],
            PackageManager::Choco => vec!["choco", "install", "-y", "python3"],
            PackageManager::Scoop => vec!["scoop", "install", "python"],
        }
    }
}

/// Probe specification for the scripting runtime: candidate binary names in
/// probe order, plus the minimum acceptable major version. The probe itself
/// is side-effect-free and runs both before and after an install attempt,
/// so its results are directly comparable across the two passes.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeSpec {
    pub candidates: &'static [&'static str],
    pub minimum_major: u64,
}

impl RuntimeSpec {
    /// The one runtime this installer cares about. `python3` is the modern
    /// spelling everywhere; plain `python` still answers on some
    /// distributions and on Windows installs.
    pub fn python() -> Self {
        RuntimeSpec {
            candidates: &["python3", "python"],
            minimum_major: 3,
        }
    }
}

/// A runtime binary that answered its version probe and met the minimum
/// predicate. The binary name is embedded into every generated launcher,
/// which is why launchers are regenerated unconditionally each run.
#[derive(Debug, Clone)]
pub struct ResolvedRuntime {
    pub binary: String,
    pub version: Version,
}

/// One remote file the fetcher pulls down and places locally.
/// Destinations are unique per logical name; a re-fetch always truncates
/// whatever is already at `dest`, regardless of its content.
#[derive(Debug, Clone)]
pub struct RemoteArtifact {
    pub name: String,
    pub url: String,
    pub dest: PathBuf,
    pub executable: bool,
}

/// Desired PATH membership: one directory, plus the startup files that
/// should carry it on a POSIX host. The provisioner computes the minimal
/// edit (usually none) that makes each existing target reference the
/// directory exactly once.
#[derive(Debug, Clone)]
pub struct PathEntry {
    pub dir: PathBuf,
    pub startup_files: Vec<PathBuf>,
}

/// Where the credential value (if any) came from this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// A token file already existed; it always wins and is never rewritten.
    ExistingFile,
    /// The file was freshly written from the environment variable.
    Environment,
    /// Neither file nor environment variable present; the user gets guidance.
    Deferred,
}

/// Outcome of the credential stage, used to word the final summary.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub path: PathBuf,
    pub source: CredentialSource,
}

/// A thin launcher tying a bare command name to the resolved runtime and a
/// fetched artifact. Cheap to write and always correct, so it is regenerated
/// on every run rather than idempotence-checked.
#[derive(Debug, Clone)]
pub struct CommandWrapper {
    pub command: String,
    pub interpreter: String,
    pub target: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_priority_leads_with_winget() {
        let order = PackageManager::priority_for(OsFamily::Windows, "windows");
        assert_eq!(order.first(), Some(&PackageManager::Winget));
        assert_eq!(order.last(), Some(&PackageManager::Scoop));
    }

    #[test]
    fn macos_uses_brew_only() {
        let order = PackageManager::priority_for(OsFamily::Posix, "macos");
        assert_eq!(order, &[PackageManager::Brew]);
    }

    #[test]
    fn linux_priority_leads_with_apt_get() {
        let order = PackageManager::priority_for(OsFamily::Posix, "linux");
        assert_eq!(order.first(), Some(&PackageManager::AptGet));
        assert!(order.contains(&PackageManager::Pacman));
    }

    #[test]
    fn brew_install_command_never_uses_sudo() {
        assert_eq!(PackageManager::Brew.install_command().first(), Some(&"brew"));
    }

    #[test]
    fn posix_system_managers_escalate_with_sudo() {
        for manager in [PackageManager::AptGet, PackageManager::Dnf, PackageManager::Apk] {
            assert_eq!(manager.install_command().first(), Some(&"sudo"));
        }
    }
}
