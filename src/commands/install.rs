// This file contains the primary logic for the `setup-sovereign install`
// command. It runs the provisioning pipeline in its fixed order: profile the
// platform, resolve the runtime, provision the HTTP library, fetch the
// artifacts, put the binary directory on the PATH, generate the launchers,
// and establish the credential file. Control flows strictly forward: the
// first fatal stage error aborts the run, and no stage rolls back a
// predecessor. Every stage is idempotent or overwrite-safe, so re-running
// after a failure is always the right remedy.

use anyhow::{Context, Result};
use colored::Colorize;
use std::env;
use std::fs;
use std::path::Path;

use crate::libs::{credential, fetch, path_env, paths, platform, pylib, runtime, wrappers};
use crate::schema::{
    CommandWrapper, CredentialRecord, CredentialSource, PlatformProfile, RemoteArtifact,
    ResolvedRuntime,
};
use crate::{log_debug, log_info};

/// Default remote source for the artifacts. Overridable per invocation with
/// `--server` (or SOVEREIGN_SERVER), mainly for self-hosted mirrors.
pub const DEFAULT_SERVER: &str = "https://axismundi.fun";

/// The two artifacts this installer exists to provision: the sovereign
/// terminal itself and the cherub pattern watcher. Each becomes a bare
/// command through a generated launcher.
const ARTIFACT_FILES: [(&str, &str); 2] = [("sovereign", "sovereign.py"), ("cherub", "cherub.py")];

/// Main entry point for the `install` command.
///
/// # Workflow:
/// 1. **Platform profile**: computed once, consumed by every later stage.
/// 2. **Runtime resolution**: Python 3 plus pip, package-manager fallback.
/// 3. **HTTP library**: `requests` importable under the resolved runtime.
/// 4. **Artifact fetch**: both files downloaded into the binary directory.
/// 5. **PATH provisioning**: persistent and in-process.
/// 6. **Launcher generation**: regenerated unconditionally.
/// 7. **Credential**: token file established with fixed precedence.
pub fn run(server: String, bin_dir_override: Option<String>) -> Result<()> {
    banner();

    // Stage 1: platform profile. Never fails; unknown hosts degrade to a
    // POSIX-like profile.
    let profile = platform::profile();
    log_info!(
        "[Platform] {} host, {} shell, {} package manager(s) detected",
        profile.os_name.cyan().bold(),
        profile.shell.label().cyan(),
        profile.package_managers.len().to_string().bold()
    );

    // Stage 2: the scripting runtime and its package-index client.
    let rt = runtime::resolve(&profile).context("resolving the Python runtime")?;

    // Stage 3: the HTTP client library the artifacts import.
    pylib::ensure(&rt, profile.os).context("provisioning the requests library")?;

    // Stages 4-6 all work inside the binary directory.
    let bin_dir = paths::resolve_bin_dir(bin_dir_override)?;
    fs::create_dir_all(&bin_dir)
        .with_context(|| format!("creating binary directory {}", bin_dir.display()))?;

    // Stage 4: fetch both artifacts, overwriting any prior copies.
    let artifacts = artifact_set(&server, &bin_dir);
    fetch::fetch_all(&artifacts).context("fetching the sovereign artifacts")?;

    // Stage 5: PATH membership, declared as a single upsert target.
    let entry = path_env::path_entry(&bin_dir)?;
    path_env::provision(&profile, &entry).context("provisioning the PATH")?;

    // Stage 6: launchers, regenerated against the runtime resolved this run.
    let launcher_set = wrapper_set(&rt, &artifacts);
    wrappers::generate_all(&launcher_set, profile.os, &bin_dir)
        .context("generating command launchers")?;

    // Stage 7: the credential file. File wins, environment fills, else defer.
    let token_path = paths::credential_path()?;
    let env_value = env::var(credential::TOKEN_ENV).ok();
    let record = credential::provision(&token_path, env_value.as_deref())
        .context("provisioning the credential file")?;

    summary(&profile, &bin_dir, &record);
    Ok(())
}

/// Builds the fixed artifact set for this run. Destinations are unique per
/// logical name and live directly in the binary directory.
fn artifact_set(server: &str, bin_dir: &Path) -> Vec<RemoteArtifact> {
    ARTIFACT_FILES
        .iter()
        .map(|(name, file)| RemoteArtifact {
            name: (*name).to_string(),
            url: format!("{}/install/{}", server.trim_end_matches('/'), file),
            dest: bin_dir.join(file),
            executable: true,
        })
        .collect()
}

/// Pairs each fetched artifact with its launcher, embedding the resolved
/// runtime binary.
fn wrapper_set(rt: &ResolvedRuntime, artifacts: &[RemoteArtifact]) -> Vec<CommandWrapper> {
    artifacts
        .iter()
        .map(|artifact| CommandWrapper {
            command: artifact.name.clone(),
            interpreter: rt.binary.clone(),
            target: artifact.dest.clone(),
        })
        .collect()
}

fn banner() {
    eprintln!();
    eprintln!(
        "  {} {} {}",
        "SOVEREIGN".bright_magenta().bold(),
        "·".dimmed(),
        "zero-config setup for your terminal AI stack".dimmed()
    );
    eprintln!();
}

/// Success-path guidance. Always names the two commands and the
/// new-session note; the credential lines depend on how stage 7 resolved.
fn summary(profile: &PlatformProfile, bin_dir: &Path, record: &CredentialRecord) {
    log_debug!("[Install] Pipeline completed; printing summary.");
    eprintln!();
    log_info!("{}", "Setup complete.".green().bold());
    log_info!("Binary directory: {}", bin_dir.display().to_string().cyan());
    match profile.os {
        crate::schema::OsFamily::Posix => {
            log_info!("Open a new shell (or source your startup file), then run {} or {}.",
                "sovereign".bright_magenta().bold(),
                "cherub".bright_magenta().bold()
            );
        }
        crate::schema::OsFamily::Windows => {
            log_info!("Open a new terminal, then run {} or {}.",
                "sovereign".bright_magenta().bold(),
                "cherub".bright_magenta().bold()
            );
        }
    }
    match record.source {
        CredentialSource::ExistingFile => {
            log_info!("Token: using the existing {}", record.path.display().to_string().green());
        }
        CredentialSource::Environment => {
            log_info!("Token: written to {}", record.path.display().to_string().green());
        }
        CredentialSource::Deferred => {
            log_info!("Token: not configured yet. Either route works later:");
            log_info!("  export {}=<your-token>   (picked up on the next run)", credential::TOKEN_ENV.cyan());
            log_info!("  or write it to {}", record.path.display().to_string().cyan());
        }
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;
    use std::path::PathBuf;

    #[test]
    fn artifact_set_covers_both_commands_with_unique_destinations() {
        let bin = PathBuf::from("/home/u/.sovereign/bin");
        let set = artifact_set(DEFAULT_SERVER, &bin);

        assert_eq!(set.len(), 2);
        assert_eq!(set[0].url, "https://axismundi.fun/install/sovereign.py");
        assert_eq!(set[1].url, "https://axismundi.fun/install/cherub.py");
        assert_ne!(set[0].dest, set[1].dest);
        assert!(set.iter().all(|a| a.executable));
        assert!(set.iter().all(|a| a.dest.starts_with(&bin)));
    }

    #[test]
    fn a_trailing_slash_on_the_server_does_not_double_up() {
        let set = artifact_set("https://mirror.example/", Path::new("/tmp/bin"));
        assert_eq!(set[0].url, "https://mirror.example/install/sovereign.py");
    }

    #[test]
    fn wrappers_embed_the_resolved_runtime() {
        let rt = ResolvedRuntime {
            binary: "python3".to_string(),
            version: Version::new(3, 12, 4),
        };
        let artifacts = artifact_set(DEFAULT_SERVER, Path::new("/home/u/.sovereign/bin"));
        let set = wrapper_set(&rt, &artifacts);

        let commands: Vec<_> = set.iter().map(|w| w.command.as_str()).collect();
        assert_eq!(commands, ["sovereign", "cherub"]);
        assert!(set.iter().all(|w| w.interpreter == "python3"));
        assert_eq!(set[0].target, artifacts[0].dest);
    }
}
