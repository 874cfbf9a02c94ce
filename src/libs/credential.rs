// This module provisions the credential file the fetched commands read at
// startup. Source precedence is fixed and mirrors how the commands
// themselves resolve the token: an existing file always wins, the
// environment variable fills an absent file, and with neither present the
// stage defers and the user is told both supply routes.
//
// A file-sourced value is never overwritten, not even when the environment
// variable disagrees with its contents. Only an absent file may be written.

// Imports the `Colorize` trait for adding color to console output.
use colored::Colorize;
use std::fs;
use std::io;
use std::path::Path;

use crate::errors::SetupError;
use crate::schema::{CredentialRecord, CredentialSource};
use crate::{log_info, log_warn};

/// The environment variable that can seed an absent token file.
pub const TOKEN_ENV: &str = "AXIS_TOKEN";

/// Establishes the credential file, honoring the fixed precedence.
/// `env_value` is passed in (rather than read here) so the decision logic
/// stays a pure function of its inputs.
pub fn provision(path: &Path, env_value: Option<&str>) -> Result<CredentialRecord, SetupError> {
    if path.exists() {
        log_info!(
            "[Credential] Token file {} already present; leaving it untouched.",
            path.display().to_string().green()
        );
        return Ok(CredentialRecord {
            path: path.to_path_buf(),
            source: CredentialSource::ExistingFile,
        });
    }

    match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => {
            write_token(path, value)
                .map_err(|e| SetupError::io(format!("writing {}", path.display()), e))?;
            log_info!(
                "[Credential] Wrote token from ${} to {}",
                TOKEN_ENV.cyan(),
                path.display().to_string().green()
            );
            Ok(CredentialRecord {
                path: path.to_path_buf(),
                source: CredentialSource::Environment,
            })
        }
        None => {
            log_warn!("[Credential] No token file and ${} is not set.", TOKEN_ENV.yellow());
            Ok(CredentialRecord {
                path: path.to_path_buf(),
                source: CredentialSource::Deferred,
            })
        }
    }
}

/// Writes the token with owner-only permissions. The trailing newline
/// matches what the consuming commands strip on read.
fn write_token(path: &Path, value: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{value}\n"))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn an_existing_file_wins_over_the_environment() {
        let home = tempfile::tempdir().unwrap();
        let path = home.path().join(".axis-token");
        fs::write(&path, "tok-123\n").unwrap();

        let record = provision(&path, Some("tok-999")).unwrap();

        assert_eq!(record.source, CredentialSource::ExistingFile);
        assert_eq!(fs::read_to_string(&path).unwrap(), "tok-123\n");
    }

    #[test]
    fn the_environment_fills_an_absent_file() {
        let home = tempfile::tempdir().unwrap();
        let path = home.path().join(".axis-token");

        let record = provision(&path, Some("tok-abc")).unwrap();

        assert_eq!(record.source, CredentialSource::Environment);
        assert_eq!(fs::read_to_string(&path).unwrap(), "tok-abc\n");
    }

    #[cfg(unix)]
    #[test]
    fn a_fresh_token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let home = tempfile::tempdir().unwrap();
        let path = home.path().join(".axis-token");

        provision(&path, Some("tok-abc")).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn nothing_to_provision_defers() {
        let home = tempfile::tempdir().unwrap();
        let path = home.path().join(".axis-token");

        assert_eq!(provision(&path, None).unwrap().source, CredentialSource::Deferred);
        assert_eq!(provision(&path, Some("  ")).unwrap().source, CredentialSource::Deferred);
        assert!(!path.exists());
    }

    #[test]
    fn provisioning_twice_is_idempotent() {
        let home = tempfile::tempdir().unwrap();
        let path = home.path().join(".axis-token");

        provision(&path, Some("tok-first")).unwrap();
        let second = provision(&path, Some("tok-second")).unwrap();

        assert_eq!(second.source, CredentialSource::ExistingFile);
        assert_eq!(fs::read_to_string(&path).unwrap(), "tok-first\n");
    }
}
