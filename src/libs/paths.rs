// Home-anchored filesystem layout. Every path this tool persists to lives
// under the user's home directory: the sovereign directory for artifacts and
// launchers, and the token file the fetched commands read at startup.

// Imports the `Colorize` trait for adding color to console output.
use colored::Colorize;
// Provides `PathBuf` for working with file paths.
use std::path::PathBuf;
// Custom logging macros for various log levels.
use crate::log_debug;
// Fatal-failure taxonomy; a missing home directory is unrecoverable here.
use crate::errors::SetupError;

/// Returns the sovereign base directory, `~/.sovereign`.
/// `state` and configuration of the fetched commands live elsewhere
/// (`~/.config/axis-mundi`, owned by the artifacts themselves); this
/// directory exists purely to hold runnable files.
pub fn sovereign_dir() -> Result<PathBuf, SetupError> {
    let home = dirs::home_dir().ok_or(SetupError::HomeDirMissing)?;
    Ok(home.join(".sovereign"))
}

/// Returns the binary directory, `~/.sovereign/bin`: the one directory that
/// goes on the PATH and receives both artifacts and their launchers.
pub fn bin_dir() -> Result<PathBuf, SetupError> {
    Ok(sovereign_dir()?.join("bin"))
}

/// Returns the fixed per-user credential path, `~/.axis-token`.
/// The fetched commands check this file before falling back to the
/// AXIS_TOKEN environment variable, so the installer must honor the
/// same precedence when provisioning it.
pub fn credential_path() -> Result<PathBuf, SetupError> {
    let home = dirs::home_dir().ok_or(SetupError::HomeDirMissing)?;
    Ok(home.join(".axis-token"))
}

/// Resolves the binary directory, honoring a user-supplied `--bin-dir`
/// override with tilde expansion.
pub fn resolve_bin_dir(override_dir: Option<String>) -> Result<PathBuf, SetupError> {
    let resolved = match override_dir {
        Some(dir) => PathBuf::from(shellexpand::tilde(&dir).into_owned()),
        None => bin_dir()?,
    };
    log_debug!("[Paths] Binary directory resolved to: {}", resolved.display().to_string().cyan());
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_default() {
        let resolved = resolve_bin_dir(Some("/opt/sovereign/bin".to_string())).unwrap();
        assert_eq!(resolved, PathBuf::from("/opt/sovereign/bin"));
    }

    #[test]
    fn override_expands_tilde() {
        let resolved = resolve_bin_dir(Some("~/custom/bin".to_string())).unwrap();
        assert!(!resolved.to_string_lossy().starts_with('~'));
        assert!(resolved.ends_with("custom/bin"));
    }

    #[test]
    fn bin_dir_sits_under_sovereign_dir() {
        let bin = bin_dir().unwrap();
        assert!(bin.starts_with(sovereign_dir().unwrap()));
        assert!(bin.ends_with("bin"));
    }
}
