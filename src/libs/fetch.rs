// This module downloads the sovereign artifacts over HTTPS and places them
// in the binary directory. Downloads stream straight to their destination:
// `File::create` truncates whatever was there before, which is exactly the
// overwrite contract: every run fully replaces both artifacts, no diffing,
// no versioning, no checksum. Any 200 response is trusted; transport-level
// encryption is the only verification performed.
//
// Failures are fatal with no retry. The pipeline is overwrite-safe end to
// end, so the documented remedy for a flaky network is simply re-running.

// Imports the `Colorize` trait for adding color to console output.
use colored::Colorize;
// For creating and truncating the destination files.
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use crate::errors::SetupError;
use crate::schema::RemoteArtifact;
use crate::{log_debug, log_info};

/// Fetches every artifact in order, aborting on the first failure.
pub fn fetch_all(artifacts: &[RemoteArtifact]) -> Result<(), SetupError> {
    for artifact in artifacts {
        fetch_one(artifact)?;
    }
    Ok(())
}

/// Downloads a single artifact to its destination, creating parent
/// directories as needed and marking the file executable when flagged.
fn fetch_one(artifact: &RemoteArtifact) -> Result<(), SetupError> {
    log_info!(
        "[Fetch] Downloading {} from {}",
        artifact.name.cyan().bold(),
        artifact.url.blue()
    );

    // Execute the HTTP GET request using the `ureq` library.
    // ureq reports non-2xx statuses through its error type, so both network
    // failures and bad statuses land in the same fatal arm.
    let response = ureq::get(&artifact.url).call().map_err(|e| {
        let reason = match &e {
            ureq::Error::Status(code, _) => format!("server returned HTTP {code}"),
            other => other.to_string(),
        };
        SetupError::DownloadFailed {
            url: artifact.url.clone(),
            reason,
        }
    })?;

    if let Some(parent) = artifact.dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| SetupError::io(format!("creating {}", parent.display()), e))?;
    }

    let written = write_stream(response.into_reader(), &artifact.dest)
        .map_err(|e| SetupError::io(format!("writing {}", artifact.dest.display()), e))?;
    log_debug!(
        "[Fetch] Wrote {} bytes to {}",
        written.to_string().bold(),
        artifact.dest.display().to_string().green()
    );

    if artifact.executable {
        mark_executable(&artifact.dest)
            .map_err(|e| SetupError::io(format!("chmod {}", artifact.dest.display()), e))?;
    }
    Ok(())
}

/// Streams a reader into `dest`. `File::create` truncates an existing file,
/// so stale content is replaced byte-for-byte by the new body.
pub(crate) fn write_stream(mut reader: impl Read, dest: &Path) -> io::Result<u64> {
    let mut file = File::create(dest)?;
    io::copy(&mut reader, &mut file)
}

/// Sets 0o755 (rwxr-xr-x) on POSIX hosts. Windows has no executable bit;
/// invocability there comes from the generated `.cmd` launcher instead.
pub(crate) fn mark_executable(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_stream_replaces_stale_content_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("sovereign.py");

        // A stale copy that is longer than the fresh body, so truncation
        // (not just positional overwrite) is what the assertion exercises.
        fs::write(&dest, b"stale content that is much longer than the replacement").unwrap();

        let fresh: &[u8] = b"#!/usr/bin/env python3\nprint('hi')\n";
        let written = write_stream(fresh, &dest).unwrap();

        assert_eq!(written, fresh.len() as u64);
        assert_eq!(fs::read(&dest).unwrap(), fresh);
    }

    #[test]
    fn write_stream_creates_a_missing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("cherub.py");
        write_stream(&b"body"[..], &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"body");
    }

    #[cfg(unix)]
    #[test]
    fn mark_executable_sets_the_user_execute_bit() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("artifact");
        fs::write(&dest, b"x").unwrap();
        mark_executable(&dest).unwrap();
        let mode = fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o755, 0o755);
    }
}
