// This module emits the thin command launchers that make the fetched
// artifacts invocable as bare command names. A launcher does exactly one
// thing: hand every argument, unchanged, to the resolved runtime running the
// artifact. Launchers embed the runtime binary that was resolved *this* run,
// so they are regenerated unconditionally every time. Regeneration is cheap
// and always correct, which beats an idempotence check that could go stale.

// Imports the `Colorize` trait for adding color to console output.
use colored::Colorize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::errors::SetupError;
use crate::libs::fetch::mark_executable;
use crate::libs::path_env::MARKER;
use crate::schema::{CommandWrapper, OsFamily};
use crate::log_info;

/// Writes a launcher for every wrapper, overwriting whatever is there.
pub fn generate_all(
    wrappers: &[CommandWrapper],
    os: OsFamily,
    bin_dir: &Path,
) -> Result<(), SetupError> {
    for wrapper in wrappers {
        let path = wrapper_path(bin_dir, &wrapper.command, os);
        let contents = match os {
            OsFamily::Posix => render_posix(wrapper),
            OsFamily::Windows => render_batch(wrapper),
        };
        write_wrapper(&path, &contents, os)
            .map_err(|e| SetupError::io(format!("writing launcher {}", path.display()), e))?;
        log_info!(
            "[Wrappers] Generated launcher {} -> {}",
            wrapper.command.cyan().bold(),
            wrapper.target.display().to_string().dimmed()
        );
    }
    Ok(())
}

/// Where the launcher for a command lives. Windows needs the `.cmd`
/// extension for the shell to consider the file runnable.
pub fn wrapper_path(bin_dir: &Path, command: &str, os: OsFamily) -> PathBuf {
    match os {
        OsFamily::Posix => bin_dir.join(command),
        OsFamily::Windows => bin_dir.join(format!("{command}.cmd")),
    }
}

/// A direct-execution POSIX launcher. `exec` replaces the shell with the
/// runtime, and `"$@"` forwards all trailing arguments with quoting intact.
pub(crate) fn render_posix(wrapper: &CommandWrapper) -> String {
    format!(
        "#!/bin/sh\n{MARKER}\nexec \"{}\" \"{}\" \"$@\"\n",
        wrapper.interpreter,
        wrapper.target.display()
    )
}

/// A batch-style launcher for windows-like hosts. `%*` is the batch
/// equivalent of `"$@"`.
pub(crate) fn render_batch(wrapper: &CommandWrapper) -> String {
    format!(
        "@echo off\nrem {}\n\"{}\" \"{}\" %*\n",
        MARKER.trim_start_matches("# "),
        wrapper.interpreter,
        wrapper.target.display()
    )
}

/// Creates (truncating) the launcher file and, on POSIX, marks it executable.
fn write_wrapper(path: &Path, contents: &str, os: OsFamily) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    drop(file);
    if os == OsFamily::Posix {
        mark_executable(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample(target: &Path) -> CommandWrapper {
        CommandWrapper {
            command: "sovereign".to_string(),
            interpreter: "python3".to_string(),
            target: target.to_path_buf(),
        }
    }

    #[test]
    fn posix_launcher_execs_the_runtime_and_forwards_arguments() {
        let rendered = render_posix(&sample(Path::new("/home/u/.sovereign/bin/sovereign.py")));
        assert!(rendered.starts_with("#!/bin/sh\n"));
        assert!(rendered.contains("exec \"python3\" \"/home/u/.sovereign/bin/sovereign.py\" \"$@\""));
        assert!(rendered.contains(MARKER));
    }

    #[test]
    fn batch_launcher_forwards_arguments() {
        let rendered = render_batch(&sample(Path::new(r"C:\Users\u\.sovereign\bin\sovereign.py")));
        assert!(rendered.starts_with("@echo off\n"));
        assert!(rendered.ends_with("%*\n"));
    }

    #[test]
    fn regeneration_overwrites_a_stale_launcher() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("sovereign.py");
        let wrapper = sample(&target);
        let path = wrapper_path(dir.path(), &wrapper.command, OsFamily::Posix);

        fs::write(&path, "#!/bin/sh\nexec \"python2\" \"/old/path\" \"$@\"\n").unwrap();
        generate_all(std::slice::from_ref(&wrapper), OsFamily::Posix, dir.path()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("python3"));
        assert!(!contents.contains("python2"));
    }

    #[test]
    fn windows_launcher_gets_the_cmd_extension() {
        let path = wrapper_path(Path::new(r"C:\bin"), "cherub", OsFamily::Windows);
        assert!(path.to_string_lossy().ends_with("cherub.cmd"));
    }

    // End-to-end forwarding check: the generated launcher runs a stand-in
    // "runtime" (/bin/sh) against a stand-in "artifact" that prints its
    // arguments one per line, and the launcher must pass them through
    // unchanged, including an argument containing a space.
    #[cfg(unix)]
    #[test]
    fn generated_launcher_forwards_arbitrary_trailing_arguments() {
        use std::process::Command;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("echo-args.sh");
        fs::write(&target, "printf '%s\\n' \"$@\"\n").unwrap();

        let wrapper = CommandWrapper {
            command: "echo-args".to_string(),
            interpreter: "/bin/sh".to_string(),
            target: target.clone(),
        };
        generate_all(std::slice::from_ref(&wrapper), OsFamily::Posix, dir.path()).unwrap();

        let launcher = wrapper_path(dir.path(), "echo-args", OsFamily::Posix);
        let output = Command::new(&launcher)
            .args(["alpha", "beta gamma", "--flag=1"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert_eq!(stdout.lines().collect::<Vec<_>>(), ["alpha", "beta gamma", "--flag=1"]);
    }
}
