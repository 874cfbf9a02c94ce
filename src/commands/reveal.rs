// This file implements the `setup-sovereign reveal` command: the themed
// clearance gate in front of the credential status block. It is exactly one
// string comparison: the right phrase unlocks the reveal, anything else gets
// a denial line. No state survives the call.

use colored::Colorize;

use crate::libs::paths;
use crate::{log_error, log_info};

/// The clearance phrase. Matched exactly (after trimming surrounding
/// whitespace), not fuzzily.
const CLEARANCE_PHRASE: &str = "axis mundi";

pub fn run(phrase: &str) {
    if phrase.trim() != CLEARANCE_PHRASE {
        log_error!("{}", "Clearance denied.".red().bold());
        return;
    }

    eprintln!();
    eprintln!("  {}", "── CLEARANCE GRANTED ──".bright_magenta().bold());
    match paths::credential_path() {
        Ok(path) if path.exists() => {
            log_info!("Token file: {} {}", path.display().to_string().cyan(), "(present)".green());
        }
        Ok(path) => {
            log_info!("Token file: {} {}", path.display().to_string().cyan(), "(absent)".yellow());
        }
        Err(e) => {
            log_error!("{e}");
        }
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_gate_is_an_exact_match() {
        assert_eq!("  axis mundi  ".trim(), CLEARANCE_PHRASE);
        assert_ne!("axis", CLEARANCE_PHRASE);
        assert_ne!("AXIS MUNDI", CLEARANCE_PHRASE);
    }
}
