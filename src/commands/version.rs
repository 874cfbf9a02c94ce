// This file implements the `setup-sovereign version` command.

use colored::Colorize;

pub fn run() {
    eprintln!(
        "{} {}",
        env!("CARGO_PKG_NAME").bright_magenta().bold(),
        env!("CARGO_PKG_VERSION").cyan()
    );
}
