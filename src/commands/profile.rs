// This file implements the `setup-sovereign profile` command: it prints the
// platform profile the installer would act on, without touching anything.
// Useful when a support thread needs to know what a host looks like before
// the pipeline is run on it.

use colored::Colorize;

use crate::libs::platform;
use crate::log_info;

pub fn run() {
    let profile = platform::profile();

    log_info!("OS:            {} ({:?})", profile.os_name.cyan().bold(), profile.os);
    log_info!("Shell:         {}", profile.shell.label().cyan());
    if profile.package_managers.is_empty() {
        log_info!("Package mgrs:  {}", "none detected".yellow());
    } else {
        let names: Vec<&str> = profile.package_managers.iter().map(|m| m.binary()).collect();
        log_info!("Package mgrs:  {} (priority order)", names.join(", ").cyan());
    }
}
