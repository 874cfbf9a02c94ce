// Register application subcommands.
// Each module corresponds to a specific `setup-sovereign` command-line action.

// Orchestrates the full provisioning pipeline.
pub mod install;
// Prints the detected platform profile.
pub mod profile;
// Clearance-gated credential reveal.
pub mod reveal;
// Displays the version of setup-sovereign.
pub mod version;
