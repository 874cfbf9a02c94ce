// Register the pipeline's stage modules.
// Each module is one stage of the provisioning pipeline, in the order the
// orchestrator runs them (platform first, credential last).

// Platform profiler: OS family, shell kind, package managers present.
pub mod platform;
// Dependency resolver: the Python runtime and its package-index client.
pub mod runtime;
// Library provisioner: makes the HTTP client library importable.
pub mod pylib;
// Artifact fetcher: downloads the sovereign artifacts, always overwriting.
pub mod fetch;
// Path provisioner: persistent + in-process PATH membership.
pub mod path_env;
// Launcher generator: bare command names for the fetched artifacts.
pub mod wrappers;
// Credential provisioner: the token file, with fixed source precedence.
pub mod credential;
// Home-anchored filesystem layout shared by the stages above.
pub mod paths;
