//! Run configuration

use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Compose file read by default
pub const DEFAULT_INPUT: &str = "config/docker-compose.yml";

/// Rewritten compose file written by default
pub const DEFAULT_OUTPUT: &str = "config/docker-compose-test.yml";

/// Artifact registry rewritten images point at
pub const DEFAULT_REGISTRY: &str =
    "us-central1-docker.pkg.dev/molten-verve-216720/heliax-repository";

/// Container CLI used when `DOCKER_BIN` is unset
pub const DEFAULT_DOCKER_BIN: &str = "docker";

/// Settings for one rewrite-and-launch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetagConfig {
    /// Compose file to read
    pub input: PathBuf,
    /// Compose file to write
    pub output: PathBuf,
    /// Registry prefix for rewritten images
    pub registry: String,
    /// Container CLI binary
    pub docker_bin: String,
    /// Pull rewritten images before launching
    pub pull: bool,
    /// Run `compose up` against the output file
    pub up: bool,
}

impl Default for RetagConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            registry: DEFAULT_REGISTRY.to_string(),
            docker_bin: DEFAULT_DOCKER_BIN.to_string(),
            pull: true,
            up: true,
        }
    }
}

impl RetagConfig {
    /// Layer environment settings on top: `DOCKER_BIN` picks the CLI and a
    /// CI runner disables pulls.
    pub fn apply_env(mut self, env: &HashMap<String, String>) -> Self {
        if env.contains_key("DOCKER_BIN") {
            self.docker_bin = resolve_docker_binary(env);
        }
        if is_ci(env) {
            self.pull = false;
        }
        self
    }
}

/// Container CLI binary, honouring `DOCKER_BIN`
pub fn resolve_docker_binary(env: &HashMap<String, String>) -> String {
    env.get("DOCKER_BIN")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_DOCKER_BIN)
        .to_string()
}

/// Whether the environment looks like a CI runner.
///
/// `CI` counts when it is set to anything other than an empty string or an
/// explicit negative (`0`, `false`, `no`, `off`).
pub fn is_ci(env: &HashMap<String, String>) -> bool {
    match env.get("CI") {
        Some(value) => {
            let value = value.trim().to_ascii_lowercase();
            !matches!(value.as_str(), "" | "0" | "false" | "no" | "off")
        }
        None => false,
    }
}
