//! compose-retag CLI entry point

use clap::Parser;
use compose_retag::compose::TagMap;
use compose_retag::config::RetagConfig;
use compose_retag::docker::DockerCli;
use compose_retag::error::{Result, RetagError};
use compose_retag::retag;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Rewrite compose images to the artifact registry and bring the stack up
#[derive(Parser)]
#[command(name = "compose-retag")]
#[command(version)]
#[command(about = "Rewrite docker-compose image tags and run the stack", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Compose file to read
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Compose file to write
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Registry prefix for rewritten images
    #[arg(long)]
    registry: Option<String>,

    /// Do not pull rewritten images
    #[arg(long)]
    no_pull: bool,

    /// Write the rewritten file without running compose up
    #[arg(long)]
    no_up: bool,
}

impl Cli {
    fn into_config(self, env: &HashMap<String, String>) -> RetagConfig {
        let mut config = RetagConfig::default().apply_env(env);
        if let Some(file) = self.file {
            config.input = file;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(registry) = self.registry {
            config.registry = registry;
        }
        if self.no_pull {
            config.pull = false;
        }
        if self.no_up {
            config.up = false;
        }
        config
    }
}

/// Process environment as UTF-8 pairs.
///
/// Variables whose name or value is not valid UTF-8 are skipped; none of the
/// ones read here can be.
fn utf8_env(vars: impl IntoIterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    vars.into_iter()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Process exit status for a `compose up` exit code; 1 when it does not fit.
fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

fn error_message(err: &RetagError) -> String {
    format!("Error: {}", err)
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let env = utf8_env(std::env::vars_os());
    let config = cli.into_config(&env);
    tracing::debug!("Configuration:\n{}", serde_yaml::to_string(&config)?);

    let tags = TagMap::builtin().resolve(&env);
    print!("{}", tags);

    let docker = DockerCli::new(config.docker_bin.clone());
    let outcome = retag::run(&config, &tags, &docker).await?;

    match outcome.exit_code {
        Some(code) => Ok(ExitCode::from(exit_status(code))),
        None => {
            println!("Wrote {}", outcome.output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", error_message(&e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compose_retag::config::{DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_REGISTRY};

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn config(args: &[&str], env_pairs: &[(&str, &str)]) -> RetagConfig {
        let cli = Cli::try_parse_from(std::iter::once("compose-retag").chain(args.iter().copied()))
            .unwrap();
        cli.into_config(&env(env_pairs))
    }

    #[test]
    fn test_no_flags_uses_defaults() {
        let config = config(&[], &[]);
        assert_eq!(config, RetagConfig::default());
        assert_eq!(config.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.registry, DEFAULT_REGISTRY);
    }

    #[test]
    fn test_flags_replace_defaults() {
        let config = config(
            &["-f", "in.yml", "--output", "out.yml", "--registry", "r.io/p", "--no-up"],
            &[],
        );
        assert_eq!(config.input, PathBuf::from("in.yml"));
        assert_eq!(config.output, PathBuf::from("out.yml"));
        assert_eq!(config.registry, "r.io/p");
        assert!(!config.up);
        assert!(config.pull);
    }

    #[test]
    fn test_no_pull_wins_outside_ci() {
        assert!(config(&[], &[("CI", "false")]).pull);
        assert!(!config(&["--no-pull"], &[("CI", "false")]).pull);
        assert!(!config(&[], &[("CI", "true")]).pull);
    }

    #[test]
    fn test_docker_bin_from_env() {
        assert_eq!(config(&[], &[("DOCKER_BIN", "podman")]).docker_bin, "podman");
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["compose-retag", "--bogus"]).is_err());
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(0), 0);
        assert_eq!(exit_status(130), 130);
        assert_eq!(exit_status(255), 255);
        assert_eq!(exit_status(256), 1);
        assert_eq!(exit_status(-1), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_utf8_env_skips_invalid() {
        use std::os::unix::ffi::OsStringExt;

        let vars = vec![
            (OsString::from("NAMADA_TAG"), OsString::from("v1")),
            (OsString::from("BAD"), OsString::from_vec(vec![0xff])),
            (OsString::from_vec(vec![0xfe]), OsString::from("x")),
        ];
        let env = utf8_env(vars);
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("NAMADA_TAG").map(String::as_str), Some("v1"));
    }

    #[test]
    fn test_error_message_is_readable() {
        let err = RetagError::ComposeRead {
            path: PathBuf::from("nope.yml"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let message = error_message(&err);
        assert!(message.starts_with("Error: Failed to read compose file nope.yml"));
        assert!(!message.contains("ComposeRead"));
    }
}
