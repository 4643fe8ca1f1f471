//! External container CLI invocations

use crate::error::{Result, RetagError};
use std::path::Path;
use tokio::process::Command;

/// The container tooling the rewritten stack is handed to
#[allow(async_fn_in_trait)]
pub trait ContainerCli {
    /// Pull one image, failing on a non-zero exit
    async fn pull(&self, image: &str) -> Result<()>;

    /// Run `compose -f <file> up` in the foreground and return its exit code
    async fn compose_up(&self, file: &Path) -> Result<i32>;
}

/// `docker` (or a compatible binary) on the host
#[derive(Debug, Clone)]
pub struct DockerCli {
    bin: String,
}

impl DockerCli {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.bin, args.join(" "))
    }
}

impl ContainerCli for DockerCli {
    async fn pull(&self, image: &str) -> Result<()> {
        let args = ["pull", image];
        tracing::info!("Pulling {}", image);

        let status = Command::new(&self.bin)
            .args(args)
            .status()
            .await
            .map_err(|source| RetagError::Spawn {
                command: self.describe(&args),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(RetagError::CommandFailed {
                command: self.describe(&args),
                status: status.to_string(),
            })
        }
    }

    async fn compose_up(&self, file: &Path) -> Result<i32> {
        let file = file.to_string_lossy();
        let args = ["compose", "-f", &*file, "up"];
        tracing::info!("Running {}", self.describe(&args));

        let status = Command::new(&self.bin)
            .args(args)
            .status()
            .await
            .map_err(|source| RetagError::Spawn {
                command: self.describe(&args),
                source,
            })?;

        Ok(status.code().unwrap_or(if status.success() { 0 } else { 1 }))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pull_success() {
        let cli = DockerCli::new("true");
        assert!(cli.pull("namada:main").await.is_ok());
    }

    #[tokio::test]
    async fn test_pull_failure_is_error() {
        let cli = DockerCli::new("false");
        let err = cli.pull("namada:main").await.unwrap_err();
        assert!(matches!(
            err,
            RetagError::CommandFailed { ref command, .. } if command == "false pull namada:main"
        ));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let cli = DockerCli::new("compose-retag-no-such-binary");
        let err = cli.pull("namada:main").await.unwrap_err();
        assert!(matches!(err, RetagError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_compose_up_exit_code() {
        let cli = DockerCli::new("false");
        let code = cli.compose_up(Path::new("docker-compose-test.yml")).await.unwrap();
        assert_eq!(code, 1);

        let cli = DockerCli::new("true");
        let code = cli.compose_up(Path::new("docker-compose-test.yml")).await.unwrap();
        assert_eq!(code, 0);
    }
}
