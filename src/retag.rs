//! The rewrite-and-launch pipeline
//!
//! load -> rewrite -> pull -> write -> compose up, strictly in that order.
//! Any failure before the write leaves the output file untouched.

use crate::compose::{ComposeDocument, ImageRewrite, ResolvedTags};
use crate::config::RetagConfig;
use crate::docker::ContainerCli;
use crate::error::Result;
use std::path::PathBuf;

/// What a run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Rewritten services, in document order
    pub rewrites: Vec<ImageRewrite>,
    /// Number of images pulled
    pub pulled: usize,
    /// Where the rewritten document was written
    pub output: PathBuf,
    /// Exit code of `compose up`, if it was run
    pub exit_code: Option<i32>,
}

/// Rewrite `config.input` with `tags`, write it to `config.output` and bring
/// the stack up through `cli`.
pub async fn run<C: ContainerCli>(
    config: &RetagConfig,
    tags: &ResolvedTags,
    cli: &C,
) -> Result<Outcome> {
    tracing::debug!("Loading {}", config.input.display());
    let mut document = ComposeDocument::load(&config.input)?;

    let rewrites = document.rewrite_images(tags, &config.registry)?;
    tracing::info!("Rewrote {} service image(s)", rewrites.len());

    let mut pulled = 0;
    if config.pull {
        for rewrite in &rewrites {
            cli.pull(&rewrite.to).await?;
            pulled += 1;
        }
    } else if !rewrites.is_empty() {
        tracing::info!("Skipping pull of {} image(s)", rewrites.len());
    }

    document.write(&config.output)?;
    tracing::info!("Wrote {}", config.output.display());

    let exit_code = if config.up {
        Some(cli.compose_up(&config.output).await?)
    } else {
        None
    };

    Ok(Outcome {
        rewrites,
        pulled,
        output: config.output.clone(),
        exit_code,
    })
}
