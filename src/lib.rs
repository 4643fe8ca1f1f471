//! compose-retag - point a docker-compose stack at a registry and bring it up
//!
//! Reads a compose file, rewrites the `image` of every service whose image
//! name appears in the tag map to `<registry>/<name>:<tag>`, optionally pulls
//! the rewritten images, writes the result to a new file and runs
//! `docker compose -f <file> up` against it.

pub mod compose;
pub mod config;
pub mod docker;
pub mod error;
pub mod retag;

pub use error::{Result, RetagError};
