//! Docker Compose file handling
//!
//! This module loads compose files, resolves the image tag map and rewrites
//! service images to point at the artifact registry.

pub mod document;
pub mod tags;

pub use document::{image_name, qualified_image, ComposeDocument, ImageRewrite};
pub use tags::{ResolvedTags, TagMap, TagSource};
