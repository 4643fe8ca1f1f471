//! Compose document loading, image rewriting and writing
//!
//! The document is kept as a generic YAML tree rather than typed compose
//! structs so that every field we do not touch, and the order of services,
//! survives the round trip.

use super::tags::ResolvedTags;
use crate::error::{Result, RetagError};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Image name of a reference: everything before the first `:`.
///
/// A reference without a colon is returned whole.
pub fn image_name(reference: &str) -> &str {
    reference.split(':').next().unwrap_or(reference)
}

/// `<registry>/<name>:<tag>`
pub fn qualified_image(registry: &str, name: &str, tag: &str) -> String {
    format!("{}/{}:{}", registry.trim_end_matches('/'), name, tag)
}

/// One rewritten service image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRewrite {
    /// Service name
    pub service: String,
    /// Image before rewriting
    pub from: String,
    /// Image after rewriting
    pub to: String,
}

/// A parsed compose file
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeDocument {
    root: Value,
}

impl ComposeDocument {
    /// Parse compose file from path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RetagError::ComposeRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse_str(&content)
    }

    /// Parse compose file from string
    pub fn parse_str(content: &str) -> Result<Self> {
        let mut root: Value = serde_yaml::from_str(content)
            .map_err(|e| RetagError::ComposeParse(format!("Failed to parse YAML: {}", e)))?;
        // `<<: *anchor` entries are folded into their mapping, so shared
        // `x-` blocks contribute their `image` like any other key
        root.apply_merge().map_err(|e| {
            RetagError::ComposeParse(format!("Failed to apply merge keys: {}", e))
        })?;

        let document = Self { root };
        // Reject documents without a services mapping before anything else happens
        document.services()?;
        Ok(document)
    }

    /// The `services` mapping
    pub fn services(&self) -> Result<&Mapping> {
        self.root
            .get("services")
            .and_then(Value::as_mapping)
            .ok_or(RetagError::MissingServices)
    }

    fn services_mut(&mut self) -> Result<&mut Mapping> {
        self.root
            .get_mut("services")
            .and_then(Value::as_mapping_mut)
            .ok_or(RetagError::MissingServices)
    }

    /// Image of a single service, if the service exists
    pub fn service_image(&self, service: &str) -> Option<&str> {
        self.services()
            .ok()?
            .get(service)?
            .get("image")?
            .as_str()
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Point every service whose image name has a tag at `registry`.
    ///
    /// Services are visited in document order and the returned rewrites keep
    /// that order. Images whose name is not in `tags` are left as they are.
    pub fn rewrite_images(
        &mut self,
        tags: &ResolvedTags,
        registry: &str,
    ) -> Result<Vec<ImageRewrite>> {
        let mut rewrites = Vec::new();

        for (key, service) in self.services_mut()?.iter_mut() {
            let service_name = key_name(key);

            let image = service
                .as_mapping_mut()
                .ok_or_else(|| RetagError::InvalidService {
                    service: service_name.clone(),
                    message: "service definition is not a mapping".to_string(),
                })?
                .get_mut("image")
                .ok_or_else(|| RetagError::InvalidService {
                    service: service_name.clone(),
                    message: "missing 'image'".to_string(),
                })?;

            let current = image
                .as_str()
                .ok_or_else(|| RetagError::InvalidService {
                    service: service_name.clone(),
                    message: "'image' is not a string".to_string(),
                })?
                .to_string();

            let name = image_name(&current);
            let Some(tag) = tags.get(name) else {
                tracing::debug!("Service {} keeps image {}", service_name, current);
                continue;
            };

            let updated = qualified_image(registry, name, tag);
            tracing::info!("Service {}: {} -> {}", service_name, current, updated);
            *image = Value::String(updated.clone());

            rewrites.push(ImageRewrite {
                service: service_name,
                from: current,
                to: updated,
            });
        }

        Ok(rewrites)
    }

    /// Serialize back to YAML
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.root)?)
    }

    /// Write to `path`, replacing any existing file
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = self.to_yaml_string()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RetagError::ComposeWrite {
                path: path.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, content).map_err(|source| RetagError::ComposeWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn key_name(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
