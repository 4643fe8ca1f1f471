//! Image tag map
//!
//! Maps short image names to the tag they should run at. Each entry reads its
//! tag from an environment variable and falls back to a built-in default.

use std::collections::HashMap;
use std::fmt;

/// Where the tag for one image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSource {
    /// Short image name, e.g. `namada`
    pub image: String,
    /// Environment variable overriding the tag
    pub env_var: String,
    /// Tag used when the variable is unset or empty
    pub default: String,
}

impl TagSource {
    pub fn new(image: &str, env_var: &str, default: &str) -> Self {
        Self {
            image: image.to_string(),
            env_var: env_var.to_string(),
            default: default.to_string(),
        }
    }

    /// Tag for this image under the given environment
    pub fn resolve(&self, env: &HashMap<String, String>) -> String {
        env.get(&self.env_var)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .unwrap_or(self.default.as_str())
            .to_string()
    }
}

/// Ordered set of tag sources
#[derive(Debug, Clone, Default)]
pub struct TagMap {
    sources: Vec<TagSource>,
}

impl TagMap {
    /// Images of the namada test stack
    pub fn builtin() -> Self {
        Self {
            sources: vec![
                TagSource::new("namada-genesis", "NAMADA_TAG", "main"),
                TagSource::new("namada", "NAMADA_TAG", "main"),
                TagSource::new("workload", "WORKLOAD_TAG", "master"),
                TagSource::new("check", "CHECK_TAG", "master"),
                TagSource::new("masp-indexer-chain", "MASP_TAG", "latest"),
                TagSource::new("masp-indexer-webserver", "MASP_TAG", "latest"),
                TagSource::new("masp-indexer-block-filter", "MASP_TAG", "latest"),
            ],
        }
    }

    /// Resolve every entry against `env`
    pub fn resolve(&self, env: &HashMap<String, String>) -> ResolvedTags {
        ResolvedTags {
            tags: self
                .sources
                .iter()
                .map(|s| (s.image.clone(), s.resolve(env)))
                .collect(),
        }
    }
}

/// Image name to tag, in tag map order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTags {
    tags: Vec<(String, String)>,
}

impl ResolvedTags {
    pub fn get(&self, image: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(name, _)| name == image)
            .map(|(_, tag)| tag.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(n, t)| (n.as_str(), t.as_str()))
    }
}

impl FromIterator<(String, String)> for ResolvedTags {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut tags: Vec<(String, String)> = Vec::new();
        for (name, tag) in iter {
            match tags.iter_mut().find(|(n, _)| *n == name) {
                Some(entry) => entry.1 = tag,
                None => tags.push((name, tag)),
            }
        }
        Self { tags }
    }
}

impl fmt::Display for ResolvedTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, tag) in self.iter() {
            writeln!(f, "{}: {}", name, tag)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_builtin_defaults() {
        let tags = TagMap::builtin().resolve(&env(&[]));
        assert_eq!(tags.get("namada"), Some("main"));
        assert_eq!(tags.get("namada-genesis"), Some("main"));
        assert_eq!(tags.get("workload"), Some("master"));
        assert_eq!(tags.get("check"), Some("master"));
        assert_eq!(tags.get("masp-indexer-chain"), Some("latest"));
        assert_eq!(tags.get("custom-service"), None);
    }

    #[test]
    fn test_env_overrides_default() {
        let tags = TagMap::builtin().resolve(&env(&[
            ("WORKLOAD_TAG", "v1.2.3"),
            ("MASP_TAG", "sha-abc"),
        ]));
        assert_eq!(tags.get("workload"), Some("v1.2.3"));
        assert_eq!(tags.get("masp-indexer-webserver"), Some("sha-abc"));
        assert_eq!(tags.get("masp-indexer-block-filter"), Some("sha-abc"));
        assert_eq!(tags.get("namada"), Some("main"));
    }

    #[test]
    fn test_empty_env_falls_back() {
        let tags = TagMap::builtin().resolve(&env(&[("NAMADA_TAG", "")]));
        assert_eq!(tags.get("namada"), Some("main"));
    }

    #[test]
    fn test_display_in_map_order() {
        let tags: ResolvedTags = vec![
            ("namada".to_string(), "main".to_string()),
            ("check".to_string(), "v2".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(tags.to_string(), "namada: main\ncheck: v2\n");
    }
}
