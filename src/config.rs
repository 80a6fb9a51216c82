//! Application configuration
//!
//! Loaded from YAML for the demo binary; every field has a default so an
//! absent file or an empty document still yields a working setup.

use crate::error::Result;
use crate::repo::RepositoryKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which paging strategy to use
    #[serde(default)]
    pub repository: RepositoryKind,

    /// Collection to open when none is given on the command line
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Page size for listings
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Base URL of the remote listing API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            repository: RepositoryKind::default(),
            collection: default_collection(),
            page_size: default_page_size(),
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_collection() -> String {
    "popular".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_base_url() -> String {
    "https://www.reddit.com".to_string()
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.repository, RepositoryKind::Db);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.base_url, "https://www.reddit.com");
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
repository: in_memory
collection: rust
page_size: 25
base_url: "https://listings.example.com"
user_agent: "demo/1.0"
timeout_seconds: 5
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.repository, RepositoryKind::InMemory);
        assert_eq!(config.collection, "rust");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.base_url, "https://listings.example.com");
        assert_eq!(config.user_agent, "demo/1.0");
        assert_eq!(config.timeout_seconds, 5);
    }

    #[test]
    fn test_parse_partial_config_fills_defaults() {
        let config = AppConfig::from_yaml("collection: programming\n").unwrap();
        assert_eq!(config.collection, "programming");
        assert_eq!(config.repository, RepositoryKind::Db);
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_parse_invalid_yaml_fails() {
        assert!(AppConfig::from_yaml("page_size: [not a number").is_err());
    }
}
