//! Site configuration (config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // Network
    pub host: String,
    pub port: u16,

    // Directory
    pub posts_dir: String,
    pub templates_dir: String,
    pub static_dir: String,

    // Content
    pub metadata_file: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Inkpost".to_string(),
            description: String::new(),
            author: String::new(),
            language: "en".to_string(),

            host: "127.0.0.1".to_string(),
            port: 8080,

            posts_dir: "posts".to_string(),
            templates_dir: "templates".to_string(),
            static_dir: "static".to_string(),

            metadata_file: "posts.json".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// The address the server binds to.
    ///
    /// `LISTEN_ADDRESS` overrides the configured host/port pair when set,
    /// so containerized deployments can rebind without touching config.yml.
    pub fn listen_address(&self) -> String {
        std::env::var("LISTEN_ADDRESS").unwrap_or_else(|_| format!("{}:{}", self.host, self.port))
    }
}
