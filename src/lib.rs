//! inkpost: a small Markdown blog server
//!
//! Posts are plain Markdown files listed in a JSON metadata document,
//! rendered per request and composed with Tera templates. Each post has
//! an in-memory comment thread accepted via form submission; nothing is
//! persisted beyond the process lifetime.

pub mod comments;
pub mod config;
pub mod content;
pub mod errors;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The site: configuration plus resolved asset locations
#[derive(Clone, Debug)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Markdown source directory
    pub posts_dir: PathBuf,
    /// Template directory
    pub templates_dir: PathBuf,
    /// Static asset directory
    pub static_dir: PathBuf,
    /// Post metadata document
    pub metadata_path: PathBuf,
}

impl Site {
    /// Create a new site rooted at a directory
    ///
    /// Reads `config.yml` when present, otherwise uses defaults.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let posts_dir = base_dir.join(&config.posts_dir);
        let templates_dir = base_dir.join(&config.templates_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let metadata_path = base_dir.join(&config.metadata_file);

        Ok(Self {
            config,
            base_dir,
            posts_dir,
            templates_dir,
            static_dir,
            metadata_path,
        })
    }
}
