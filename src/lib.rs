//! postpress: statically renders blog posts from a headless content store
//!
//! Posts are enumerated and fetched with GROQ queries, their Portable Text
//! bodies rendered to HTML, and each page carries a comment form whose
//! submissions are forwarded to a moderation endpoint.

pub mod builder;
pub mod cache;
pub mod comment;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod image;
pub mod render;
pub mod server;
pub mod store;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main application
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration, environment overrides applied
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Create a new site from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };
        config.apply_env();

        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            public_dir,
        })
    }

    /// Page builder wired to the configured content store
    pub fn builder(&self) -> Result<builder::PageBuilder> {
        Ok(builder::PageBuilder::from_config(
            &self.config,
            self.public_dir.clone(),
        )?)
    }

    /// Sink delivering comments to the configured moderation endpoint
    pub fn comment_sink(&self) -> Result<comment::HttpCommentSink> {
        Ok(comment::HttpCommentSink::new(&self.config.moderation)?)
    }

    /// Generate the static site
    pub async fn generate(&self, force: bool) -> Result<builder::BuildReport> {
        commands::generate::run(self, force).await
    }

    /// Clean the public directory and build cache
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
