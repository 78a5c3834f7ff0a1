//! Site configuration (_config.yml)

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
    pub url: String,
    pub timezone: String,

    // Directory
    pub public_dir: String,

    // Collaborators
    pub content_store: ContentStoreConfig,
    pub moderation: ModerationConfig,
    pub build: BuildConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Medium 2.0".to_string(),
            url: "http://localhost:4000".to_string(),
            timezone: "UTC".to_string(),
            public_dir: "public".to_string(),
            content_store: ContentStoreConfig::default(),
            moderation: ModerationConfig::default(),
            build: BuildConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment overrides.
    ///
    /// Called once at startup; nothing downstream reads the environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(project_id) = lookup("SANITY_PROJECT_ID") {
            self.content_store.project_id = project_id;
        }
        if let Some(dataset) = lookup("SANITY_DATASET") {
            self.content_store.dataset = dataset;
        }
        if let Some(token) = lookup("SANITY_TOKEN") {
            self.content_store.token = Some(token);
        }
        if let Some(endpoint) = lookup("POSTPRESS_MODERATION_ENDPOINT") {
            self.moderation.endpoint = endpoint;
        }
    }

    /// Resolve the configured timezone, falling back to UTC
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
            chrono_tz::UTC
        })
    }
}

/// Headless content store connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentStoreConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,
    /// Overrides the host derived from `project_id`
    pub api_host: Option<String>,
}

impl Default for ContentStoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2021-10-21".to_string(),
            use_cdn: true,
            token: None,
            api_host: None,
        }
    }
}

impl ContentStoreConfig {
    /// Base URL queries are issued against
    pub fn base_url(&self) -> String {
        match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => {
                let api = if self.use_cdn { "apicdn" } else { "api" };
                format!("https://{}.{}.sanity.io", self.project_id, api)
            }
        }
    }
}

/// Comment moderation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/createComment".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Static build options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub concurrency: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}
