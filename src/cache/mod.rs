//! Cache module for incremental generation
//!
//! Tracks a content hash per generated post page so unchanged posts are not
//! rewritten, and so pages of posts that disappeared from the store can be
//! removed.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Cache directory, relative to the site base directory
pub const CACHE_DIR: &str = ".postpress-cache";

/// Cache file name
const CACHE_FILE: &str = ".postpress-cache/db.json";

/// What was generated for one slug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Document id of the post
    pub id: String,
    /// Hash of the loaded post record
    pub content_hash: u64,
}

/// Cache database for tracking generated pages
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheDb {
    /// Version of the cache format
    pub version: u32,
    /// Hash of the site rendering settings (changes trigger full rebuild)
    pub config_hash: u64,
    /// Entries keyed by slug
    pub pages: HashMap<String, CacheEntry>,
}

impl CacheDb {
    /// Current cache format version
    const VERSION: u32 = 1;

    /// Load cache from disk, or create a new empty cache
    pub fn load(base_dir: &Path) -> Self {
        let cache_path = base_dir.join(CACHE_FILE);
        if let Ok(content) = fs::read_to_string(&cache_path) {
            if let Ok(cache) = serde_json::from_str::<CacheDb>(&content) {
                if cache.version == Self::VERSION {
                    return cache;
                }
                tracing::info!("Cache version mismatch, rebuilding cache");
            }
        }
        Self::new()
    }

    /// Save cache to disk
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        fs::create_dir_all(base_dir.join(CACHE_DIR))?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(base_dir.join(CACHE_FILE), content)?;
        Ok(())
    }

    /// Create a new cache with version set
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            ..Default::default()
        }
    }

    /// Previously recorded hash for a slug
    pub fn hash_for(&self, slug: &str) -> Option<u64> {
        self.pages.get(slug).map(|e| e.content_hash)
    }

    pub fn record(&mut self, slug: &str, id: &str, content_hash: u64) {
        self.pages.insert(
            slug.to_string(),
            CacheEntry {
                id: id.to_string(),
                content_hash,
            },
        );
    }

    /// Drop entries whose slug is no longer published, returning them
    pub fn take_stale(&mut self, current: &HashSet<&str>) -> Vec<String> {
        let mut stale: Vec<String> = self
            .pages
            .keys()
            .filter(|slug| !current.contains(slug.as_str()))
            .cloned()
            .collect();
        stale.sort();

        for slug in &stale {
            self.pages.remove(slug);
        }
        stale
    }
}

/// Calculate a hash for content
pub fn hash_content(content: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}
