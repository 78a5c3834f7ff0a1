//! Static page builder
//!
//! Enumerates every published post once, then loads and renders each one
//! into `<public_dir>/post/<slug>/index.html`.

use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cache::{self, CacheDb};
use crate::comment::CommentForm;
use crate::config::SiteConfig;
use crate::content::{locale_string, Post, PostPath};
use crate::error::{BuildError, StoreError};
use crate::image::ImageUrlResolver;
use crate::render::{PageRenderer, STYLESHEET};
use crate::store::{fetch_as, queries, ContentStore, QueryParams, SanityClient};

/// A post that can be pre-generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePath {
    pub id: String,
    pub slug: String,
}

/// What happened to one page during a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    Written,
    Unchanged,
    /// Enumerated, but gone by the time it was loaded
    Missing,
}

/// Result of building one page
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub path: PagePath,
    pub status: PageStatus,
    pub content_hash: Option<u64>,
}

/// Totals of a site build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub written: usize,
    pub unchanged: usize,
    pub missing: usize,
    pub removed: usize,
}

impl BuildReport {
    /// Get summary for logging
    pub fn summary(&self) -> String {
        format!(
            "{} written, {} unchanged, {} missing, {} removed",
            self.written, self.unchanged, self.missing, self.removed
        )
    }
}

/// Slugs become directory names, so they must stay a single path segment
pub fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\', '\0'])
}

/// Builds post pages from the content store
pub struct PageBuilder {
    store: Arc<dyn ContentStore>,
    renderer: PageRenderer,
    tz: chrono_tz::Tz,
    public_dir: PathBuf,
    concurrency: usize,
    /// Hash of the rendering settings, recorded in the build cache
    config_hash: u64,
}

impl PageBuilder {
    pub fn new(
        store: Arc<dyn ContentStore>,
        renderer: PageRenderer,
        tz: chrono_tz::Tz,
        public_dir: PathBuf,
        concurrency: usize,
    ) -> Self {
        let config_hash =
            cache::hash_content(&format!("{}:{}", renderer.fingerprint(), tz.name()));
        Self {
            store,
            renderer,
            tz,
            public_dir,
            concurrency: concurrency.max(1),
            config_hash,
        }
    }

    /// Wire up the HTTP content store client from configuration
    pub fn from_config(config: &SiteConfig, public_dir: PathBuf) -> Result<Self, BuildError> {
        let store = SanityClient::new(&config.content_store)?;
        let images = ImageUrlResolver::from_config(&config.content_store);
        let renderer = PageRenderer::new(&config.title, images)?;

        Ok(Self::new(
            Arc::new(store),
            renderer,
            config.tz(),
            public_dir,
            config.build.concurrency,
        ))
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    pub fn config_hash(&self) -> u64 {
        self.config_hash
    }

    /// All slugs that should be pre-generated
    pub async fn enumerate_post_paths(&self) -> Result<Vec<PagePath>, StoreError> {
        let docs: Option<Vec<PostPath>> =
            fetch_as(self.store.as_ref(), queries::ALL_POST_PATHS, &QueryParams::new()).await?;

        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        for doc in docs.unwrap_or_default() {
            let slug = doc.slug.map(|s| s.current).unwrap_or_default();
            if !is_safe_slug(&slug) {
                tracing::warn!("Skipping post {} with unusable slug {:?}", doc.id, slug);
                continue;
            }
            if !seen.insert(slug.clone()) {
                tracing::warn!("Skipping post {}: slug {:?} already taken", doc.id, slug);
                continue;
            }
            paths.push(PagePath { id: doc.id, slug });
        }

        tracing::debug!("Enumerated {} post paths", paths.len());
        Ok(paths)
    }

    /// Fetch one post by slug. `Ok(None)` when no post has that slug.
    pub async fn load_post(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let mut params = QueryParams::new();
        params.insert("slug".to_string(), Value::String(slug.to_string()));

        let post: Option<Post> =
            fetch_as(self.store.as_ref(), queries::POST_BY_SLUG, &params).await?;

        let Some(mut post) = post else {
            tracing::debug!("No post with slug {:?}", slug);
            return Ok(None);
        };

        if let Some(created_at) = post.created_at {
            post.published = locale_string(&created_at, self.tz);
        }
        Ok(Some(post))
    }

    /// Render a post page with the given form state
    pub fn render_post(&self, post: &Post, form: &CommentForm) -> Result<String, BuildError> {
        Ok(self.renderer.render_post(post, form)?)
    }

    /// Render the not-found page
    pub fn render_not_found(&self, slug: Option<&str>) -> Result<String, BuildError> {
        Ok(self.renderer.render_not_found(slug)?)
    }

    /// Where a post's page lives on disk
    pub fn output_path(&self, slug: &str) -> PathBuf {
        self.public_dir.join("post").join(slug).join("index.html")
    }

    /// Write a rendered page for a slug
    pub async fn write_page(&self, slug: &str, html: &str) -> Result<(), BuildError> {
        let path = self.output_path(slug);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, html).await?;
        tracing::debug!("Generated: {:?}", path);
        Ok(())
    }

    /// Load, render and write one page
    ///
    /// The page is left alone when the loaded post hashes to `previous` and
    /// its output file is still present, unless `force` is set.
    pub async fn build_page(
        &self,
        path: PagePath,
        previous: Option<u64>,
        force: bool,
    ) -> Result<PageOutcome, BuildError> {
        let Some(post) = self.load_post(&path.slug).await? else {
            tracing::warn!("Post {} ({}) vanished before it could be loaded", path.id, path.slug);
            return Ok(PageOutcome {
                path,
                status: PageStatus::Missing,
                content_hash: None,
            });
        };

        let hash = cache::hash_content(&serde_json::to_string(&post).map_err(StoreError::from)?);
        let exists = tokio::fs::try_exists(self.output_path(&path.slug))
            .await
            .unwrap_or(false);

        let status = if !force && exists && previous == Some(hash) {
            PageStatus::Unchanged
        } else {
            let html = self.render_post(&post, &CommentForm::new(post.id.clone()))?;
            self.write_page(&path.slug, &html).await?;
            PageStatus::Written
        };

        Ok(PageOutcome {
            path,
            status,
            content_hash: Some(hash),
        })
    }

    /// Write the stylesheet and the not-found page
    pub async fn write_static_assets(&self) -> Result<(), BuildError> {
        let css_dir = self.public_dir.join("css");
        tokio::fs::create_dir_all(&css_dir).await?;
        tokio::fs::write(css_dir.join("style.css"), STYLESHEET).await?;

        let not_found = self.render_not_found(None)?;
        tokio::fs::write(self.public_dir.join("404.html"), not_found).await?;
        Ok(())
    }

    /// Generate every enumerated post page
    ///
    /// Every page is rewritten when the rendering settings differ from the
    /// ones recorded in `cache`.
    pub async fn build_site(
        self: &Arc<Self>,
        cache: &mut CacheDb,
        mut force: bool,
    ) -> Result<BuildReport, BuildError> {
        if cache.config_hash != self.config_hash {
            if !force && !cache.pages.is_empty() {
                tracing::info!("Site settings changed, full rebuild required");
            }
            force = true;
        }

        let paths = self.enumerate_post_paths().await?;
        tracing::info!("Found {} posts", paths.len());

        self.write_static_assets().await?;

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        for path in paths.iter().cloned() {
            let builder = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            let previous = cache.hash_for(&path.slug);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                builder.build_page(path, previous, force).await
            });
        }

        let mut report = BuildReport::default();
        while let Some(joined) = tasks.join_next().await {
            // Dropping the set on error aborts the remaining pages
            let outcome = joined??;
            match outcome.status {
                PageStatus::Written => report.written += 1,
                PageStatus::Unchanged => report.unchanged += 1,
                PageStatus::Missing => report.missing += 1,
            }
            if let Some(hash) = outcome.content_hash {
                cache.record(&outcome.path.slug, &outcome.path.id, hash);
            }
        }

        let current: HashSet<&str> = paths.iter().map(|p| p.slug.as_str()).collect();
        for slug in cache.take_stale(&current) {
            if !is_safe_slug(&slug) {
                tracing::warn!("Ignoring cached slug {:?}: not a single path segment", slug);
                continue;
            }
            let dir = self.public_dir.join("post").join(&slug);
            if tokio::fs::try_exists(&dir).await.unwrap_or(false) {
                tokio::fs::remove_dir_all(&dir).await?;
                tracing::info!("Deleted: {:?}", dir);
            }
            report.removed += 1;
        }

        cache.config_hash = self.config_hash;
        Ok(report)
    }
}
