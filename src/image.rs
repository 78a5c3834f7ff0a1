//! Image reference to CDN URL resolution

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::ContentStoreConfig;
use crate::content::Image;

lazy_static! {
    /// `image-<asset id>-<width>x<height>-<format>`
    static ref IMAGE_REF: Regex =
        Regex::new(r"^image-([A-Za-z0-9]+)-(\d+x\d+)-([a-z0-9]+)$").unwrap();
}

/// Maps opaque image references to fetchable URLs
#[derive(Debug, Clone, Hash)]
pub struct ImageUrlResolver {
    base: String,
}

impl ImageUrlResolver {
    pub fn new(project_id: &str, dataset: &str) -> Self {
        Self {
            base: format!("https://cdn.sanity.io/images/{}/{}", project_id, dataset),
        }
    }

    pub fn from_config(config: &ContentStoreConfig) -> Self {
        Self::new(&config.project_id, &config.dataset)
    }

    /// Resolve a raw asset reference
    pub fn url_for_ref(&self, reference: &str) -> Option<String> {
        let caps = IMAGE_REF.captures(reference)?;
        Some(format!(
            "{}/{}-{}.{}",
            self.base, &caps[1], &caps[2], &caps[3]
        ))
    }

    /// Resolve an image object
    pub fn url_for(&self, image: &Image) -> Option<String> {
        self.url_for_ref(&image.asset.reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_asset_reference() {
        let resolver = ImageUrlResolver::new("p1", "production");
        let image = Image::from_ref("image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg");
        assert_eq!(
            resolver.url_for(&image).as_deref(),
            Some("https://cdn.sanity.io/images/p1/production/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg")
        );
    }

    #[test]
    fn test_malformed_reference() {
        let resolver = ImageUrlResolver::new("p1", "production");
        assert_eq!(resolver.url_for_ref("file-abc-pdf"), None);
        assert_eq!(resolver.url_for_ref("image-abc-jpg"), None);
        assert_eq!(resolver.url_for_ref(""), None);
    }

    #[test]
    fn test_from_config() {
        let config = ContentStoreConfig {
            project_id: "proj".to_string(),
            dataset: "staging".to_string(),
            ..Default::default()
        };
        let resolver = ImageUrlResolver::from_config(&config);
        assert_eq!(
            resolver.url_for_ref("image-a1-10x20-png").as_deref(),
            Some("https://cdn.sanity.io/images/proj/staging/a1-10x20.png")
        );
    }
}
