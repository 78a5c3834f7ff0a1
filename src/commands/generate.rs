//! Generate static files

use anyhow::Result;
use std::sync::Arc;

use crate::builder::BuildReport;
use crate::cache::CacheDb;
use crate::Site;

/// Generate the static site (with incremental support)
pub async fn run(site: &Site, force: bool) -> Result<BuildReport> {
    let start = std::time::Instant::now();

    let builder = Arc::new(site.builder()?);
    let mut cache = if force {
        tracing::info!("Full generation (force=true)");
        CacheDb::new()
    } else {
        CacheDb::load(&site.base_dir)
    };

    let report = builder.build_site(&mut cache, force).await?;
    cache.save(&site.base_dir)?;

    tracing::info!("Pages: {}", report.summary());
    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::queries;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_store() -> MockServer {
        let server = MockServer::start().await;
        let query_path = "/v2021-10-21/data/query/production";

        Mock::given(method("GET"))
            .and(path(query_path))
            .and(query_param("query", queries::ALL_POST_PATHS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{ "_id": "abc123", "slug": { "current": "hello-world" } }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(query_path))
            .and(query_param("$slug", "\"hello-world\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "_id": "abc123",
                    "_createdAt": "2024-01-15T10:30:00Z",
                    "title": "Hello World",
                    "author": { "name": "Ada", "image": null },
                    "description": null,
                    "mainImage": null,
                    "slug": { "current": "hello-world" },
                    "body": [
                        { "_type": "block", "style": "h1", "children": [{ "_type": "span", "text": "Welcome" }] },
                        { "_type": "block", "style": "normal", "children": [{ "_type": "span", "text": "Body" }] }
                    ]
                }
            })))
            .mount(&server)
            .await;

        server
    }

    fn write_config(dir: &TempDir, server: &MockServer) {
        let config = format!(
            "title: Test Blog\ncontent_store:\n  project_id: p1\n  dataset: production\n  api_host: {}\n",
            server.uri()
        );
        fs::write(dir.path().join("_config.yml"), config).unwrap();
    }

    #[tokio::test]
    async fn test_generate_end_to_end() {
        let server = mock_store().await;
        let dir = TempDir::new().unwrap();
        write_config(&dir, &server);
        let site = Site::new(dir.path()).unwrap();

        let report = run(&site, false).await.unwrap();
        assert_eq!(report.written, 1);

        let page = site.public_dir.join("post/hello-world/index.html");
        let html = fs::read_to_string(page).unwrap();
        assert!(html.contains("<title>Hello World | Test Blog</title>"));
        assert!(html.contains("Published at 1/15/2024, 10:30:00 AM"));
        assert!(html.find("Welcome").unwrap() < html.find("Body").unwrap());

        let second = run(&site, false).await.unwrap();
        assert_eq!(second.unchanged, 1);

        let forced = run(&site, true).await.unwrap();
        assert_eq!(forced.written, 1);
    }
}
