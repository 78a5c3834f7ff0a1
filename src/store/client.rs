//! HTTP client for the Sanity query API

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{ContentStore, QueryParams};
use crate::config::ContentStoreConfig;
use crate::error::StoreError;

/// Response envelope of the query endpoint
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

/// Content store client speaking the HTTP query API
#[derive(Debug, Clone)]
pub struct SanityClient {
    client: reqwest::Client,
    query_url: String,
    token: Option<String>,
}

impl SanityClient {
    /// Create a client from explicit configuration
    pub fn new(config: &ContentStoreConfig) -> Result<Self, StoreError> {
        if config.project_id.is_empty() && config.api_host.is_none() {
            return Err(StoreError::Config("project_id is not set".to_string()));
        }
        if config.dataset.is_empty() {
            return Err(StoreError::Config("dataset is not set".to_string()));
        }

        let query_url = format!(
            "{}/v{}/data/query/{}",
            config.base_url(),
            config.api_version.trim_start_matches('v'),
            config.dataset
        );

        Ok(Self {
            client: reqwest::Client::new(),
            query_url,
            token: config.token.clone(),
        })
    }

    /// Endpoint queries are sent to
    pub fn query_url(&self) -> &str {
        &self.query_url
    }
}

#[async_trait]
impl ContentStore for SanityClient {
    async fn fetch(&self, query: &str, params: &QueryParams) -> Result<Value, StoreError> {
        let mut pairs = vec![("query".to_string(), query.to_string())];
        for (name, value) in params {
            // Parameter values travel JSON-encoded
            pairs.push((format!("${}", name), serde_json::to_string(value)?));
        }

        tracing::debug!("Querying {} with {} params", self.query_url, params.len());

        let mut request = self.client.get(&self.query_url).query(&pairs);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let envelope: QueryResponse = serde_json::from_slice(&bytes)?;
        Ok(envelope.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{fetch_as, queries};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ContentStoreConfig {
        ContentStoreConfig {
            project_id: "p1".to_string(),
            dataset: "production".to_string(),
            api_host: Some(server.uri()),
            ..Default::default()
        }
    }

    #[test]
    fn test_query_url() {
        let config = ContentStoreConfig {
            project_id: "p1".to_string(),
            ..Default::default()
        };
        let client = SanityClient::new(&config).unwrap();
        assert_eq!(
            client.query_url(),
            "https://p1.apicdn.sanity.io/v2021-10-21/data/query/production"
        );
    }

    #[test]
    fn test_missing_project_is_config_error() {
        let err = SanityClient::new(&ContentStoreConfig::default()).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[tokio::test]
    async fn test_fetch_sends_json_encoded_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2021-10-21/data/query/production"))
            .and(query_param("query", queries::POST_BY_SLUG))
            .and(query_param("$slug", "\"hello-world\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ms": 3,
                "query": "…",
                "result": { "_id": "abc123", "slug": { "current": "hello-world" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SanityClient::new(&config_for(&server)).unwrap();
        let mut params = QueryParams::new();
        params.insert("slug".to_string(), json!("hello-world"));

        let result = client.fetch(queries::POST_BY_SLUG, &params).await.unwrap();
        assert_eq!(result["_id"], "abc123");
    }

    #[tokio::test]
    async fn test_fetch_uses_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.token = Some("secret".to_string());
        let client = SanityClient::new(&config).unwrap();

        let paths: Vec<crate::content::PostPath> =
            fetch_as(&client, queries::ALL_POST_PATHS, &QueryParams::new())
                .await
                .unwrap();
        assert!(paths.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad query"))
            .mount(&server)
            .await;

        let client = SanityClient::new(&config_for(&server)).unwrap();
        let err = client
            .fetch("*[", &QueryParams::new())
            .await
            .unwrap_err();
        match err {
            StoreError::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad query");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = SanityClient::new(&config_for(&server)).unwrap();
        let err = client
            .fetch(queries::ALL_POST_PATHS, &QueryParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
