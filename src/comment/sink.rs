//! Delivery of comments to the moderation backend

use async_trait::async_trait;
use std::time::Duration;

use super::CommentSubmission;
use crate::config::ModerationConfig;
use crate::error::SubmitError;

/// Destination for validated comments
#[async_trait]
pub trait CommentSink: Send + Sync {
    /// Deliver one comment. Never retried by callers.
    async fn submit(&self, comment: &CommentSubmission) -> Result<(), SubmitError>;
}

/// Posts comments as JSON to the moderation endpoint
#[derive(Debug, Clone)]
pub struct HttpCommentSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCommentSink {
    pub fn new(config: &ModerationConfig) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CommentSink for HttpCommentSink {
    async fn submit(&self, comment: &CommentSubmission) -> Result<(), SubmitError> {
        tracing::debug!("Posting comment for {} to {}", comment.id, self.endpoint);

        let response = self.client.post(&self.endpoint).json(comment).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sink_for(server: &MockServer) -> HttpCommentSink {
        HttpCommentSink::new(&ModerationConfig {
            endpoint: format!("{}/api/createComment", server.uri()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_posts_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/createComment"))
            .and(body_json(json!({
                "_id": "abc123",
                "name": "Jo",
                "email": "jo@x.com",
                "comment": "great post"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = sink_for(&server);
        let comment = CommentSubmission::new("abc123", "Jo", "jo@x.com", "great post");
        sink.submit(&comment).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let sink = sink_for(&server);
        let comment = CommentSubmission::new("abc123", "Jo", "jo@x.com", "great post");
        let err = sink.submit(&comment).await.unwrap_err();
        assert!(matches!(err, SubmitError::Rejected { status: 500 }));
    }
}
