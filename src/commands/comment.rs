//! Submit a comment from the command line

use anyhow::Result;

use crate::comment::{CommentForm, FormState};
use crate::Site;

/// Run the comment flow once against the configured moderation endpoint
pub async fn run(site: &Site, post_id: &str, name: &str, email: &str, comment: &str) -> Result<()> {
    let sink = site.comment_sink()?;
    let mut form = CommentForm::with_fields(post_id, name, email, comment);

    match form.submit(&sink).await {
        FormState::Succeeded => {
            println!("Comment sent to {} for moderation.", sink.endpoint());
            Ok(())
        }
        FormState::Invalid(errors) => {
            let messages: Vec<&str> = [&errors.post, &errors.name, &errors.email, &errors.comment]
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect();
            anyhow::bail!("Comment not sent: {}", messages.join(", "))
        }
        FormState::Failed(message) => anyhow::bail!("Comment not sent: {}", message),
        other => anyhow::bail!("Comment flow ended in unexpected state {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn site_with_endpoint(endpoint: String) -> Site {
        let dir = tempfile::TempDir::new().unwrap();
        let mut site = Site::new(dir.path()).unwrap();
        site.config.moderation.endpoint = endpoint;
        site
    }

    #[tokio::test]
    async fn test_comment_command_posts_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/createComment"))
            .and(body_json(serde_json::json!({
                "_id": "abc123",
                "name": "Jo",
                "email": "jo@x.com",
                "comment": "great post"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let site = site_with_endpoint(format!("{}/api/createComment", server.uri()));
        run(&site, "abc123", "Jo", "jo@x.com", "great post")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_comment_never_posts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let site = site_with_endpoint(format!("{}/api/createComment", server.uri()));
        let err = run(&site, "abc123", "", "a@b.com", "nice").await.unwrap_err();
        assert!(err.to_string().contains("*The Name field is required"));
    }
}
