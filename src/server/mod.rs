//! HTTP server: generated pages, on-demand fallback generation and comments

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Form, Path, State},
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::builder::{is_safe_slug, PageBuilder};
use crate::comment::{CommentForm, CommentSink, FormState};

/// Server state
struct ServerState {
    builder: Arc<PageBuilder>,
    sink: Arc<dyn CommentSink>,
    /// Pages generated on first request, keyed by slug
    pages: RwLock<HashMap<String, String>>,
}

/// Fields posted by the comment form
#[derive(Debug, Deserialize)]
struct CommentFields {
    #[serde(rename = "_id", default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    comment: String,
}

/// Build the application router
pub fn router(builder: Arc<PageBuilder>, sink: Arc<dyn CommentSink>) -> Router {
    let state = Arc::new(ServerState {
        builder,
        sink,
        pages: RwLock::new(HashMap::new()),
    });

    Router::new()
        .route("/post/:slug", get(post_handler))
        .route("/post/:slug/", get(post_handler))
        .route("/post/:slug/comment", axum::routing::post(comment_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(
    builder: Arc<PageBuilder>,
    sink: Arc<dyn CommentSink>,
    ip: &str,
    port: u16,
) -> Result<()> {
    let app = router(builder, sink);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve a post page, generating it on first request when it was not pre-built
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    if !is_safe_slug(&slug) {
        return not_found(&state, Some(&slug));
    }

    if let Some(html) = state.pages.read().await.get(&slug) {
        return Html(html.clone()).into_response();
    }

    if let Ok(html) = tokio::fs::read_to_string(state.builder.output_path(&slug)).await {
        state.pages.write().await.insert(slug, html.clone());
        return Html(html).into_response();
    }

    let post = match state.builder.load_post(&slug).await {
        Ok(Some(post)) => post,
        Ok(None) => return not_found(&state, Some(&slug)),
        Err(e) => {
            tracing::error!("Failed to load post {:?}: {}", slug, e);
            return internal_error();
        }
    };

    let html = match state
        .builder
        .render_post(&post, &CommentForm::new(post.id.clone()))
    {
        Ok(html) => html,
        Err(e) => {
            tracing::error!("Failed to render post {:?}: {}", slug, e);
            return internal_error();
        }
    };

    tracing::info!("Generated {:?} on demand", slug);
    if let Err(e) = state.builder.write_page(&slug, &html).await {
        tracing::warn!("Could not persist page {:?}: {}", slug, e);
    }
    state.pages.write().await.insert(slug, html.clone());

    Html(html).into_response()
}

/// Run the comment flow and answer with the page showing its outcome
async fn comment_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    Form(fields): Form<CommentFields>,
) -> Response {
    if !is_safe_slug(&slug) {
        return not_found(&state, Some(&slug));
    }

    let post = match state.builder.load_post(&slug).await {
        Ok(Some(post)) => post,
        Ok(None) => return not_found(&state, Some(&slug)),
        Err(e) => {
            tracing::error!("Failed to load post {:?}: {}", slug, e);
            return internal_error();
        }
    };

    // The route names the post; the hidden field is only a hint
    if !fields.id.is_empty() && fields.id != post.id {
        tracing::warn!(
            "Comment form for {:?} carried id {:?}, using {:?}",
            slug,
            fields.id,
            post.id
        );
    }

    let mut form = CommentForm::with_fields(post.id.clone(), fields.name, fields.email, fields.comment);
    let status = match form.submit(state.sink.as_ref()).await {
        FormState::Succeeded => StatusCode::OK,
        FormState::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FormState::Failed(_) => StatusCode::BAD_GATEWAY,
        FormState::Idle | FormState::Validating | FormState::Submitting => StatusCode::OK,
    };

    match state.builder.render_post(&post, &form) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render post {:?}: {}", slug, e);
            internal_error()
        }
    }
}

/// Fallback handler that serves generated files
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let mut service =
        ServeDir::new(state.builder.public_dir()).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(&state, None),
        Ok(response) => response.into_response(),
        Err(_) => internal_error(),
    }
}

fn not_found(state: &ServerState, slug: Option<&str>) -> Response {
    match state.builder.render_not_found(slug) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render not-found page: {}", e);
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::testing::RecordingSink;
    use crate::comment::CommentSubmission;
    use crate::image::ImageUrlResolver;
    use crate::render::PageRenderer;
    use crate::store::testing::{hello_world, StubStore};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct Harness {
        dir: TempDir,
        store: Arc<StubStore>,
        sink: Arc<RecordingSink>,
        builder: Arc<PageBuilder>,
    }

    impl Harness {
        fn new(store: StubStore, sink: RecordingSink) -> Self {
            let dir = TempDir::new().unwrap();
            let store = Arc::new(store);
            let sink = Arc::new(sink);
            let renderer =
                PageRenderer::new("Medium 2.0", ImageUrlResolver::new("p1", "production"))
                    .unwrap();
            let builder = Arc::new(PageBuilder::new(
                store.clone(),
                renderer,
                chrono_tz::UTC,
                dir.path().to_path_buf(),
                1,
            ));
            Self {
                dir,
                store,
                sink,
                builder,
            }
        }

        fn app(&self) -> Router {
            router(self.builder.clone(), self.sink.clone())
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_fallback_generates_then_caches() {
        let h = Harness::new(StubStore::new(vec![hello_world()]), RecordingSink::default());

        let response = h.app().oneshot(get("/post/hello-world")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Hello World"));
        assert!(h.builder.output_path("hello-world").exists());
        assert_eq!(h.store.calls(), 1);

        let app = h.app();
        let again = app.oneshot(get("/post/hello-world")).await.unwrap();
        assert_eq!(again.status(), StatusCode::OK);
        assert_eq!(h.store.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_slug_is_404() {
        let h = Harness::new(StubStore::new(vec![hello_world()]), RecordingSink::default());

        let response = h.app().oneshot(get("/post/missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("<code>missing</code>"));
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let h = Harness::new(StubStore::failing(), RecordingSink::default());

        let response = h.app().oneshot(get("/post/hello-world")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_valid_comment_is_forwarded_once() {
        let h = Harness::new(StubStore::new(vec![hello_world()]), RecordingSink::default());

        let response = h
            .app()
            .oneshot(post_form(
                "/post/hello-world/comment",
                "_id=abc123&name=Jo&email=jo%40x.com&comment=great+post",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Thank you for submitting your comment!"));
        assert_eq!(
            h.sink.sent(),
            vec![CommentSubmission::new("abc123", "Jo", "jo@x.com", "great post")]
        );
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected_inline() {
        let h = Harness::new(StubStore::new(vec![hello_world()]), RecordingSink::default());

        let response = h
            .app()
            .oneshot(post_form(
                "/post/hello-world/comment",
                "_id=abc123&name=&email=a%40b.com&comment=nice",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("*The Name field is required"));
        assert!(html.contains(r#"value="a@b.com""#));
        assert!(h.sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_moderation_failure_is_shown() {
        let sink = RecordingSink {
            reject_with: Some(500),
            ..Default::default()
        };
        let h = Harness::new(StubStore::new(vec![hello_world()]), sink);

        let response = h
            .app()
            .oneshot(post_form(
                "/post/hello-world/comment",
                "_id=abc123&name=Jo&email=jo%40x.com&comment=great+post",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let html = body_text(response).await;
        assert!(html.contains("Your comment could not be sent"));
        assert!(html.contains("great post</textarea>"));
    }

    #[tokio::test]
    async fn test_static_files_and_missing_files() {
        let h = Harness::new(StubStore::new(vec![]), RecordingSink::default());
        h.builder.write_static_assets().await.unwrap();
        assert!(h.dir.path().join("css/style.css").exists());

        let css = h.app().oneshot(get("/css/style.css")).await.unwrap();
        assert_eq!(css.status(), StatusCode::OK);

        let missing = h.app().oneshot(get("/nothing-here.txt")).await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert!(body_text(missing).await.contains("This page could not be found."));
    }
}
