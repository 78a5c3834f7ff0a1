//! Full page rendering with embedded Tera templates

use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tera::{Context, Tera};

use super::{escape_html, render_body};
use crate::comment::{CommentForm, FieldErrors, FormState};
use crate::content::Post;
use crate::image::ImageUrlResolver;

/// Stylesheet shipped alongside the generated pages
pub const STYLESHEET: &str = include_str!("templates/style.css");

const TEMPLATES: [(&str, &str); 3] = [
    ("layout.html", include_str!("templates/layout.html")),
    ("post.html", include_str!("templates/post.html")),
    ("not_found.html", include_str!("templates/not_found.html")),
];

/// Template-ready view of a post. Text fields are already HTML-escaped.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub author_name: String,
    pub author_image: Option<String>,
    pub hero_image: Option<String>,
    pub published: String,
    /// Rendered rich-text body
    pub body: String,
}

impl PostView {
    pub fn new(post: &Post, images: &ImageUrlResolver) -> Self {
        let author = post.author.as_ref();
        Self {
            id: escape_html(&post.id),
            slug: escape_html(&post.slug.current),
            title: escape_html(&post.title),
            description: post.description.as_deref().map(escape_html),
            author_name: escape_html(author.map(|a| a.name.as_str()).unwrap_or_default()),
            author_image: author
                .and_then(|a| a.image.as_ref())
                .and_then(|i| images.url_for(i))
                .map(|u| escape_html(&u)),
            hero_image: post
                .main_image
                .as_ref()
                .and_then(|i| images.url_for(i))
                .map(|u| escape_html(&u)),
            published: escape_html(&post.published),
            body: render_body(&post.body, images),
        }
    }
}

/// Template-ready view of the comment form
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub action: String,
    pub post_id: String,
    pub name: String,
    pub email: String,
    pub comment: String,
    pub status: &'static str,
    pub message: Option<String>,
    pub errors: FieldErrors,
}

impl FormView {
    pub fn new(slug: &str, form: &CommentForm) -> Self {
        let (status, message, errors) = match form.state() {
            FormState::Idle | FormState::Validating => ("idle", None, FieldErrors::default()),
            FormState::Invalid(errors) => ("invalid", None, errors.clone()),
            FormState::Submitting => ("submitting", None, FieldErrors::default()),
            FormState::Succeeded => ("succeeded", None, FieldErrors::default()),
            FormState::Failed(message) => {
                ("failed", Some(escape_html(message)), FieldErrors::default())
            }
        };

        Self {
            action: escape_html(&format!("/post/{}/comment", slug)),
            post_id: escape_html(&form.post_id),
            name: escape_html(&form.name),
            email: escape_html(&form.email),
            comment: escape_html(&form.comment),
            status,
            message,
            errors,
        }
    }
}

/// Renders post and error pages
pub struct PageRenderer {
    tera: Tera,
    site_title: String,
    images: ImageUrlResolver,
}

impl PageRenderer {
    /// Create a renderer with all templates loaded
    pub fn new(site_title: &str, images: ImageUrlResolver) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();

        // Values are escaped when views are built; the body is trusted markup
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(TEMPLATES)?;

        Ok(Self {
            tera,
            site_title: escape_html(site_title),
            images,
        })
    }

    /// Hash of everything besides the post that shapes a rendered page
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.site_title.hash(&mut hasher);
        self.images.hash(&mut hasher);
        TEMPLATES.hash(&mut hasher);
        STYLESHEET.hash(&mut hasher);
        hasher.finish()
    }

    /// Render a post page with the comment form in its current state
    pub fn render_post(&self, post: &Post, form: &CommentForm) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("site_title", &self.site_title);
        context.insert("post", &PostView::new(post, &self.images));
        context.insert("form", &FormView::new(&post.slug.current, form));
        self.tera.render("post.html", &context)
    }

    /// Render the not-found page
    pub fn render_not_found(&self, slug: Option<&str>) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("site_title", &self.site_title);
        context.insert("slug", &slug.map(escape_html));
        self.tera.render("not_found.html", &context)
    }
}
