//! Portable Text body renderer
//!
//! Pure mapping from blocks to HTML fragments. Every block produces exactly
//! one fragment and fragments keep the input order.

use crate::content::{Block, BlockKind, Span};
use crate::image::ImageUrlResolver;

use super::escape_html;

const LINK_CLASS: &str = "text-blue-500 hover:underline";

/// Render each block to its own fragment
pub fn render_blocks(blocks: &[Block], images: &ImageUrlResolver) -> Vec<String> {
    blocks.iter().map(|b| render_block(b, images)).collect()
}

/// Render a whole body
pub fn render_body(blocks: &[Block], images: &ImageUrlResolver) -> String {
    render_blocks(blocks, images).join("\n")
}

fn render_block(block: &Block, images: &ImageUrlResolver) -> String {
    match &block.kind {
        BlockKind::Heading1 => format!(
            r#"<h1 class="text-2xl font-bold my-5">{}</h1>"#,
            render_spans(block)
        ),
        BlockKind::Heading2 => format!(
            r#"<h1 class="text-xl font-bold my-5">{}</h1>"#,
            render_spans(block)
        ),
        BlockKind::ListItem { .. } => {
            format!(r#"<li class="ml-5 list-disc">{}</li>"#, render_spans(block))
        }
        BlockKind::Link { href } => link(href, &render_spans(block)),
        BlockKind::Paragraph => format!(r#"<p class="mb-3">{}</p>"#, render_spans(block)),
        BlockKind::Image(image) => match images.url_for(image) {
            Some(src) => format!(
                r#"<figure class="my-5"><img src="{}" alt=""></figure>"#,
                escape_html(&src)
            ),
            None => {
                tracing::debug!("Unresolvable image {}", image.asset.reference);
                r#"<figure class="my-5"></figure>"#.to_string()
            }
        },
        BlockKind::Styled(style) => {
            format!("<{style}>{}</{style}>", render_spans(block), style = style)
        }
        BlockKind::Unknown(tag) => {
            tracing::debug!("No transform for block type {:?}, using default", tag);
            format!(
                r#"<div class="block-unknown" data-block="{}">{}</div>"#,
                escape_html(tag),
                render_spans(block)
            )
        }
    }
}

fn render_spans(block: &Block) -> String {
    block.children.iter().map(|s| render_span(block, s)).collect()
}

fn render_span(block: &Block, span: &Span) -> String {
    let mut html = escape_html(&span.text).replace('\n', "<br>");

    for mark in &span.marks {
        html = match mark.as_str() {
            "strong" => format!("<strong>{}</strong>", html),
            "em" => format!("<em>{}</em>", html),
            "code" => format!("<code>{}</code>", html),
            "underline" => format!("<u>{}</u>", html),
            "strike-through" => format!("<s>{}</s>", html),
            key => match block.mark_def(key) {
                Some(def) if def.kind == "link" => {
                    link(def.href.as_deref().unwrap_or_default(), &html)
                }
                _ => html,
            },
        };
    }

    html
}

fn link(href: &str, inner: &str) -> String {
    format!(
        r#"<a href="{}" class="{}">{}</a>"#,
        escape_html(safe_href(href)),
        LINK_CLASS,
        inner
    )
}

/// Drop script URLs from authored links
fn safe_href(href: &str) -> &str {
    let scheme = href.trim_start().to_ascii_lowercase();
    if scheme.starts_with("javascript:") || scheme.starts_with("data:") {
        "#"
    } else {
        href
    }
}
