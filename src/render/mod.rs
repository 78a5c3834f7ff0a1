//! Rendering: rich-text bodies and full page artifacts

mod page;
pub mod portable;

pub use page::{FormView, PageRenderer, PostView, STYLESHEET};
pub use portable::{render_blocks, render_body};

/// Escape HTML special characters
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
