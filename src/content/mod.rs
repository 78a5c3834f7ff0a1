//! Content module - post documents as projected by the content store

mod block;
mod date;
mod post;

pub use block::{Block, BlockKind, MarkDef, Span};
pub use date::locale_string;
pub use post::{Author, Image, PostPath, Post, Reference, Slug};

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` the same as a missing field.
///
/// Projections return `null` for every requested attribute a document lacks.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
