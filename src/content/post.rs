//! Post document model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{null_as_default, Block};

/// A blog post as returned by the single-post projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,

    /// Creation timestamp
    #[serde(rename = "_createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Post title
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Short description shown under the title
    #[serde(default)]
    pub description: Option<String>,

    /// Expanded author reference
    #[serde(default)]
    pub author: Option<Author>,

    /// Hero image
    #[serde(rename = "mainImage", default)]
    pub main_image: Option<Image>,

    /// URL slug
    pub slug: Slug,

    /// Rich-text body, in rendering order
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<Block>,

    /// Human-readable creation time, filled in when the post is loaded
    #[serde(skip_deserializing, default)]
    pub published: String,
}

/// Author embedded through reference expansion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub image: Option<Image>,
}

/// URL slug object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(default, deserialize_with = "null_as_default")]
    pub current: String,
}

impl Slug {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
        }
    }
}

/// Opaque image object; only the asset reference matters here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub asset: Reference,
}

/// Reference to another document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_ref")]
    pub reference: String,
}

impl Image {
    pub fn from_ref(reference: impl Into<String>) -> Self {
        Self {
            asset: Reference {
                reference: reference.into(),
            },
        }
    }
}

/// Entry of the path enumeration query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPath {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub slug: Option<Slug>,
}
