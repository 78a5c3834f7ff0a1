//! Rich-text body blocks
//!
//! Blocks arrive as loosely-typed JSON objects. Each one is resolved to a
//! [`BlockKind`] at deserialization time so the renderer can match on it
//! exhaustively. Tags nobody knows about become [`BlockKind::Unknown`]
//! instead of failing the whole document.

use serde::{Deserialize, Serialize};

use super::{null_as_default, Image, Reference};

/// One block of a post body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBlock", into = "RawBlock")]
pub struct Block {
    pub key: Option<String>,
    pub kind: BlockKind,
    pub children: Vec<Span>,
    pub mark_defs: Vec<MarkDef>,
}

/// Resolved block tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Heading1,
    Heading2,
    Paragraph,
    ListItem { list: String, level: u32 },
    Link { href: String },
    Image(Image),
    /// Any other standard block style (h3..h6, blockquote)
    Styled(String),
    Unknown(String),
}

/// Inline run of text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub marks: Vec<String>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }
}

/// Annotation definition referenced from span marks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

impl Block {
    pub fn new(kind: BlockKind, children: Vec<Span>) -> Self {
        Self {
            key: None,
            kind,
            children,
            mark_defs: Vec::new(),
        }
    }

    /// Concatenated text of all children
    pub fn plain_text(&self) -> String {
        self.children.iter().map(|s| s.text.as_str()).collect()
    }

    /// Find the annotation a mark points to
    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|d| d.key == key)
    }
}

/// Wire shape shared by every block type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    #[serde(rename = "_type", default, deserialize_with = "null_as_default")]
    kind: String,
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list_item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    children: Vec<Span>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    mark_defs: Vec<MarkDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    asset: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        let kind = resolve_kind(&raw);

        let mut children = raw.children;
        // Bare objects like {_type:"foo", text:"…"} still carry readable text
        if children.is_empty() {
            if let Some(text) = raw.text {
                children.push(Span::plain(text));
            }
        }

        Self {
            key: raw.key,
            kind,
            children,
            mark_defs: raw.mark_defs,
        }
    }
}

fn resolve_kind(raw: &RawBlock) -> BlockKind {
    if raw.kind == "block" {
        if let Some(list) = &raw.list_item {
            return BlockKind::ListItem {
                list: list.clone(),
                level: raw.level.unwrap_or(1),
            };
        }
        return kind_for_tag(raw.style.as_deref().unwrap_or("normal"), raw);
    }
    kind_for_tag(&raw.kind, raw)
}

fn kind_for_tag(tag: &str, raw: &RawBlock) -> BlockKind {
    match tag {
        "h1" => BlockKind::Heading1,
        "h2" => BlockKind::Heading2,
        "normal" => BlockKind::Paragraph,
        "li" => BlockKind::ListItem {
            list: raw.list_item.clone().unwrap_or_else(|| "bullet".to_string()),
            level: raw.level.unwrap_or(1),
        },
        "link" => BlockKind::Link {
            href: raw.href.clone().unwrap_or_default(),
        },
        "image" => match &raw.asset {
            Some(asset) => BlockKind::Image(Image {
                asset: asset.clone(),
            }),
            None => BlockKind::Unknown(tag.to_string()),
        },
        "h3" | "h4" | "h5" | "h6" | "blockquote" => BlockKind::Styled(tag.to_string()),
        other => BlockKind::Unknown(other.to_string()),
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        let mut raw = RawBlock {
            key: block.key,
            children: block.children,
            mark_defs: block.mark_defs,
            ..Default::default()
        };

        match block.kind {
            BlockKind::Heading1 => raw.set_style("h1"),
            BlockKind::Heading2 => raw.set_style("h2"),
            BlockKind::Paragraph => raw.set_style("normal"),
            BlockKind::Styled(style) => raw.set_style(&style),
            BlockKind::ListItem { list, level } => {
                raw.set_style("normal");
                raw.list_item = Some(list);
                raw.level = Some(level);
            }
            BlockKind::Link { href } => {
                raw.kind = "link".to_string();
                raw.href = Some(href);
            }
            BlockKind::Image(image) => {
                raw.kind = "image".to_string();
                raw.asset = Some(image.asset);
            }
            BlockKind::Unknown(tag) => raw.kind = tag,
        }

        raw
    }
}

impl RawBlock {
    fn set_style(&mut self, style: &str) {
        self.kind = "block".to_string();
        self.style = Some(style.to_string());
    }
}
