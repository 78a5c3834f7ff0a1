//! Comment payload and field validation

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payload sent to the moderation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CommentSubmission {
    /// Id of the post being commented on
    #[serde(rename = "_id")]
    #[validate(length(min = 1))]
    pub id: String,

    #[validate(length(min = 1))]
    pub name: String,

    #[validate(length(min = 1), email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub comment: String,
}

/// Inline messages for fields that failed validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub post: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub comment: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.post.is_none() && self.name.is_none() && self.email.is_none() && self.comment.is_none()
    }
}

impl CommentSubmission {
    /// Build a submission from raw form input, trimming every field
    pub fn new(id: &str, name: &str, email: &str, comment: &str) -> Self {
        Self {
            id: id.trim().to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            comment: comment.trim().to_string(),
        }
    }

    /// Validate all fields, collecting one message per failing field
    pub fn check(&self) -> Result<(), FieldErrors> {
        let Err(e) = self.validate() else {
            return Ok(());
        };

        let fields = e.field_errors();
        let mut errors = FieldErrors::default();
        if fields.contains_key("id") || fields.contains_key("_id") {
            errors.post = Some("*Missing post reference".to_string());
        }
        if fields.contains_key("name") {
            errors.name = Some("*The Name field is required".to_string());
        }
        if fields.contains_key("email") {
            errors.email = Some(if self.email.is_empty() {
                "*The Email field is required".to_string()
            } else {
                "*Please enter a valid email address".to_string()
            });
        }
        if fields.contains_key("comment") {
            errors.comment = Some("*The Comment field is required".to_string());
        }
        Err(errors)
    }
}
