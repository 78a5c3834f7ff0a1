//! Comment form state machine

use super::{CommentSink, CommentSubmission, FieldErrors};

/// Where a form interaction currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    Invalid(FieldErrors),
    Submitting,
    Succeeded,
    Failed(String),
}

/// One reader's comment form for one post
#[derive(Debug, Clone)]
pub struct CommentForm {
    pub post_id: String,
    pub name: String,
    pub email: String,
    pub comment: String,
    state: FormState,
}

impl CommentForm {
    /// Empty form attached to a post
    pub fn new(post_id: impl Into<String>) -> Self {
        Self::with_fields(post_id, "", "", "")
    }

    /// Form pre-filled with reader input
    pub fn with_fields(
        post_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            post_id: post_id.into(),
            name: name.into(),
            email: email.into(),
            comment: comment.into(),
            state: FormState::Idle,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Run local validation without touching the network
    pub fn validate(&mut self) -> Option<CommentSubmission> {
        self.state = FormState::Validating;
        let submission =
            CommentSubmission::new(&self.post_id, &self.name, &self.email, &self.comment);

        match submission.check() {
            Ok(()) => Some(submission),
            Err(errors) => {
                self.state = FormState::Invalid(errors);
                None
            }
        }
    }

    /// Validate and, if valid, deliver the comment exactly once
    pub async fn submit<S>(&mut self, sink: &S) -> &FormState
    where
        S: CommentSink + ?Sized,
    {
        if self.state == FormState::Submitting {
            tracing::warn!("Ignoring duplicate submit for post {}", self.post_id);
            return &self.state;
        }

        let Some(submission) = self.validate() else {
            return &self.state;
        };

        self.state = FormState::Submitting;
        match sink.submit(&submission).await {
            Ok(()) => {
                tracing::info!("Comment on post {} sent for moderation", submission.id);
                self.name.clear();
                self.email.clear();
                self.comment.clear();
                self.state = FormState::Succeeded;
            }
            Err(e) => {
                tracing::warn!("Comment on post {} was not delivered: {}", submission.id, e);
                self.state = FormState::Failed(e.to_string());
            }
        }

        &self.state
    }
}
