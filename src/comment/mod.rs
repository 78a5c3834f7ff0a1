//! Comment submission flow
//!
//! A reader fills in a [`CommentForm`]; on submit it is validated locally and,
//! when valid, forwarded once to the moderation endpoint through a
//! [`CommentSink`]. Every outcome ends in a state the page can show.

mod form;
mod sink;
mod submission;

pub use form::{CommentForm, FormState};
pub use sink::{CommentSink, HttpCommentSink};
pub use submission::{CommentSubmission, FieldErrors};
