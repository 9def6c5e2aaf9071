//! Comment (note) gateway.

use crate::errors::GatewayError;
use crate::types::{Comment, CommentId, MergeRequestId, NewComment};

pub trait CommentGateway: Send + Sync {
    /// Locate the comment authored by `author` whose body starts with
    /// `header`. Returns the most recent match.
    fn find_by_author_and_prefix(
        &self,
        merge_request_id: MergeRequestId,
        author: &str,
        header: &str,
    ) -> Result<Option<Comment>, GatewayError>;

    /// Create a comment. Rejections surface as `GatewayError::Validation`.
    fn create(&self, comment: &NewComment) -> Result<Comment, GatewayError>;

    /// Replace the body of an existing comment.
    fn update(&self, id: CommentId, body: &str) -> Result<Comment, GatewayError>;
}
