//! Merge request comments (notes).

use serde::{Deserialize, Serialize};

use super::identifiers::{CommentId, MergeRequestId, ProjectId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub merge_request_id: MergeRequestId,
    pub project_id: ProjectId,
    pub author: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub merge_request_id: MergeRequestId,
    pub project_id: ProjectId,
    pub author: String,
    pub body: String,
}
