//! Comment gateway backed by `notes`.

use std::sync::Arc;

use mrguard_core::errors::GatewayError;
use mrguard_core::traits::CommentGateway;
use mrguard_core::types::{Comment, CommentId, MergeRequestId, NewComment, ProjectId};

use crate::queries::notes::{self as q, NoteRow};
use crate::DatabaseManager;

pub struct SqliteCommentGateway {
    db: Arc<DatabaseManager>,
}

impl SqliteCommentGateway {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// All comments on a merge request, oldest first.
    pub fn comments_for_merge_request(
        &self,
        merge_request_id: MergeRequestId,
    ) -> Result<Vec<Comment>, GatewayError> {
        let rows = self
            .db
            .with_reader(|conn| q::query_notes_by_merge_request(conn, merge_request_id.get()))?;
        Ok(rows.into_iter().map(to_comment).collect())
    }
}

fn to_comment(row: NoteRow) -> Comment {
    Comment {
        id: CommentId(row.id),
        merge_request_id: MergeRequestId(row.merge_request_id),
        project_id: ProjectId(row.project_id),
        author: row.author,
        body: row.body,
    }
}

fn validate_body(body: &str) -> Result<(), GatewayError> {
    if body.trim().is_empty() {
        return Err(GatewayError::Validation {
            messages: vec!["Note can't be blank".to_string()],
        });
    }
    Ok(())
}

impl CommentGateway for SqliteCommentGateway {
    fn find_by_author_and_prefix(
        &self,
        merge_request_id: MergeRequestId,
        author: &str,
        header: &str,
    ) -> Result<Option<Comment>, GatewayError> {
        let row = self.db.with_reader(|conn| {
            q::find_note_by_author_prefix(conn, merge_request_id.get(), author, header)
        })?;
        Ok(row.map(to_comment))
    }

    fn create(&self, comment: &NewComment) -> Result<Comment, GatewayError> {
        validate_body(&comment.body)?;
        let id = self.db.with_writer(|conn| {
            q::insert_note(
                conn,
                comment.merge_request_id.get(),
                comment.project_id.get(),
                &comment.author,
                &comment.body,
            )
        })?;
        Ok(Comment {
            id: CommentId(id),
            merge_request_id: comment.merge_request_id,
            project_id: comment.project_id,
            author: comment.author.clone(),
            body: comment.body.clone(),
        })
    }

    fn update(&self, id: CommentId, body: &str) -> Result<Comment, GatewayError> {
        validate_body(body)?;
        let row = self.db.with_writer(|conn| {
            if q::update_note_body(conn, id.get(), body)? == 0 {
                return Ok(None);
            }
            q::query_note(conn, id.get())
        })?;
        row.map(to_comment).ok_or(GatewayError::NotFound {
            entity: "note",
            id: id.get(),
        })
    }
}
