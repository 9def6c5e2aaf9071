//! Queries for the `notes` table.

use rusqlite::{params, Connection};

use mrguard_core::errors::StorageError;

use super::sqlite_err;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub id: i64,
    pub merge_request_id: i64,
    pub project_id: i64,
    pub author: String,
    pub body: String,
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NoteRow> {
    Ok(NoteRow {
        id: row.get(0)?,
        merge_request_id: row.get(1)?,
        project_id: row.get(2)?,
        author: row.get(3)?,
        body: row.get(4)?,
    })
}

/// Insert a note and return its id.
pub fn insert_note(
    conn: &Connection,
    merge_request_id: i64,
    project_id: i64,
    author: &str,
    body: &str,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO notes (merge_request_id, project_id, author, body) VALUES (?1, ?2, ?3, ?4)",
        params![merge_request_id, project_id, author, body],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

/// Replace a note body. Returns the number of updated rows.
pub fn update_note_body(conn: &Connection, id: i64, body: &str) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE notes SET body = ?2, updated_at = CAST(strftime('%s', 'now') AS INTEGER) WHERE id = ?1",
        params![id, body],
    )
    .map_err(sqlite_err)
}

pub fn query_note(conn: &Connection, id: i64) -> Result<Option<NoteRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, merge_request_id, project_id, author, body FROM notes WHERE id = ?1",
        )
        .map_err(sqlite_err)?;
    let mut rows = stmt.query_map(params![id], map_row).map_err(sqlite_err)?;
    rows.next().transpose().map_err(sqlite_err)
}

/// Most recent note on the merge request by `author` whose body starts with
/// `prefix`.
pub fn find_note_by_author_prefix(
    conn: &Connection,
    merge_request_id: i64,
    author: &str,
    prefix: &str,
) -> Result<Option<NoteRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, merge_request_id, project_id, author, body FROM notes
             WHERE merge_request_id = ?1 AND author = ?2 AND substr(body, 1, length(?3)) = ?3
             ORDER BY id DESC LIMIT 1",
        )
        .map_err(sqlite_err)?;
    let mut rows = stmt
        .query_map(params![merge_request_id, author, prefix], map_row)
        .map_err(sqlite_err)?;
    rows.next().transpose().map_err(sqlite_err)
}

pub fn query_notes_by_merge_request(
    conn: &Connection,
    merge_request_id: i64,
) -> Result<Vec<NoteRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, merge_request_id, project_id, author, body FROM notes
             WHERE merge_request_id = ?1 ORDER BY id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![merge_request_id], map_row)
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}
