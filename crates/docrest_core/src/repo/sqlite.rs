//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist documents as JSON bodies keyed by `(document_type, id)`.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - Each repository instance only sees rows of its own document type.
//! - Rows that fail to decode surface as `RepoError::InvalidData`.

use super::{new_document_id, DocumentRepository, RepoError, RepoResult};
use crate::db::SharedConnection;
use crate::model::document::Document;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::MutexGuard;

/// Document repository over a shared SQLite connection.
pub struct SqliteDocumentRepository<D> {
    conn: SharedConnection,
    _document: PhantomData<fn() -> D>,
}

impl<D> SqliteDocumentRepository<D> {
    /// Wraps a connection returned by `open_shared_db*`.
    pub fn new(conn: SharedConnection) -> Self {
        Self {
            conn,
            _document: PhantomData,
        }
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RepoError::LockPoisoned("sqlite connection"))
    }
}

impl<D> SqliteDocumentRepository<D>
where
    D: Document + Serialize + DeserializeOwned,
{
    /// Number of stored documents of this type.
    pub fn count(&self) -> RepoResult<usize> {
        let count: i64 = self.lock()?.query_row(
            "SELECT COUNT(*) FROM documents WHERE document_type = ?1;",
            params![D::DOCUMENT_TYPE],
            |row| row.get(0),
        )?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative count {count}")))
    }
}

impl<D> DocumentRepository<D> for SqliteDocumentRepository<D>
where
    D: Document + Serialize + DeserializeOwned,
{
    fn save(&self, mut document: D) -> RepoResult<D> {
        if !document.has_id() {
            document.set_id(new_document_id());
        }
        let id = document.id().unwrap_or_default().to_string();
        let body = serde_json::to_string(&document)?;

        self.lock()?.execute(
            "INSERT INTO documents (
                document_type,
                id,
                body,
                created_millis,
                last_updated_millis
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (document_type, id) DO UPDATE SET
                body = excluded.body,
                created_millis = excluded.created_millis,
                last_updated_millis = excluded.last_updated_millis;",
            params![
                D::DOCUMENT_TYPE,
                id,
                body,
                document.created_millis(),
                document.last_updated_millis(),
            ],
        )?;

        Ok(document)
    }

    fn find_one(&self, id: &str) -> RepoResult<Option<D>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT body FROM documents
             WHERE document_type = ?1 AND id = ?2;",
        )?;

        let mut rows = stmt.query(params![D::DOCUMENT_TYPE, id])?;
        if let Some(row) = rows.next()? {
            let body: String = row.get(0)?;
            return decode_body(id, &body).map(Some);
        }

        Ok(None)
    }

    fn find_all(&self) -> RepoResult<Vec<D>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, body FROM documents
             WHERE document_type = ?1
             ORDER BY created_millis ASC, id ASC;",
        )?;

        let rows = stmt.query_map(params![D::DOCUMENT_TYPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, body) = row?;
            documents.push(decode_body(&id, &body)?);
        }
        Ok(documents)
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        self.lock()?.execute(
            "DELETE FROM documents WHERE document_type = ?1 AND id = ?2;",
            params![D::DOCUMENT_TYPE, id],
        )?;
        Ok(())
    }

    fn delete_all(&self) -> RepoResult<()> {
        self.lock()?.execute(
            "DELETE FROM documents WHERE document_type = ?1;",
            params![D::DOCUMENT_TYPE],
        )?;
        Ok(())
    }
}

fn decode_body<D>(id: &str, body: &str) -> RepoResult<D>
where
    D: Document + DeserializeOwned,
{
    serde_json::from_str(body).map_err(|err| {
        RepoError::InvalidData(format!(
            "document `{id}` of type `{}`: {err}",
            D::DOCUMENT_TYPE
        ))
    })
}
