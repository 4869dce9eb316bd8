use super::{
    new_id, strip_id, ApiStatus, Collection, CollectionStore, Document, StoreError, StoreResult,
};
use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;

pub const DB_FILE_NAME: &str = "teachermate.sqlite3";

/// Live backend: every collection is a set of JSON documents in one SQLite file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(workspace).with_context(|| {
            format!("failed to create workspace {}", workspace.to_string_lossy())
        })?;
        let path = workspace.join(DB_FILE_NAME);
        let conn = Connection::open(&path)
            .with_context(|| format!("failed to open {}", path.to_string_lossy()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents(
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY(collection, id)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)",
            [],
        )?;

        tracing::info!(path = %path.display(), "opened workspace store");
        Ok(Self { conn })
    }

    fn load_body(&self, collection: Collection, id: &str) -> StoreResult<Document> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ? AND id = ?",
                (collection.as_str(), id),
                |r| r.get(0),
            )
            .optional()?;
        let Some(body) = body else {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            });
        };
        parse_body(collection, &body)
    }
}

fn parse_body(collection: Collection, body: &str) -> StoreResult<Document> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::InvalidDocument {
            collection,
            message: "stored body is not an object".into(),
        }),
    }
}

impl CollectionStore for SqliteStore {
    fn get_items(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, body FROM documents WHERE collection = ? ORDER BY rowid")?;
        let rows = stmt
            .query_map([collection.as_str()], |row| {
                let id: String = row.get(0)?;
                let body: String = row.get(1)?;
                Ok((id, body))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(rows.len());
        for (id, body) in rows {
            let mut doc = parse_body(collection, &body)?;
            doc.insert("id".into(), Value::String(id));
            out.push(doc);
        }
        Ok(out)
    }

    fn add_item(&mut self, collection: Collection, fields: Document) -> StoreResult<String> {
        let id = new_id();
        let body = serde_json::to_string(&strip_id(fields))?;
        self.conn.execute(
            "INSERT INTO documents(collection, id, body) VALUES(?, ?, ?)",
            (collection.as_str(), &id, &body),
        )?;
        tracing::debug!(%collection, %id, "document added");
        Ok(id)
    }

    fn update_item(
        &mut self,
        collection: Collection,
        id: &str,
        patch: Document,
    ) -> StoreResult<()> {
        let mut doc = self.load_body(collection, id)?;
        for (k, v) in strip_id(patch) {
            doc.insert(k, v);
        }
        let body = serde_json::to_string(&doc)?;
        self.conn.execute(
            "UPDATE documents SET body = ? WHERE collection = ? AND id = ?",
            (&body, collection.as_str(), id),
        )?;
        tracing::debug!(%collection, %id, "document updated");
        Ok(())
    }

    fn delete_item(&mut self, collection: Collection, id: &str) -> StoreResult<()> {
        let n = self.conn.execute(
            "DELETE FROM documents WHERE collection = ? AND id = ?",
            (collection.as_str(), id),
        )?;
        if n == 0 {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            });
        }
        tracing::debug!(%collection, %id, "document deleted");
        Ok(())
    }

    fn restore_collection(
        &mut self,
        collection: Collection,
        documents: Vec<Document>,
    ) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM documents WHERE collection = ?",
            [collection.as_str()],
        )?;
        for doc in documents {
            let id = match doc.get("id").and_then(|v| v.as_str()) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => new_id(),
            };
            let body = serde_json::to_string(&strip_id(doc))?;
            tx.execute(
                "INSERT OR REPLACE INTO documents(collection, id, body) VALUES(?, ?, ?)",
                (collection.as_str(), &id, &body),
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn status(&self) -> ApiStatus {
        ApiStatus::Connected
    }
}
